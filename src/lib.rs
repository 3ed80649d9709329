//! # keyed-di
//!
//! A string-keyed dependency injection container with factories, aliases,
//! decorating extensions and constructor autowiring.
//!
//! ## Features
//!
//! - **`get`/`has` contract**: services are addressed by identifier strings
//! - **Lazy factories**: run on first request, then cached
//! - **Aliases**: forward one identifier to another, sharing the instance
//! - **Extensions**: ordered decorator chains applied to produced instances
//! - **Callable specs**: factories and extensions given directly, by
//!   identifier, or as a method bound on a container entry
//! - **Autowiring**: constructors described in a [`TypeCatalog`] are
//!   resolved recursively from the container, defaults and nullability
//! - **Service providers**: reusable bundles of registrations
//!
//! ## Quick Start
//!
//! ```rust
//! use keyed_di::{Container, Resolver, service};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::builder()
//!     .instance("db", service(Database { url: "postgres://localhost".to_string() }))
//!     .factory_fn("users", |c, _| Ok(service(UserService { db: c.get_as::<Database>("db")? })))
//!     .alias("user_service", "users")
//!     .build();
//!
//! let users = container.get_as::<UserService>("user_service").unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! assert!(Arc::ptr_eq(
//!     &container.get("users").unwrap(),
//!     &container.get("user_service").unwrap()
//! ));
//! ```
//!
//! ## Autowiring
//!
//! ```rust
//! use keyed_di::{
//!     type_key, Arguments, Container, ParameterDescriptor, Resolver, TypeCatalog, TypeDescriptor,
//! };
//!
//! struct Clock;
//!
//! struct Scheduler {
//!     clock: std::sync::Arc<Clock>,
//!     name: String,
//! }
//!
//! let catalog = TypeCatalog::new()
//!     .with(TypeDescriptor::of::<Clock>(|_| Ok(Clock)))
//!     .with(
//!         TypeDescriptor::of::<Scheduler>(|args: Arguments| {
//!             Ok(Scheduler {
//!                 clock: args.required::<Clock>("clock")?,
//!                 name: args.required::<String>("name")?.to_string(),
//!             })
//!         })
//!         .param(ParameterDescriptor::class::<Clock>("clock"))
//!         .param(
//!             ParameterDescriptor::builtin("name", "string").default_value("nightly".to_string()),
//!         ),
//!     );
//!
//! let container = Container::builder().types(catalog).autowire(true).build();
//! let scheduler = container.get_as::<Scheduler>(type_key::<Scheduler>()).unwrap();
//! assert_eq!(scheduler.name, "nightly");
//! ```

pub mod autowire;
pub mod builder;
pub mod callable;
pub mod container;
pub mod error;
pub mod observer;
pub mod provider;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

mod registration;

pub use autowire::{
    type_key, Arguments, Autowire, AutowireResolver, Injectable, NamedType, ParameterDescriptor,
    TypeCatalog, TypeDescriptor, TypeKind, TypeShape,
};
pub use builder::ContainerBuilder;
pub use callable::{
    resolve_callable, BindMethods, Callable, CallableSpec, Extension, ExtensionSpec, Factory,
    FactorySpec, MethodTarget, Receiver,
};
pub use container::Container;
pub use error::{DiError, DiResult};
pub use observer::{DiObserver, LoggingObserver, MetricsObserver, ResolutionSource};
pub use provider::{AggregateServiceProvider, ProviderHandle, ServiceProvider};
pub use registration::{service, Service};
pub use traits::{Resolver, ServiceLocator};

#[cfg(feature = "config")]
pub use config::{AutowireRef, CallableRef, ContainerConfig};
