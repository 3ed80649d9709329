//! Core traits for the dependency injection container.

mod resolver;

pub use resolver::{Resolver, ServiceLocator};
