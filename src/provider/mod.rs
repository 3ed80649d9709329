//! Service providers: reusable bundles of factories and extensions.
//!
//! A provider contributes registrations to a [`ContainerBuilder`]. Its
//! factories overwrite builder entries with the same identifier; its
//! extensions are appended after the ones already registered.
//!
//! [`ContainerBuilder`]: crate::ContainerBuilder

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::autowire::TypeCatalog;
use crate::callable::{ExtensionSpec, FactorySpec};
use crate::error::{DiError, DiResult};

mod aggregate;
pub use aggregate::AggregateServiceProvider;

/// A bundle of factory and extension registrations.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, Factory, FactorySpec, ServiceProvider, service};
/// use indexmap::IndexMap;
///
/// struct GreetingProvider;
///
/// impl ServiceProvider for GreetingProvider {
///     fn factories(&self) -> IndexMap<String, FactorySpec> {
///         let mut factories = IndexMap::new();
///         factories.insert(
///             "greeting".to_string(),
///             Factory::new(|_, _| Ok(service("hello".to_string()))).into(),
///         );
///         factories
///     }
/// }
///
/// let container = Container::builder().provider(GreetingProvider).build();
/// assert!(container.has("greeting"));
/// ```
pub trait ServiceProvider: Send + Sync {
    fn factories(&self) -> IndexMap<String, FactorySpec> {
        IndexMap::new()
    }

    fn extensions(&self) -> IndexMap<String, Vec<ExtensionSpec>> {
        IndexMap::new()
    }
}

/// Type-erased shared provider.
///
/// This is the value a [`TypeCatalog`] produces for a provider registered
/// with [`TypeCatalog::register_provider`], which lets providers be named
/// by string.
#[derive(Clone)]
pub struct ProviderHandle(Arc<dyn ServiceProvider>);

impl ProviderHandle {
    pub fn new<P: ServiceProvider + 'static>(provider: P) -> Self {
        Self(Arc::new(provider))
    }

    pub fn from_arc(provider: Arc<dyn ServiceProvider>) -> Self {
        Self(provider)
    }

    /// Constructs the provider registered in `catalog` under `name`.
    ///
    /// Fails with [`DiError::InvalidProvider`] when the name is not a
    /// constructible type or the constructed value is not a provider.
    pub fn from_catalog(catalog: &TypeCatalog, name: &str) -> DiResult<Self> {
        let value = catalog.construct_bare(name).map_err(|err| match err {
            DiError::NotFound(_) => {
                DiError::InvalidProvider(format!("{} is not a known type", name))
            }
            other => other,
        })?;

        value
            .downcast_ref::<ProviderHandle>()
            .cloned()
            .ok_or_else(|| {
                DiError::InvalidProvider(format!("{} does not implement ServiceProvider", name))
            })
    }
}

impl ServiceProvider for ProviderHandle {
    fn factories(&self) -> IndexMap<String, FactorySpec> {
        self.0.factories()
    }

    fn extensions(&self) -> IndexMap<String, Vec<ExtensionSpec>> {
        self.0.extensions()
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderHandle(..)")
    }
}
