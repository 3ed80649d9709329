//! Fluent construction of a [`Container`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::autowire::{Autowire, AutowireResolver, TypeCatalog};
use crate::callable::{Extension, ExtensionSpec, Factory, FactorySpec};
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::observer::{DiObserver, Observers};
use crate::provider::{ProviderHandle, ServiceProvider};
use crate::registration::Service;

enum AutowireSetting {
    Disabled,
    Catalog,
    Custom(Arc<dyn AutowireResolver>),
}

/// Collects registrations and builds a [`Container`].
///
/// Registering an identifier twice keeps the later factory, alias or
/// instance. Extensions accumulate in registration order.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, ContainerBuilder, Resolver, service};
///
/// let container = ContainerBuilder::new()
///     .instance("name", service("world".to_string()))
///     .factory_fn("greeting", |c, _| {
///         let name = c.get_as::<String>("name")?;
///         Ok(service(format!("hello {}", name)))
///     })
///     .extension_fn("greeting", |_, inner| {
///         let text = inner.downcast_ref::<String>().cloned().unwrap_or_default();
///         Ok(service(text.to_uppercase()))
///     })
///     .build();
///
/// assert_eq!(*container.get_as::<String>("greeting").unwrap(), "HELLO WORLD");
/// ```
pub struct ContainerBuilder {
    factories: IndexMap<String, FactorySpec>,
    aliases: IndexMap<String, String>,
    instances: IndexMap<String, Service>,
    extensions: IndexMap<String, Vec<ExtensionSpec>>,
    catalog: TypeCatalog,
    autowire: AutowireSetting,
    observers: Observers,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
            aliases: IndexMap::new(),
            instances: IndexMap::new(),
            extensions: IndexMap::new(),
            catalog: TypeCatalog::new(),
            autowire: AutowireSetting::Disabled,
            observers: Observers::new(),
        }
    }

    /// Replaces the type catalog used for bare construction, stock
    /// autowiring and provider lookup by name.
    pub fn types(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn factory(mut self, id: impl Into<String>, spec: impl Into<FactorySpec>) -> Self {
        self.factories.insert(id.into(), spec.into());
        self
    }

    pub fn factory_fn<F>(self, id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Container, &str) -> DiResult<Service> + Send + Sync + 'static,
    {
        self.factory(id, Factory::new(f))
    }

    pub fn factories<K, S>(self, factories: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<FactorySpec>,
    {
        factories
            .into_iter()
            .fold(self, |builder, (id, spec)| builder.factory(id, spec))
    }

    pub fn alias(mut self, id: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(id.into(), target.into());
        self
    }

    pub fn aliases<K, T>(self, aliases: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: Into<String>,
        T: Into<String>,
    {
        aliases
            .into_iter()
            .fold(self, |builder, (id, target)| builder.alias(id, target))
    }

    pub fn instance(mut self, id: impl Into<String>, instance: Service) -> Self {
        self.instances.insert(id.into(), instance);
        self
    }

    pub fn instances<K>(self, instances: impl IntoIterator<Item = (K, Service)>) -> Self
    where
        K: Into<String>,
    {
        instances
            .into_iter()
            .fold(self, |builder, (id, instance)| builder.instance(id, instance))
    }

    /// Appends an extension to the chain for `id`.
    pub fn extension(mut self, id: impl Into<String>, spec: impl Into<ExtensionSpec>) -> Self {
        self.extensions.entry(id.into()).or_default().push(spec.into());
        self
    }

    pub fn extension_fn<F>(self, id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Container, Service) -> DiResult<Service> + Send + Sync + 'static,
    {
        self.extension(id, Extension::new(f))
    }

    pub fn extensions<K, L>(self, extensions: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: IntoIterator<Item = ExtensionSpec>,
    {
        extensions.into_iter().fold(self, |builder, (id, specs)| {
            let id = id.into();
            specs
                .into_iter()
                .fold(builder, |builder, spec| builder.extension(id.clone(), spec))
        })
    }

    /// Merges a provider's registrations: its factories overwrite, its
    /// extensions are appended.
    pub fn provider<P: ServiceProvider>(self, provider: P) -> Self {
        let factories = provider.factories();
        let extensions = provider.extensions();
        debug!(
            factories = factories.len(),
            extensions = extensions.len(),
            "Registering service provider"
        );
        self.factories(factories).extensions(extensions)
    }

    /// Registers the provider the catalog knows under `name`.
    ///
    /// Fails with [`DiError::InvalidProvider`](crate::DiError::InvalidProvider)
    /// when `name` does not denote a registered provider type.
    pub fn provider_named(self, name: &str) -> DiResult<Self> {
        let provider = ProviderHandle::from_catalog(&self.catalog, name)?;
        Ok(self.provider(provider))
    }

    pub fn providers(self, providers: impl IntoIterator<Item = ProviderHandle>) -> Self {
        providers
            .into_iter()
            .fold(self, |builder, provider| builder.provider(provider))
    }

    /// Enables the stock [`Autowire`] engine over this builder's catalog, or
    /// disables autowiring altogether. The last call wins.
    pub fn autowire(mut self, enabled: bool) -> Self {
        self.autowire = if enabled {
            AutowireSetting::Catalog
        } else {
            AutowireSetting::Disabled
        };
        self
    }

    /// Uses a custom autowire resolver.
    pub fn autowire_with(mut self, resolver: Arc<dyn AutowireResolver>) -> Self {
        self.autowire = AutowireSetting::Custom(resolver);
        self
    }

    /// Uses the autowire resolver the catalog knows under `name`.
    ///
    /// Register resolvers with
    /// [`TypeCatalog::register_autowire`](crate::TypeCatalog::register_autowire).
    /// Fails with [`DiError::InvalidAutowire`] when `name` is unknown or does
    /// not construct a resolver.
    pub fn autowire_named(self, name: &str) -> DiResult<Self> {
        let value = self.catalog.construct_bare(name).map_err(|err| match err {
            DiError::NotFound(_) => {
                DiError::InvalidAutowire(format!("{} is not a known type", name))
            }
            other => other,
        })?;

        let resolver = value
            .downcast_ref::<Arc<dyn AutowireResolver>>()
            .cloned()
            .ok_or_else(|| {
                DiError::InvalidAutowire(format!("{} does not implement AutowireResolver", name))
            })?;

        debug!(name, "Using named autowire resolver");
        Ok(self.autowire_with(resolver))
    }

    pub fn observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Container {
        let catalog = Arc::new(self.catalog);
        let autowire: Option<Arc<dyn AutowireResolver>> = match self.autowire {
            AutowireSetting::Disabled => None,
            AutowireSetting::Catalog => Some(Arc::new(Autowire::new(catalog.clone()))),
            AutowireSetting::Custom(resolver) => Some(resolver),
        };

        debug!(
            factories = self.factories.len(),
            aliases = self.aliases.len(),
            instances = self.instances.len(),
            extensions = self.extensions.len(),
            autowire = autowire.is_some(),
            "Building container"
        );

        Container::from_parts(
            self.factories,
            self.aliases,
            self.instances,
            self.extensions,
            catalog,
            autowire,
            self.observers,
        )
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let autowire = match self.autowire {
            AutowireSetting::Disabled => "disabled",
            AutowireSetting::Catalog => "catalog",
            AutowireSetting::Custom(_) => "custom",
        };
        f.debug_struct("ContainerBuilder")
            .field("factories", &self.factories.len())
            .field("aliases", &self.aliases.len())
            .field("instances", &self.instances.len())
            .field("extensions", &self.extensions.len())
            .field("types", &self.catalog.len())
            .field("autowire", &autowire)
            .finish()
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
