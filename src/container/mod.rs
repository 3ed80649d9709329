//! The container: string-keyed resolution with caching, aliasing, factories,
//! extensions and autowiring.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::autowire::{AutowireResolver, TypeCatalog};
use crate::builder::ContainerBuilder;
use crate::callable::{resolve_callable, ExtensionSpec, FactorySpec};
use crate::error::DiResult;
use crate::observer::{Observers, ResolutionSource};
use crate::registration::{Registry, Service};
use crate::traits::ServiceLocator;

/// Dependency injection container.
///
/// `get` resolves an identifier by the first matching strategy:
///
/// 1. a cached instance is returned as-is;
/// 2. an alias is resolved through `get` on its target, and the result is
///    cached under the alias as well;
/// 3. a factory is normalized, invoked with `(container, id)`, passed through
///    the extension chain for `id`, and cached;
/// 4. with an autowire resolver configured, the identifier is handed to it
///    and its result is returned without extensions and without caching;
/// 5. otherwise the identifier is constructed as a type name with no
///    arguments, extended and cached. Failure to do so is
///    [`DiError::NotFound`](crate::DiError::NotFound).
///
/// `has` only reports the first three: autowirable or constructible
/// identifiers are not enumerable.
///
/// The instance cache is guarded by a mutex that is never held while user
/// code runs, so factories and extensions may call back into the container.
/// Two threads racing on the same uncached identifier can both run its
/// factory; the first result to reach the cache wins and both threads
/// return it.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, service};
/// use std::sync::Arc;
///
/// let container = Container::builder()
///     .factory_fn("FOO", |_, _| Ok(service("SERVICE".to_string())))
///     .alias("foo", "FOO")
///     .build();
///
/// assert!(container.has("foo"));
/// assert!(!container.has("BAR"));
///
/// let a = container.get("FOO").unwrap();
/// let b = container.get("foo").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct Container {
    registry: Registry,
    catalog: Arc<TypeCatalog>,
    autowire: Option<Arc<dyn AutowireResolver>>,
    observers: Observers,
}

impl Container {
    /// An empty container: no registrations, no autowiring, and the default
    /// [`TypeCatalog`] for bare construction.
    pub fn new() -> Self {
        Self {
            registry: Registry::default(),
            catalog: Arc::new(TypeCatalog::new()),
            autowire: None,
            observers: Observers::new(),
        }
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_parts(
        factories: IndexMap<String, FactorySpec>,
        aliases: IndexMap<String, String>,
        instances: IndexMap<String, Service>,
        extensions: IndexMap<String, Vec<ExtensionSpec>>,
        catalog: Arc<TypeCatalog>,
        autowire: Option<Arc<dyn AutowireResolver>>,
        observers: Observers,
    ) -> Self {
        Self {
            registry: Registry::new(factories, aliases, instances, extensions),
            catalog,
            autowire,
            observers,
        }
    }

    /// True iff `id` is cached, has a factory, or is an alias.
    pub fn has(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Resolves `id`.
    pub fn get(&self, id: &str) -> DiResult<Service> {
        if !self.observers.has_observers() {
            return self.resolve(id).map(|(instance, _)| instance);
        }

        let start = Instant::now();
        self.observers.resolving(id);
        match self.resolve(id) {
            Ok((instance, source)) => {
                self.observers.resolved(id, source, start.elapsed());
                Ok(instance)
            }
            Err(err) => {
                self.observers.failed(id, &err);
                Err(err)
            }
        }
    }

    /// The type catalog used for bare construction.
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn is_autowiring(&self) -> bool {
        self.autowire.is_some()
    }

    fn resolve(&self, id: &str) -> DiResult<(Service, ResolutionSource)> {
        if let Some(instance) = self.registry.instance(id) {
            trace!(id, "Serving cached instance");
            return Ok((instance, ResolutionSource::Cached));
        }

        if let Some(target) = self.registry.aliases.get(id) {
            return self.resolve_alias(id, target).map(|i| (i, ResolutionSource::Alias));
        }

        if let Some(spec) = self.registry.factories.get(id) {
            return self.resolve_factory(id, spec).map(|i| (i, ResolutionSource::Factory));
        }

        if let Some(autowire) = &self.autowire {
            debug!(id, "Delegating to autowire resolver");
            return autowire
                .create(id, Some(self as &dyn ServiceLocator))
                .map(|i| (i, ResolutionSource::Autowired));
        }

        self.construct_new(id).map(|i| (i, ResolutionSource::Constructed))
    }

    fn resolve_alias(&self, id: &str, target: &str) -> DiResult<Service> {
        debug!(id, target, "Following alias");
        let instance = self.get(target)?;
        Ok(self.registry.cache(id, instance))
    }

    fn resolve_factory(&self, id: &str, spec: &FactorySpec) -> DiResult<Service> {
        let factory = resolve_callable(self, spec)?;
        debug!(id, "Invoking factory");
        let instance = factory.invoke(self, id)?;
        let instance = self.extend(id, instance)?;
        Ok(self.registry.cache(id, instance))
    }

    fn construct_new(&self, id: &str) -> DiResult<Service> {
        debug!(id, "Constructing bare instance");
        let instance = self.catalog.construct_bare(id)?;
        let instance = self.extend(id, instance)?;
        Ok(self.registry.cache(id, instance))
    }

    fn extend(&self, id: &str, mut instance: Service) -> DiResult<Service> {
        for spec in self.registry.extensions_for(id) {
            let extension = resolve_callable(self, spec)?;
            trace!(id, extension = %spec.describe(), "Applying extension");
            instance = extension.invoke(self, instance)?;
        }
        Ok(instance)
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Factories:\n");
        for (id, spec) in &self.registry.factories {
            s.push_str(&format!("  {}: {}\n", id, spec.describe()));
        }
        s.push_str("Aliases:\n");
        for (id, target) in &self.registry.aliases {
            s.push_str(&format!("  {} -> {}\n", id, target));
        }
        s.push_str("Extensions:\n");
        for (id, specs) in &self.registry.extensions {
            for (i, spec) in specs.iter().enumerate() {
                s.push_str(&format!("  {} @ {}: {}\n", id, i, spec.describe()));
            }
        }
        s.push_str("Cached:\n");
        for id in self.registry.cached_ids() {
            s.push_str(&format!("  {}\n", id));
        }
        s.push_str(&format!(
            "Autowire: {}, known types: {}, observers: {}\n",
            self.is_autowiring(),
            self.catalog.len(),
            self.observers.len()
        ));
        s
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLocator for Container {
    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }

    fn get(&self, id: &str) -> DiResult<Service> {
        Container::get(self, id)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("factories", &self.registry.factories.len())
            .field("aliases", &self.registry.aliases.len())
            .field("extensions", &self.registry.extensions.len())
            .field("autowire", &self.is_autowiring())
            .finish()
    }
}
