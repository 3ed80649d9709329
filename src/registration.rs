//! Registry store backing a container.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::callable::{ExtensionSpec, FactorySpec};

/// Type-erased, shared service handle.
///
/// Every instance, factory result, extension result and autowired object is
/// stored and returned as a `Service`. Two lookups yield the same instance
/// exactly when `Arc::ptr_eq` holds.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Wraps a value into a [`Service`].
///
/// # Examples
///
/// ```
/// use keyed_di::service;
///
/// let value = service("hello".to_string());
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hello"));
/// ```
pub fn service<T: Any + Send + Sync>(value: T) -> Service {
    Arc::new(value)
}

/// The four identifier-keyed mappings owned by a container.
///
/// Factories, aliases and extensions are fixed once the container is built;
/// the instance map doubles as the memoization cache and is the only mapping
/// written during resolution.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) factories: IndexMap<String, FactorySpec>,
    pub(crate) aliases: IndexMap<String, String>,
    pub(crate) extensions: IndexMap<String, Vec<ExtensionSpec>>,
    instances: Mutex<IndexMap<String, Service>>,
}

impl Registry {
    pub(crate) fn new(
        factories: IndexMap<String, FactorySpec>,
        aliases: IndexMap<String, String>,
        instances: IndexMap<String, Service>,
        extensions: IndexMap<String, Vec<ExtensionSpec>>,
    ) -> Self {
        Self {
            factories,
            aliases,
            extensions,
            instances: Mutex::new(instances),
        }
    }

    /// Looks up a cached instance.
    ///
    /// The lock is released before returning so callers never hold it while
    /// invoking factories or extensions.
    #[inline]
    pub(crate) fn instance(&self, id: &str) -> Option<Service> {
        self.instances.lock().get(id).cloned()
    }

    #[inline]
    pub(crate) fn has_instance(&self, id: &str) -> bool {
        self.instances.lock().contains_key(id)
    }

    /// Caches an instance unless one is already cached under `id`, and
    /// returns whichever instance now occupies the slot.
    pub(crate) fn cache(&self, id: &str, instance: Service) -> Service {
        debug!(id, "Caching instance");
        self.instances.lock().entry(id.to_string()).or_insert(instance).clone()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.has_instance(id) || self.factories.contains_key(id) || self.aliases.contains_key(id)
    }

    pub(crate) fn extensions_for(&self, id: &str) -> &[ExtensionSpec] {
        self.extensions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn cached_ids(&self) -> Vec<String> {
        self.instances.lock().keys().cloned().collect()
    }
}
