//! Type catalog: the registry of constructible types known by name.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::autowire::descriptor::{type_key, TypeDescriptor};
use crate::autowire::AutowireResolver;
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::provider::{ProviderHandle, ServiceProvider};
use crate::registration::Service;

/// A type that describes its own constructor.
///
/// # Examples
///
/// ```
/// use keyed_di::{Injectable, TypeCatalog, TypeDescriptor};
///
/// struct Clock;
///
/// impl Injectable for Clock {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::of::<Clock>(|_| Ok(Clock))
///     }
/// }
///
/// let mut catalog = TypeCatalog::new();
/// catalog.register_type::<Clock>();
/// assert!(catalog.contains(keyed_di::type_key::<Clock>()));
/// ```
pub trait Injectable: 'static {
    fn descriptor() -> TypeDescriptor;
}

/// Type descriptors keyed by type name.
///
/// This is the lookup table standing in for runtime reflection: the autowire
/// engine reads constructor signatures from it, and the container uses it for
/// bare zero-argument construction. Registering a name twice replaces the
/// earlier descriptor.
///
/// A fresh catalog already knows the [`Container`] type itself, constructible
/// with no arguments into a new empty container.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: IndexMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.register(TypeDescriptor::of::<Container>(|_| Ok(Container::new())));
        catalog
    }

    /// A catalog without the built-in `Container` entry.
    pub fn empty() -> Self {
        Self { types: IndexMap::new() }
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.name().to_string(), Arc::new(descriptor));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register_type<T: Injectable>(&mut self) -> &mut Self {
        self.register(T::descriptor())
    }

    /// Registers a default-constructible service provider under its type name,
    /// so it can be referenced by string.
    pub fn register_provider<P: ServiceProvider + Default + 'static>(&mut self) -> &mut Self {
        self.register(TypeDescriptor::concrete(type_key::<P>(), |_| {
            Ok(Arc::new(ProviderHandle::new(P::default())) as Service)
        }))
    }

    /// Registers a default-constructible autowire resolver under its type
    /// name, for [`ContainerBuilder::autowire_named`](crate::ContainerBuilder::autowire_named).
    pub fn register_autowire<A: AutowireResolver + Default + 'static>(&mut self) -> &mut Self {
        self.register(TypeDescriptor::concrete(type_key::<A>(), |_| {
            let resolver: Arc<dyn AutowireResolver> = Arc::new(A::default());
            Ok(Arc::new(resolver) as Service)
        }))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Constructs `name` with no arguments.
    ///
    /// Parameters that declare a default receive it. An unknown type, a
    /// non-instantiable type, or any parameter without a default fails with
    /// [`DiError::NotFound`]; errors raised by the constructor itself propagate.
    pub fn construct_bare(&self, name: &str) -> DiResult<Service> {
        let descriptor = self
            .get(name)
            .filter(|d| d.is_instantiable())
            .ok_or_else(|| DiError::NotFound(name.to_string()))?;

        if descriptor.parameters().iter().any(|p| !p.has_default()) {
            return Err(DiError::NotFound(name.to_string()));
        }

        let defaults = descriptor.parameters().iter().map(|p| p.default_value_of()).collect();
        descriptor.instantiate(defaults)
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
