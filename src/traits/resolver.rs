//! Resolver traits for service lookup.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::Service;

/// Core lookup trait for object-safe service resolution.
///
/// This is the only surface the autowiring engine is allowed to use: it may
/// ask whether an identifier is registered and fetch it, nothing else. It is
/// object-safe so resolvers can receive it as `&dyn ServiceLocator`, and test
/// code can substitute a hand-written double for the real [`Container`].
///
/// Most callers should use the [`Resolver`] extension trait instead, which adds
/// typed accessors on top of this one.
///
/// [`Container`]: crate::Container
pub trait ServiceLocator: Send + Sync {
    /// Returns true if the identifier has an instance, a factory or an alias.
    ///
    /// Identifiers that would only succeed through autowiring or bare
    /// construction are not reported.
    fn has(&self, id: &str) -> bool;

    /// Resolves an identifier to its service.
    ///
    /// # Returns
    ///
    /// * `Ok(Service)` - The resolved service
    /// * `Err(DiError)` - Resolution error (not found, unresolvable callable,
    ///   autowire failure, etc.)
    fn get(&self, id: &str) -> DiResult<Service>;
}

/// Typed resolution helpers built on [`ServiceLocator`].
///
/// Implemented for every locator, including `dyn ServiceLocator`.
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, Resolver, service};
///
/// let container = Container::builder()
///     .instance("port", service(8080u16))
///     .build();
///
/// let port = container.get_as::<u16>("port").unwrap();
/// assert_eq!(*port, 8080);
/// assert!(container.get_as::<String>("port").is_err());
/// ```
pub trait Resolver: ServiceLocator {
    /// Resolves an identifier and downcasts it to a concrete type.
    fn get_as<T: Any + Send + Sync>(&self, id: &str) -> DiResult<Arc<T>> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| mismatch::<T>(id))
    }

    /// Resolves an identifier holding an `Arc<dyn Trait>` and unwraps it.
    ///
    /// Trait objects are stored doubly wrapped (`Arc<Arc<dyn Trait>>`) because
    /// `Arc<dyn Any>` cannot be cast to another trait object directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{Container, Resolver, service};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn greet(&self) -> String { "hello".to_string() }
    /// }
    ///
    /// let container = Container::builder()
    ///     .instance("greeter", service(Arc::new(English) as Arc<dyn Greeter>))
    ///     .build();
    ///
    /// let greeter = container.get_trait::<dyn Greeter>("greeter").unwrap();
    /// assert_eq!(greeter.greet(), "hello");
    /// ```
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, id: &str) -> DiResult<Arc<T>> {
        self.get(id)?
            .downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| mismatch::<T>(id))
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// Use this when a missing service is a configuration bug and failing fast
    /// is preferred.
    ///
    /// # Panics
    ///
    /// Panics if the identifier cannot be resolved or holds another type.
    fn get_required<T: Any + Send + Sync>(&self, id: &str) -> Arc<T> {
        self.get_as::<T>(id)
            .unwrap_or_else(|e| panic!("Failed to resolve {} as {}: {}", id, type_name::<T>(), e))
    }
}

impl<L: ServiceLocator + ?Sized> Resolver for L {}

fn mismatch<T: ?Sized>(id: &str) -> DiError {
    DiError::TypeMismatch(format!("{} (expected {})", id, type_name::<T>()))
}
