//! Callable specs for factories and extensions.
//!
//! A factory or extension can be registered in three shapes: the invocable
//! itself, the identifier of a container entry holding the invocable, or a
//! method name bound on a receiver object (given directly or by identifier).
//! [`resolve_callable`] normalizes any of them into an invocable at the moment
//! the container needs it.

use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::registration::Service;

/// Signature of a factory: `(container, identifier) -> service`.
pub type FactoryFn = dyn Fn(&Container, &str) -> DiResult<Service> + Send + Sync;

/// Signature of an extension: `(container, current instance) -> service`.
pub type ExtensionFn = dyn Fn(&Container, Service) -> DiResult<Service> + Send + Sync;

/// A factory producing the service for an identifier.
///
/// A `Factory` is itself a plain value, so it can be stored in the container
/// as an instance and referenced by identifier from a [`CallableSpec`].
///
/// # Examples
///
/// ```
/// use keyed_di::{Container, Factory, service};
///
/// let factory = Factory::new(|_container, id| Ok(service(format!("built {}", id))));
/// let value = factory.invoke(&Container::new(), "FOO").unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "built FOO");
/// ```
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Container, &str) -> DiResult<Service> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn invoke(&self, container: &Container, id: &str) -> DiResult<Service> {
        (self.0)(container, id)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// An extension decorating an already produced instance.
#[derive(Clone)]
pub struct Extension(Arc<ExtensionFn>);

impl Extension {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Container, Service) -> DiResult<Service> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn invoke(&self, container: &Container, instance: Service) -> DiResult<Service> {
        (self.0)(container, instance)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extension(..)")
    }
}

/// An object exposing named methods that can be bound as factories or
/// extensions.
///
/// This is the counterpart of a `[object, "method"]` callable pair. Methods
/// receive the object as `Arc<Self>` so the returned invocable can keep it
/// alive.
///
/// # Examples
///
/// ```
/// use keyed_di::{BindMethods, Factory, Receiver, service};
/// use std::sync::Arc;
///
/// struct Workshop {
///     label: String,
/// }
///
/// impl BindMethods for Workshop {
///     fn bind_factory(self: Arc<Self>, method: &str) -> Option<Factory> {
///         match method {
///             "build" => Some(Factory::new(move |_, _| Ok(service(self.label.clone())))),
///             _ => None,
///         }
///     }
/// }
///
/// let receiver = Receiver::new(Workshop { label: "tool".to_string() });
/// assert!(receiver.bind_factory("build").is_some());
/// assert!(receiver.bind_factory("missing").is_none());
/// ```
pub trait BindMethods: Send + Sync + 'static {
    /// Binds `method` as a factory, or `None` if no such factory method exists.
    fn bind_factory(self: Arc<Self>, method: &str) -> Option<Factory> {
        let _ = method;
        None
    }

    /// Binds `method` as an extension, or `None` if no such extension method exists.
    fn bind_extension(self: Arc<Self>, method: &str) -> Option<Extension> {
        let _ = method;
        None
    }
}

/// A shared handle to a [`BindMethods`] object.
///
/// Store a `Receiver` as a container instance to make its methods reachable
/// through [`CallableSpec::method`].
#[derive(Clone)]
pub struct Receiver(Arc<dyn BindMethods>);

impl Receiver {
    pub fn new<T: BindMethods>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn from_arc<T: BindMethods>(object: Arc<T>) -> Self {
        Self(object)
    }

    pub fn bind_factory(&self, method: &str) -> Option<Factory> {
        self.0.clone().bind_factory(method)
    }

    pub fn bind_extension(&self, method: &str) -> Option<Extension> {
        self.0.clone().bind_extension(method)
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Receiver(..)")
    }
}

/// Invocable kinds a [`CallableSpec`] can normalize to.
pub trait Callable: Clone + Send + Sync + 'static {
    /// Human-readable kind used in diagnostics.
    const KIND: &'static str;

    /// Binds a method of `receiver` as this kind of invocable.
    fn bind(receiver: &Receiver, method: &str) -> Option<Self>;
}

impl Callable for Factory {
    const KIND: &'static str = "factory";

    fn bind(receiver: &Receiver, method: &str) -> Option<Self> {
        receiver.bind_factory(method)
    }
}

impl Callable for Extension {
    const KIND: &'static str = "extension";

    fn bind(receiver: &Receiver, method: &str) -> Option<Self> {
        receiver.bind_extension(method)
    }
}

/// The object half of a bound-method spec.
#[derive(Debug, Clone)]
pub enum MethodTarget {
    /// Resolved through the container when the spec is normalized
    Identifier(String),
    /// Used as-is
    Object(Receiver),
}

/// A factory or extension as registered, before normalization.
///
/// # Examples
///
/// ```
/// use keyed_di::{CallableSpec, Factory, FactorySpec, service};
///
/// let direct: FactorySpec = CallableSpec::direct(Factory::new(|_, _| Ok(service(1u8))));
/// let named: FactorySpec = CallableSpec::identifier("FOO_FACTORY");
/// let bound: FactorySpec = CallableSpec::method("FOO_FACTORY", "new_service");
///
/// assert_eq!(named.describe(), "identifier `FOO_FACTORY`");
/// assert_eq!(bound.describe(), "method `new_service` on `FOO_FACTORY`");
/// assert_eq!(direct.describe(), "direct invocable");
/// ```
#[derive(Debug, Clone)]
pub enum CallableSpec<C> {
    /// Already invocable
    Direct(C),
    /// Identifier of a container entry holding the invocable
    Identifier(String),
    /// Method name bound on a receiver
    Method(MethodTarget, String),
}

/// Spec of a factory.
pub type FactorySpec = CallableSpec<Factory>;

/// Spec of an extension.
pub type ExtensionSpec = CallableSpec<Extension>;

impl<C: Callable> CallableSpec<C> {
    pub fn direct(callable: C) -> Self {
        CallableSpec::Direct(callable)
    }

    pub fn identifier(id: impl Into<String>) -> Self {
        CallableSpec::Identifier(id.into())
    }

    pub fn method(target: impl Into<String>, method: impl Into<String>) -> Self {
        CallableSpec::Method(MethodTarget::Identifier(target.into()), method.into())
    }

    pub fn bound(receiver: Receiver, method: impl Into<String>) -> Self {
        CallableSpec::Method(MethodTarget::Object(receiver), method.into())
    }

    /// Describes the spec's shape for error messages.
    pub fn describe(&self) -> String {
        match self {
            CallableSpec::Direct(_) => "direct invocable".to_string(),
            CallableSpec::Identifier(id) => format!("identifier `{}`", id),
            CallableSpec::Method(MethodTarget::Identifier(id), method) => {
                format!("method `{}` on `{}`", method, id)
            }
            CallableSpec::Method(MethodTarget::Object(_), method) => {
                format!("method `{}` on receiver object", method)
            }
        }
    }

    fn unresolvable(&self) -> DiError {
        DiError::UnresolvableCallable(format!("{} {}", C::KIND, self.describe()))
    }
}

impl From<Factory> for FactorySpec {
    fn from(factory: Factory) -> Self {
        CallableSpec::Direct(factory)
    }
}

impl From<Extension> for ExtensionSpec {
    fn from(extension: Extension) -> Self {
        CallableSpec::Direct(extension)
    }
}

/// Normalizes a callable spec into an invocable.
///
/// Identifier and method-target lookups go through `container.get`, so they
/// can themselves be served by factories, aliases or autowiring. Errors from
/// those lookups propagate unchanged; a looked-up value of the wrong shape or
/// an unknown method yields [`DiError::UnresolvableCallable`].
pub fn resolve_callable<C: Callable>(container: &Container, spec: &CallableSpec<C>) -> DiResult<C> {
    match spec {
        CallableSpec::Direct(callable) => Ok(callable.clone()),
        CallableSpec::Identifier(id) => {
            let value = container.get(id)?;
            value.downcast_ref::<C>().cloned().ok_or_else(|| spec.unresolvable())
        }
        CallableSpec::Method(target, method) => {
            let receiver = match target {
                MethodTarget::Object(receiver) => receiver.clone(),
                MethodTarget::Identifier(id) => {
                    let value = container.get(id)?;
                    value.downcast_ref::<Receiver>().cloned().ok_or_else(|| spec.unresolvable())?
                }
            };
            C::bind(&receiver, method).ok_or_else(|| spec.unresolvable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::service;

    struct Counter;

    impl BindMethods for Counter {
        fn bind_extension(self: Arc<Self>, method: &str) -> Option<Extension> {
            (method == "wrap").then(|| Extension::new(|_, inner| Ok(service(vec![inner]))))
        }
    }

    #[test]
    fn test_direct_spec_resolves_without_lookup() {
        let container = Container::new();
        let spec = FactorySpec::from(Factory::new(|_, _| Ok(service(7u32))));

        let factory = resolve_callable(&container, &spec).unwrap();
        let value = factory.invoke(&container, "ignored").unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&7));
    }

    #[test]
    fn test_bound_receiver_object() {
        let container = Container::new();
        let spec: ExtensionSpec = CallableSpec::bound(Receiver::new(Counter), "wrap");

        assert!(resolve_callable(&container, &spec).is_ok());
    }

    #[test]
    fn test_unknown_method_is_unresolvable() {
        let container = Container::new();
        let spec: ExtensionSpec = CallableSpec::bound(Receiver::new(Counter), "nope");

        match resolve_callable(&container, &spec) {
            Err(DiError::UnresolvableCallable(message)) => {
                assert_eq!(message, "extension method `nope` on receiver object");
            }
            other => panic!("expected UnresolvableCallable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_receiver_has_no_factories_by_default() {
        let receiver = Receiver::new(Counter);
        assert!(receiver.bind_factory("wrap").is_none());
        assert!(receiver.bind_extension("wrap").is_some());
    }
}
