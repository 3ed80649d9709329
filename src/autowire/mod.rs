//! Constructor autowiring.
//!
//! [`Autowire`] builds an object from its [`TypeDescriptor`] by resolving every
//! constructor parameter in declaration order: from the container when it has
//! an entry for the declared type, from defaults or null when the parameter
//! allows it, and otherwise by recursively autowiring the dependency.
//!
//! Cyclic constructor dependencies are not detected; a type that (indirectly)
//! requires itself recurses until the stack is exhausted.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{DiError, DiResult};
use crate::registration::Service;
use crate::traits::ServiceLocator;

pub mod catalog;
pub mod descriptor;

pub use catalog::{Injectable, TypeCatalog};
pub use descriptor::{
    type_key, Arguments, NamedType, ParameterDescriptor, TypeDescriptor, TypeKind, TypeShape,
};

/// Creates instances of named types with their dependencies resolved.
///
/// The container delegates to its resolver for identifiers it has no entry
/// for. A resolver must only use the container through [`ServiceLocator`].
///
/// # Examples
///
/// ```
/// use keyed_di::{AutowireResolver, Container, DiResult, Service, ServiceLocator, service};
/// use std::sync::Arc;
///
/// struct Placeholder;
///
/// impl AutowireResolver for Placeholder {
///     fn create(
///         &self,
///         _type_name: &str,
///         _container: Option<&dyn ServiceLocator>,
///     ) -> DiResult<Service> {
///         Ok(service(()))
///     }
/// }
///
/// let container = Container::builder().autowire_with(Arc::new(Placeholder)).build();
/// assert!(container.get("anything").unwrap().downcast_ref::<()>().is_some());
/// ```
pub trait AutowireResolver: Send + Sync {
    fn create(&self, type_name: &str, container: Option<&dyn ServiceLocator>) -> DiResult<Service>;
}

/// Descriptor-driven autowiring over a [`TypeCatalog`].
///
/// # Examples
///
/// ```
/// use keyed_di::{
///     type_key, Arguments, Autowire, AutowireResolver, ParameterDescriptor, TypeCatalog,
///     TypeDescriptor,
/// };
/// use std::sync::Arc;
///
/// struct Dependency;
/// struct Service {
///     dependency: Arc<Dependency>,
/// }
///
/// let catalog = TypeCatalog::new()
///     .with(TypeDescriptor::of::<Dependency>(|_| Ok(Dependency)))
///     .with(
///         TypeDescriptor::of::<Service>(|args: Arguments| {
///             Ok(Service { dependency: args.required::<Dependency>("dependency")? })
///         })
///         .param(ParameterDescriptor::class::<Dependency>("dependency")),
///     );
///
/// let autowire = Autowire::new(Arc::new(catalog));
/// let built = autowire.create(type_key::<Service>(), None).unwrap();
/// assert!(built.downcast_ref::<Service>().is_some());
/// ```
#[derive(Clone)]
pub struct Autowire {
    catalog: Arc<TypeCatalog>,
}

impl Autowire {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    fn resolve_parameter(
        &self,
        parameter: &ParameterDescriptor,
        container: Option<&dyn ServiceLocator>,
    ) -> DiResult<Option<Service>> {
        match parameter.shape() {
            TypeShape::Union(members) => self.resolve_union(parameter, members, container),
            TypeShape::Named(ty) if !ty.builtin => {
                self.resolve_class(parameter, &ty.name, container)
            }
            TypeShape::Named(_) => Self::resolve_builtin(parameter),
            TypeShape::Untyped if parameter.is_optional() => Ok(Self::resolve_optional(parameter)),
            TypeShape::Untyped => Err(parameter.unresolved()),
        }
    }

    fn resolve_union(
        &self,
        parameter: &ParameterDescriptor,
        members: &[NamedType],
        container: Option<&dyn ServiceLocator>,
    ) -> DiResult<Option<Service>> {
        for member in members {
            if member.builtin {
                return Self::resolve_builtin(parameter);
            }
            match self.resolve_class(parameter, &member.name, container) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_autowire_failure() => {
                    trace!(
                        parameter = parameter.name(),
                        member = %member.name,
                        error = %err,
                        "Union member unresolvable, trying next"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Err(parameter.unresolved())
    }

    fn resolve_class(
        &self,
        parameter: &ParameterDescriptor,
        dependency: &str,
        container: Option<&dyn ServiceLocator>,
    ) -> DiResult<Option<Service>> {
        if let Some(container) = container {
            if container.has(dependency) {
                trace!(
                    parameter = parameter.name(),
                    dependency,
                    "Resolving parameter from container"
                );
                return container.get(dependency).map(Some);
            }
        }

        if parameter.is_optional() || parameter.is_nullable() {
            return Ok(Self::resolve_optional(parameter));
        }

        match self.catalog.get(dependency) {
            Some(descriptor) if descriptor.is_instantiable() => {
                trace!(parameter = parameter.name(), dependency, "Autowiring parameter");
                self.create(dependency, container).map(Some)
            }
            _ => Err(parameter.unresolved()),
        }
    }

    fn resolve_optional(parameter: &ParameterDescriptor) -> Option<Service> {
        parameter.default_value_of()
    }

    fn resolve_builtin(parameter: &ParameterDescriptor) -> DiResult<Option<Service>> {
        if parameter.has_default() {
            return Ok(parameter.default_value_of());
        }
        if parameter.is_nullable() {
            return Ok(None);
        }
        Err(parameter.unresolved())
    }
}

impl AutowireResolver for Autowire {
    fn create(&self, type_name: &str, container: Option<&dyn ServiceLocator>) -> DiResult<Service> {
        let descriptor = self
            .catalog
            .get(type_name)
            .ok_or_else(|| DiError::UnknownType(type_name.to_string()))?;

        if !descriptor.is_instantiable() {
            return Err(DiError::CannotInstantiate(type_name.to_string()));
        }

        debug!(type_name, parameters = descriptor.parameters().len(), "Autowiring");

        let values = descriptor
            .parameters()
            .iter()
            .map(|parameter| self.resolve_parameter(parameter, container))
            .collect::<DiResult<Vec<_>>>()?;

        descriptor.instantiate(values)
    }
}

impl fmt::Debug for Autowire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowire")
            .field("types", &self.catalog.len())
            .finish()
    }
}
