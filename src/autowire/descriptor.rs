//! Constructor metadata for autowirable types.
//!
//! Rust has no runtime reflection, so every constructible type describes its
//! constructor explicitly: which parameters it takes, in which order, what each
//! one is declared as, and how to build the value from resolved arguments.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::Service;

type ConstructorFn = dyn Fn(Arguments) -> DiResult<Service> + Send + Sync;
type DefaultFn = dyn Fn() -> Option<Service> + Send + Sync;

/// Conventional identifier of a Rust type, `std::any::type_name::<T>()`.
///
/// Works for trait objects as well, so `type_key::<dyn Repository>()` names an
/// "interface".
#[inline]
pub fn type_key<T: ?Sized + 'static>() -> &'static str {
    std::any::type_name::<T>()
}

/// Whether a type can be constructed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete type with a constructor
    Concrete,
    /// Abstract base; never constructed directly
    Abstract,
    /// Interface (trait); never constructed directly
    Interface,
}

/// A single named type as it appears in a parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    /// Primitive type such as `string`, `int`, `bool` or `null`
    pub builtin: bool,
}

impl NamedType {
    /// A class type named by its Rust type.
    pub fn class<T: ?Sized + 'static>() -> Self {
        Self::named(type_key::<T>())
    }

    /// A class type named by an arbitrary identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), builtin: false }
    }

    /// A builtin (primitive) type.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self { name: name.into(), builtin: true }
    }

    fn admits_null(&self) -> bool {
        self.builtin && matches!(self.name.as_str(), "null" | "mixed")
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Untyped,
    Named(NamedType),
    /// Members in declaration order
    Union(Vec<NamedType>),
}

/// Describes one constructor parameter.
///
/// # Examples
///
/// ```
/// use keyed_di::{ParameterDescriptor, NamedType, TypeShape};
///
/// let param = ParameterDescriptor::builtin("param", "string")
///     .default_value("default".to_string());
/// assert!(param.has_default());
/// assert!(!param.is_nullable());
///
/// let union = ParameterDescriptor::union("dependency", [
///     NamedType::builtin("null"),
///     NamedType::builtin("int"),
/// ]);
/// assert!(union.is_nullable());
/// assert!(matches!(union.shape(), TypeShape::Union(members) if members.len() == 2));
/// ```
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: String,
    shape: TypeShape,
    nullable: bool,
    default: Option<Arc<DefaultFn>>,
    declaring_type: String,
}

impl ParameterDescriptor {
    /// A parameter with no declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Untyped,
            nullable: false,
            default: None,
            declaring_type: String::new(),
        }
    }

    /// A parameter typed with a class or interface given as a Rust type.
    pub fn class<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::typed(name, NamedType::class::<T>())
    }

    /// A parameter typed with a class or interface given by identifier.
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::typed(name, NamedType::named(type_name))
    }

    /// A parameter typed with a builtin type.
    pub fn builtin(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::typed(name, NamedType::builtin(type_name))
    }

    /// A parameter typed with a union; members are tried in the given order.
    pub fn union(name: impl Into<String>, members: impl IntoIterator<Item = NamedType>) -> Self {
        let mut param = Self::untyped(name);
        param.shape = TypeShape::Union(members.into_iter().collect());
        param
    }

    fn typed(name: impl Into<String>, ty: NamedType) -> Self {
        let mut param = Self::untyped(name);
        param.shape = TypeShape::Named(ty);
        param
    }

    /// Marks the parameter as accepting null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets a default value, cloned on every use.
    pub fn default_value<T: Any + Clone + Send + Sync>(self, value: T) -> Self {
        self.default_with(move || Some(Arc::new(value.clone()) as Service))
    }

    /// Sets null as the default value.
    pub fn default_null(self) -> Self {
        self.default_with(|| None)
    }

    /// Sets a default value expression, evaluated on every use.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<Service> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Evaluates the default value; `None` when there is no default or it is null.
    pub fn default_value_of(&self) -> Option<Service> {
        self.default.as_ref().and_then(|f| f())
    }

    /// A parameter with a default may be omitted.
    pub fn is_optional(&self) -> bool {
        self.has_default()
    }

    /// Explicitly nullable, or typed with a union admitting `null`/`mixed`.
    pub fn is_nullable(&self) -> bool {
        if self.nullable {
            return true;
        }
        match &self.shape {
            TypeShape::Named(ty) => ty.admits_null(),
            TypeShape::Union(members) => members.iter().any(NamedType::admits_null),
            TypeShape::Untyped => false,
        }
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub(crate) fn unresolved(&self) -> DiError {
        DiError::unresolved_parameter(&self.name, &self.declaring_type)
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("nullable", &self.nullable)
            .field("has_default", &self.has_default())
            .field("declaring_type", &self.declaring_type)
            .finish()
    }
}

/// Constructor metadata for one type.
///
/// # Examples
///
/// ```
/// use keyed_di::{Arguments, ParameterDescriptor, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Dependency;
/// struct Service {
///     dependency: Arc<Dependency>,
/// }
///
/// let dependency = TypeDescriptor::of::<Dependency>(|_| Ok(Dependency));
/// let service = TypeDescriptor::of::<Service>(|args: Arguments| {
///     Ok(Service { dependency: args.required::<Dependency>("dependency")? })
/// })
/// .param(ParameterDescriptor::class::<Dependency>("dependency"));
///
/// assert!(dependency.is_instantiable());
/// assert_eq!(service.parameters().len(), 1);
/// assert_eq!(service.parameters()[0].declaring_type(), service.name());
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    constructor: Option<Arc<ConstructorFn>>,
    parameters: Vec<ParameterDescriptor>,
}

impl TypeDescriptor {
    /// A concrete type named after `T` whose constructor returns `T`.
    pub fn of<T: Any + Send + Sync>(
        constructor: impl Fn(Arguments) -> DiResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::concrete(type_key::<T>(), move |args| {
            constructor(args).map(|v| Arc::new(v) as Service)
        })
    }

    /// A concrete type under an arbitrary name whose constructor returns a service.
    pub fn concrete<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Arguments) -> DiResult<Service> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            constructor: Some(Arc::new(constructor)),
            parameters: Vec::new(),
        }
    }

    /// An interface; `T` is usually `dyn Trait`.
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::non_instantiable(type_key::<T>(), TypeKind::Interface)
    }

    /// A non-constructible type of the given kind.
    pub fn non_instantiable(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constructor: None,
            parameters: Vec::new(),
        }
    }

    /// Appends a constructor parameter.
    pub fn param(mut self, mut parameter: ParameterDescriptor) -> Self {
        parameter.declaring_type = self.name.clone();
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.constructor.is_some()
    }

    /// Constructor parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Runs the constructor with already resolved argument values, one per
    /// parameter in declaration order.
    pub fn instantiate(&self, values: Vec<Option<Service>>) -> DiResult<Service> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| DiError::CannotInstantiate(self.name.clone()))?;
        let slots = self
            .parameters
            .iter()
            .map(|p| p.name.clone())
            .zip(values)
            .collect();
        constructor(Arguments {
            declaring_type: self.name.clone(),
            slots,
        })
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Resolved constructor arguments, addressed by parameter name.
///
/// A slot holds `None` when the parameter resolved to null.
pub struct Arguments {
    declaring_type: String,
    slots: Vec<(String, Option<Service>)>,
}

impl Arguments {
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The raw value of a parameter; `None` if null or not declared.
    pub fn service(&self, parameter: &str) -> Option<Service> {
        self.slots
            .iter()
            .find(|(name, _)| name == parameter)
            .and_then(|(_, value)| value.clone())
    }

    /// A non-null parameter of type `T`.
    pub fn required<T: Any + Send + Sync>(&self, parameter: &str) -> DiResult<Arc<T>> {
        self.optional::<T>(parameter)?
            .ok_or_else(|| DiError::unresolved_parameter(parameter, &self.declaring_type))
    }

    /// A parameter of type `T` that may be null.
    pub fn optional<T: Any + Send + Sync>(&self, parameter: &str) -> DiResult<Option<Arc<T>>> {
        match self.service(parameter) {
            None => Ok(None),
            Some(value) => value.downcast::<T>().map(Some).map_err(|_| {
                DiError::TypeMismatch(format!(
                    "parameter '{}' of {} (expected {})",
                    parameter,
                    self.declaring_type,
                    std::any::type_name::<T>()
                ))
            }),
        }
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Arguments")
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &names)
            .finish()
    }
}
