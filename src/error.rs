//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Represents the failure conditions that can occur while resolving an
/// identifier, autowiring a type, normalizing a callable spec or loading
/// container configuration. Every error carries the identifier, type or
/// parameter name needed to diagnose the misconfiguration.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{Container, DiError, ServiceLocator};
///
/// let container = Container::new();
/// match container.get("FOO") {
///     Err(DiError::NotFound(id)) => assert_eq!(id, "FOO"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use keyed_di::DiError;
///
/// let missing = DiError::CannotResolveParameter {
///     parameter: "dependency".to_string(),
///     declaring_type: "app::Service".to_string(),
/// };
/// assert_eq!(
///     missing.to_string(),
///     "Cannot resolve dependency for parameter 'dependency' in type 'app::Service'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// No instance, factory or alias, and bare construction was impossible
    #[error("Service not found: {0}")]
    NotFound(String),
    /// Autowiring target is abstract, an interface, or has no constructor
    #[error("Type {0} is not instantiable")]
    CannotInstantiate(String),
    /// No strategy yielded a value for a constructor parameter
    #[error("Cannot resolve dependency for parameter '{parameter}' in type '{declaring_type}'")]
    CannotResolveParameter {
        parameter: String,
        declaring_type: String,
    },
    /// A factory or extension spec could not be turned into an invocable
    #[error("Unable to resolve callable for {0}")]
    UnresolvableCallable(String),
    /// A provider specification is not a valid provider
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),
    /// A named autowire resolver is unknown or is not a resolver
    #[error("Invalid autowire resolver: {0}")]
    InvalidAutowire(String),
    /// The type catalog has no descriptor for this type name
    #[error("Unknown type: {0}")]
    UnknownType(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// Container configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DiError {
    /// Builds a `CannotResolveParameter` error.
    pub fn unresolved_parameter(
        parameter: impl Into<String>,
        declaring_type: impl Into<String>,
    ) -> Self {
        DiError::CannotResolveParameter {
            parameter: parameter.into(),
            declaring_type: declaring_type.into(),
        }
    }

    /// Returns true for the failures raised by the autowiring engine itself.
    ///
    /// These are the only errors a union-typed parameter swallows before
    /// trying its next member type.
    pub fn is_autowire_failure(&self) -> bool {
        matches!(
            self,
            DiError::CannotInstantiate(_)
                | DiError::CannotResolveParameter { .. }
                | DiError::UnknownType(_)
        )
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout keyed-di.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{DiResult, DiError};
///
/// fn lookup(found: bool) -> DiResult<&'static str> {
///     if found {
///         Ok("service")
///     } else {
///         Err(DiError::NotFound("service".to_string()))
///     }
/// }
///
/// assert!(lookup(true).is_ok());
/// assert!(lookup(false).is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
