//! Declarative container configuration.
//!
//! A [`ContainerConfig`] describes the string-addressable part of a container
//! (aliases, factories and extensions given by identifier or bound method,
//! provider names, the autowire switch or resolver name) so it can be loaded
//! from JSON.
//! Closures and instances still have to be registered in code.
//!
//! ```json
//! {
//!   "autowire": true,
//!   "aliases": { "db": "postgres" },
//!   "factories": { "postgres": ["pg_factory", "connect"] },
//!   "extensions": { "postgres": ["pool_extension"] },
//!   "providers": ["app::MailProvider"]
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::ContainerBuilder;
use crate::callable::{Callable, CallableSpec, Extension, Factory};
use crate::error::{DiError, DiResult};

/// A callable given by reference: an identifier, or an
/// `[identifier, method]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallableRef {
    Identifier(String),
    Method(String, String),
}

impl CallableRef {
    pub fn to_spec<C: Callable>(&self) -> CallableSpec<C> {
        match self {
            CallableRef::Identifier(id) => CallableSpec::identifier(id.as_str()),
            CallableRef::Method(target, method) => {
                CallableSpec::method(target.as_str(), method.as_str())
            }
        }
    }
}

/// The autowire entry: `true`/`false` toggles the stock engine, a string
/// names a resolver registered in the builder's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutowireRef {
    Enabled(bool),
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Autowire switch or resolver name; left untouched when absent
    pub autowire: Option<AutowireRef>,
    pub aliases: IndexMap<String, String>,
    pub factories: IndexMap<String, CallableRef>,
    pub extensions: IndexMap<String, Vec<CallableRef>>,
    /// Provider type names, looked up in the builder's catalog
    pub providers: Vec<String>,
}

impl ContainerConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{CallableRef, ContainerConfig, DiError};
    ///
    /// let source = r#"{ "factories": { "FOO": ["FOO_FACTORY", "build"] } }"#;
    /// let config = ContainerConfig::from_json(source).unwrap();
    /// assert_eq!(
    ///     config.factories["FOO"],
    ///     CallableRef::Method("FOO_FACTORY".to_string(), "build".to_string())
    /// );
    ///
    /// let bad = ContainerConfig::from_json(r#"{ "factories": { "FOO": [1, 1] } }"#);
    /// assert!(matches!(bad, Err(DiError::Config(_))));
    /// ```
    pub fn from_json(source: &str) -> DiResult<Self> {
        serde_json::from_str(source).map_err(|e| DiError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Config(e.to_string()))
    }
}

impl ContainerBuilder {
    /// Applies a configuration on top of the registrations made so far.
    ///
    /// Providers and a named autowire resolver are resolved through the
    /// builder's catalog, so register them there first (see
    /// [`TypeCatalog::register_provider`](crate::TypeCatalog::register_provider)
    /// and [`TypeCatalog::register_autowire`](crate::TypeCatalog::register_autowire)).
    pub fn configure(self, config: &ContainerConfig) -> DiResult<Self> {
        debug!(
            aliases = config.aliases.len(),
            factories = config.factories.len(),
            extensions = config.extensions.len(),
            providers = config.providers.len(),
            "Applying container configuration"
        );

        let mut builder = match &config.autowire {
            Some(AutowireRef::Enabled(enabled)) => self.autowire(*enabled),
            Some(AutowireRef::Named(name)) => self.autowire_named(name)?,
            None => self,
        };

        let aliases = config.aliases.iter().map(|(id, target)| (id.as_str(), target.as_str()));
        let factories = config
            .factories
            .iter()
            .map(|(id, spec)| (id.as_str(), spec.to_spec::<Factory>()));
        let extensions = config.extensions.iter().map(|(id, specs)| {
            let specs: Vec<_> = specs.iter().map(CallableRef::to_spec::<Extension>).collect();
            (id.as_str(), specs)
        });

        builder = builder.aliases(aliases).factories(factories).extensions(extensions);

        config
            .providers
            .iter()
            .try_fold(builder, |builder, name| builder.provider_named(name))
    }
}
