use indexmap::IndexMap;

use crate::autowire::TypeCatalog;
use crate::callable::{ExtensionSpec, FactorySpec};
use crate::error::DiResult;
use crate::provider::{ProviderHandle, ServiceProvider};

/// Composes several providers into one.
///
/// Factories are merged in provider order, so a later provider's factory
/// replaces an earlier one for the same identifier. Extension lists are
/// concatenated per identifier in provider order.
///
/// # Examples
///
/// ```
/// use keyed_di::{
///     service, AggregateServiceProvider, Extension, ExtensionSpec, ProviderHandle,
///     ServiceProvider,
/// };
/// use indexmap::IndexMap;
///
/// struct Tag(&'static str);
///
/// impl ServiceProvider for Tag {
///     fn extensions(&self) -> IndexMap<String, Vec<ExtensionSpec>> {
///         let tag = self.0;
///         let mut extensions = IndexMap::new();
///         extensions.insert(
///             "log".to_string(),
///             vec![Extension::new(move |_, _| Ok(service(tag))).into()],
///         );
///         extensions
///     }
/// }
///
/// let aggregate = AggregateServiceProvider::new([
///     ProviderHandle::new(Tag("a")),
///     ProviderHandle::new(Tag("b")),
/// ]);
/// assert_eq!(aggregate.extensions()["log"].len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AggregateServiceProvider {
    providers: Vec<ProviderHandle>,
}

impl AggregateServiceProvider {
    pub fn new(providers: impl IntoIterator<Item = ProviderHandle>) -> Self {
        Self {
            providers: providers.into_iter().collect(),
        }
    }

    /// Builds an aggregate from provider type names registered in `catalog`.
    ///
    /// Fails with [`DiError::InvalidProvider`](crate::DiError::InvalidProvider)
    /// on the first name that does not denote a provider.
    pub fn from_names<I, S>(catalog: &TypeCatalog, names: I) -> DiResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let providers = names
            .into_iter()
            .map(|name| ProviderHandle::from_catalog(catalog, name.as_ref()))
            .collect::<DiResult<Vec<_>>>()?;
        Ok(Self { providers })
    }

    pub fn push(&mut self, provider: ProviderHandle) -> &mut Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ServiceProvider for AggregateServiceProvider {
    fn factories(&self) -> IndexMap<String, FactorySpec> {
        self.providers
            .iter()
            .fold(IndexMap::new(), |mut merged, provider| {
                merged.extend(provider.factories());
                merged
            })
    }

    fn extensions(&self) -> IndexMap<String, Vec<ExtensionSpec>> {
        self.providers
            .iter()
            .fold(IndexMap::new(), |mut merged, provider| {
                for (id, specs) in provider.extensions() {
                    merged.entry(id).or_insert_with(Vec::new).extend(specs);
                }
                merged
            })
    }
}
