//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use indexmap::IndexMap;
use keyed_di::{
    service, type_key, Arguments, AutowireResolver, Container, DiError, DiResult, Extension,
    ExtensionSpec, Factory, FactorySpec, NamedType, ParameterDescriptor, Resolver, Service,
    ServiceLocator, ServiceProvider, TypeCatalog, TypeDescriptor, TypeKind,
};

#[derive(Debug, Default)]
pub struct FakeDependency;

pub trait FakeInterface: Send + Sync {
    fn do_something(&self) -> Arc<FakeDependency>;
    fn kind(&self) -> &'static str;
}

pub struct FakeService {
    pub dependency: Arc<FakeDependency>,
}

impl FakeInterface for FakeService {
    fn do_something(&self) -> Arc<FakeDependency> {
        self.dependency.clone()
    }

    fn kind(&self) -> &'static str {
        "service"
    }
}

pub struct FakeDecorator {
    pub inner: Arc<dyn FakeInterface>,
    pub dependency: Arc<FakeDependency>,
}

impl FakeInterface for FakeDecorator {
    fn do_something(&self) -> Arc<FakeDependency> {
        self.inner.do_something()
    }

    fn kind(&self) -> &'static str {
        "decorator"
    }
}

pub const DEFAULT_PARAM: &str = "default";

pub struct FakeDefaultBuiltinParam {
    pub param: String,
}

pub struct FakeNullableDefaultParam {
    pub param: Option<Arc<dyn FakeInterface>>,
}

pub struct FakeNullableNoDefaultParam {
    pub param: Option<Arc<dyn FakeInterface>>,
}

pub struct FakeNullableBuiltinParam {
    pub param: Option<Arc<i64>>,
}

pub struct FakeOptionalUnnamedParam {
    pub param: Option<Service>,
}

pub struct FakeRequiredUnnamedParam;

pub struct FakeUnresolvableTypedParam;

/// `FakeInterface|FakeService`
pub struct FakeUnionParam {
    pub dependency: Service,
}

/// `int|string` with a default
pub struct FakeUnionBuiltinParam {
    pub param: Option<Service>,
}

/// `null|int|FakeInterface`
pub struct FakeUnionOptionalParam {
    pub dependency: Option<Service>,
}

/// `FakeInterface|FakeNonInstantiable`
pub struct FakeUnionUnresolvableParam;

pub struct FakeNonInstantiable;

/// Returned by [`FakeAutowire`] for every identifier.
#[derive(Debug)]
pub struct StdClass;

#[derive(Default)]
pub struct FakeAutowire;

impl AutowireResolver for FakeAutowire {
    fn create(
        &self,
        _type_name: &str,
        _container: Option<&dyn ServiceLocator>,
    ) -> DiResult<Service> {
        Ok(service(StdClass))
    }
}

pub fn interface_key() -> &'static str {
    type_key::<dyn FakeInterface>()
}

/// Wraps a trait object the way `Resolver::get_trait` expects it.
pub fn as_interface(value: Arc<dyn FakeInterface>) -> Service {
    service(value)
}

/// Reads a trait object out of a service, whichever way it was stored.
pub fn interface_of(value: &Service) -> Option<Arc<dyn FakeInterface>> {
    if let Some(stored) = value.downcast_ref::<Arc<dyn FakeInterface>>() {
        return Some(stored.clone());
    }
    value
        .clone()
        .downcast::<FakeService>()
        .ok()
        .map(|s| s as Arc<dyn FakeInterface>)
}

fn fake_service(dependency: Arc<FakeDependency>) -> Arc<dyn FakeInterface> {
    Arc::new(FakeService { dependency })
}

fn decorate(container: &Container, inner: Service) -> DiResult<Service> {
    let inner = inner
        .downcast_ref::<Arc<dyn FakeInterface>>()
        .cloned()
        .ok_or_else(|| DiError::TypeMismatch(interface_key().to_string()))?;
    let dependency = container.get_as::<FakeDependency>(type_key::<FakeDependency>())?;
    Ok(as_interface(Arc::new(FakeDecorator { inner, dependency })))
}

#[derive(Default)]
pub struct FakeFactoryProvider;

impl ServiceProvider for FakeFactoryProvider {
    fn factories(&self) -> IndexMap<String, FactorySpec> {
        let mut factories = IndexMap::new();
        factories.insert(
            interface_key().to_string(),
            Factory::new(|c, _| {
                let dependency = c.get_as::<FakeDependency>(type_key::<FakeDependency>())?;
                Ok(as_interface(fake_service(dependency)))
            })
            .into(),
        );
        factories
    }
}

#[derive(Default)]
pub struct FakeExtensionProvider;

impl ServiceProvider for FakeExtensionProvider {
    fn extensions(&self) -> IndexMap<String, Vec<ExtensionSpec>> {
        let mut extensions = IndexMap::new();
        extensions.insert(interface_key().to_string(), vec![Extension::new(decorate).into()]);
        extensions
    }
}

/// Factory registrations shared by builder tests.
pub fn fake_interface_factory() -> Factory {
    Factory::new(|_, _| Ok(as_interface(fake_service(Arc::new(FakeDependency)))))
}

/// Descriptors for every fake type.
pub fn fake_catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    catalog
        .register(TypeDescriptor::of::<FakeDependency>(|_| Ok(FakeDependency)))
        .register(
            TypeDescriptor::of::<FakeService>(|args: Arguments| {
                Ok(FakeService {
                    dependency: args.required::<FakeDependency>("dependency")?,
                })
            })
            .param(ParameterDescriptor::class::<FakeDependency>("dependency")),
        )
        .register(TypeDescriptor::interface::<dyn FakeInterface>())
        .register(TypeDescriptor::non_instantiable(
            type_key::<FakeNonInstantiable>(),
            TypeKind::Abstract,
        ))
        .register(
            TypeDescriptor::of::<FakeDefaultBuiltinParam>(|args: Arguments| {
                Ok(FakeDefaultBuiltinParam {
                    param: args.required::<String>("param")?.to_string(),
                })
            })
            .param(
                ParameterDescriptor::builtin("param", "string")
                    .default_value(DEFAULT_PARAM.to_string()),
            ),
        )
        .register(
            TypeDescriptor::of::<FakeNullableDefaultParam>(|args: Arguments| {
                Ok(FakeNullableDefaultParam {
                    param: args.service("param").as_ref().and_then(interface_of),
                })
            })
            .param(
                ParameterDescriptor::class::<dyn FakeInterface>("param")
                    .nullable()
                    .default_with(|| Some(as_interface(fake_service(Arc::new(FakeDependency))))),
            ),
        )
        .register(
            TypeDescriptor::of::<FakeNullableNoDefaultParam>(|args: Arguments| {
                Ok(FakeNullableNoDefaultParam {
                    param: args.service("param").as_ref().and_then(interface_of),
                })
            })
            .param(ParameterDescriptor::class::<dyn FakeInterface>("param").nullable()),
        )
        .register(
            TypeDescriptor::of::<FakeNullableBuiltinParam>(|args: Arguments| {
                Ok(FakeNullableBuiltinParam {
                    param: args.optional::<i64>("param")?,
                })
            })
            .param(ParameterDescriptor::builtin("param", "int").nullable()),
        )
        .register(
            TypeDescriptor::of::<FakeOptionalUnnamedParam>(|args: Arguments| {
                Ok(FakeOptionalUnnamedParam { param: args.service("param") })
            })
            .param(ParameterDescriptor::untyped("param").default_null()),
        )
        .register(
            TypeDescriptor::of::<FakeRequiredUnnamedParam>(|_| Ok(FakeRequiredUnnamedParam))
                .param(ParameterDescriptor::untyped("param")),
        )
        .register(
            TypeDescriptor::of::<FakeUnresolvableTypedParam>(|_| Ok(FakeUnresolvableTypedParam))
                .param(ParameterDescriptor::class::<dyn FakeInterface>("param")),
        )
        .register(
            TypeDescriptor::of::<FakeUnionParam>(|args: Arguments| {
                let dependency = args.service("dependency").ok_or_else(|| {
                    DiError::unresolved_parameter("dependency", args.declaring_type())
                })?;
                Ok(FakeUnionParam { dependency })
            })
            .param(ParameterDescriptor::union(
                "dependency",
                [NamedType::class::<dyn FakeInterface>(), NamedType::class::<FakeService>()],
            )),
        )
        .register(
            TypeDescriptor::of::<FakeUnionBuiltinParam>(|args: Arguments| {
                Ok(FakeUnionBuiltinParam { param: args.service("param") })
            })
            .param(
                ParameterDescriptor::union(
                    "param",
                    [NamedType::builtin("int"), NamedType::builtin("string")],
                )
                .default_value(7i64),
            ),
        )
        .register(
            TypeDescriptor::of::<FakeUnionOptionalParam>(|args: Arguments| {
                Ok(FakeUnionOptionalParam { dependency: args.service("dependency") })
            })
            .param(ParameterDescriptor::union(
                "dependency",
                [
                    NamedType::builtin("null"),
                    NamedType::builtin("int"),
                    NamedType::class::<dyn FakeInterface>(),
                ],
            )),
        )
        .register(
            TypeDescriptor::of::<FakeUnionUnresolvableParam>(|_| Ok(FakeUnionUnresolvableParam))
                .param(ParameterDescriptor::union(
                    "dependency",
                    [
                        NamedType::class::<dyn FakeInterface>(),
                        NamedType::class::<FakeNonInstantiable>(),
                    ],
                )),
        );
    catalog.register_autowire::<FakeAutowire>();
    catalog.register_provider::<FakeFactoryProvider>();
    catalog.register_provider::<FakeExtensionProvider>();
    catalog
}

/// A locator double answering from a fixed map.
#[derive(Default)]
pub struct MapLocator {
    pub entries: IndexMap<String, Service>,
}

impl MapLocator {
    pub fn with(mut self, id: impl Into<String>, value: Service) -> Self {
        self.entries.insert(id.into(), value);
        self
    }
}

impl ServiceLocator for MapLocator {
    fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn get(&self, id: &str) -> DiResult<Service> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| DiError::NotFound(id.to_string()))
    }
}
