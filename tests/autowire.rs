use keyed_di::{
    service, type_key, Arguments, Autowire, AutowireResolver, Container, DiError, NamedType,
    ParameterDescriptor, Resolver, Service, TypeCatalog, TypeDescriptor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::*;

fn autowire() -> Autowire {
    Autowire::new(Arc::new(fake_catalog()))
}

fn create<T: std::any::Any + Send + Sync>(autowire: &Autowire) -> Arc<T> {
    autowire
        .create(type_key::<T>(), None)
        .unwrap()
        .downcast::<T>()
        .unwrap_or_else(|_| panic!("expected {}", type_key::<T>()))
}

#[test]
fn test_create_instance_without_container() {
    let service = create::<FakeService>(&autowire());
    assert_eq!(service.kind(), "service");
}

#[test]
fn test_create_instance_with_container() {
    let dependency = Arc::new(FakeDependency);
    let locator = MapLocator::default().with(type_key::<FakeDependency>(), dependency.clone());

    let built = autowire()
        .create(type_key::<FakeService>(), Some(&locator))
        .unwrap()
        .downcast::<FakeService>()
        .unwrap_or_else(|_| panic!("expected FakeService"));

    assert!(Arc::ptr_eq(&built.dependency, &dependency));
}

#[test]
fn test_create_instance_with_optional_parameter() {
    let built = create::<FakeDefaultBuiltinParam>(&autowire());
    assert_eq!(built.param, DEFAULT_PARAM);
}

#[test]
fn test_non_instantiable_class() {
    let autowire = autowire();

    assert_eq!(
        autowire.create(type_key::<FakeNonInstantiable>(), None).unwrap_err(),
        DiError::CannotInstantiate(type_key::<FakeNonInstantiable>().to_string())
    );
    assert_eq!(
        autowire.create(interface_key(), None).unwrap_err(),
        DiError::CannotInstantiate(interface_key().to_string())
    );
}

#[test]
fn test_unknown_type() {
    assert_eq!(
        autowire().create("NoSuchType", None).unwrap_err(),
        DiError::UnknownType("NoSuchType".to_string())
    );
}

#[test]
fn test_unresolvable_param_names_parameter_and_type() {
    assert_eq!(
        autowire().create(type_key::<FakeUnresolvableTypedParam>(), None).unwrap_err(),
        DiError::CannotResolveParameter {
            parameter: "param".to_string(),
            declaring_type: type_key::<FakeUnresolvableTypedParam>().to_string(),
        }
    );
}

#[test]
fn test_optional_unnamed_param() {
    let built = create::<FakeOptionalUnnamedParam>(&autowire());
    assert!(built.param.is_none());
}

#[test]
fn test_required_unnamed_param() {
    assert!(matches!(
        autowire().create(type_key::<FakeRequiredUnnamedParam>(), None),
        Err(DiError::CannotResolveParameter { parameter, .. }) if parameter == "param"
    ));
}

#[test]
fn test_nullable_no_default_param() {
    let built = create::<FakeNullableNoDefaultParam>(&autowire());
    assert!(built.param.is_none());
}

#[test]
fn test_nullable_default_param() {
    let built = create::<FakeNullableDefaultParam>(&autowire());
    assert_eq!(built.param.as_ref().map(|p| p.kind()), Some("service"));
}

#[test]
fn test_nullable_param_prefers_container() {
    let bound: Arc<dyn FakeInterface> =
        Arc::new(FakeService { dependency: Arc::new(FakeDependency) });
    let locator = MapLocator::default().with(interface_key(), as_interface(bound.clone()));

    let built = autowire()
        .create(type_key::<FakeNullableNoDefaultParam>(), Some(&locator))
        .unwrap()
        .downcast::<FakeNullableNoDefaultParam>()
        .unwrap_or_else(|_| panic!("expected FakeNullableNoDefaultParam"));

    assert!(Arc::ptr_eq(built.param.as_ref().unwrap(), &bound));
}

#[test]
fn test_nullable_builtin_param() {
    let built = create::<FakeNullableBuiltinParam>(&autowire());
    assert!(built.param.is_none());
}

#[test]
fn test_union_param_falls_through_to_autowirable_member() {
    let built = create::<FakeUnionParam>(&autowire());
    assert!(built.dependency.downcast_ref::<FakeService>().is_some());
}

#[test]
fn test_union_param_prefers_earlier_registered_member() {
    let bound: Arc<dyn FakeInterface> =
        Arc::new(FakeService { dependency: Arc::new(FakeDependency) });
    let locator = MapLocator::default().with(interface_key(), as_interface(bound.clone()));

    let built = autowire()
        .create(type_key::<FakeUnionParam>(), Some(&locator))
        .unwrap()
        .downcast::<FakeUnionParam>()
        .unwrap_or_else(|_| panic!("expected FakeUnionParam"));

    let resolved = built.dependency.downcast_ref::<Arc<dyn FakeInterface>>().unwrap();
    assert!(Arc::ptr_eq(resolved, &bound));
}

#[derive(Debug)]
struct First;
#[derive(Debug)]
struct Second;
struct Either {
    chosen: Service,
}

fn either_catalog(first_instantiable: bool) -> TypeCatalog {
    let first = if first_instantiable {
        TypeDescriptor::of::<First>(|_| Ok(First))
    } else {
        TypeDescriptor::non_instantiable(type_key::<First>(), keyed_di::TypeKind::Abstract)
    };
    TypeCatalog::new()
        .with(first)
        .with(TypeDescriptor::of::<Second>(|_| Ok(Second)))
        .with(
            TypeDescriptor::of::<Either>(|args: Arguments| {
                Ok(Either {
                    chosen: args.service("value").ok_or_else(|| {
                        DiError::unresolved_parameter("value", args.declaring_type())
                    })?,
                })
            })
            .param(ParameterDescriptor::union(
                "value",
                [NamedType::class::<First>(), NamedType::class::<Second>()],
            )),
        )
}

#[test]
fn test_union_declaration_order_decides() {
    let registered_second = service(Second);
    let locator = MapLocator::default().with(type_key::<Second>(), registered_second.clone());

    // First is autowirable and declared first, so it wins over the registered Second.
    let either = Autowire::new(Arc::new(either_catalog(true)))
        .create(type_key::<Either>(), Some(&locator))
        .unwrap();
    let either = either.downcast_ref::<Either>().unwrap();
    assert!(either.chosen.downcast_ref::<First>().is_some());

    // First cannot be constructed, so resolution falls through to the registered Second.
    let either = Autowire::new(Arc::new(either_catalog(false)))
        .create(type_key::<Either>(), Some(&locator))
        .unwrap();
    let either = either.downcast_ref::<Either>().unwrap();
    assert!(Arc::ptr_eq(&either.chosen, &registered_second));
}

#[test]
fn test_union_builtin_param() {
    let built = create::<FakeUnionBuiltinParam>(&autowire());
    assert_eq!(built.param.as_ref().and_then(|p| p.downcast_ref::<i64>()), Some(&7));
}

#[test]
fn test_union_unresolvable_param() {
    assert_eq!(
        autowire().create(type_key::<FakeUnionUnresolvableParam>(), None).unwrap_err(),
        DiError::unresolved_parameter("dependency", type_key::<FakeUnionUnresolvableParam>())
    );
}

#[test]
fn test_union_optional_param() {
    let built = create::<FakeUnionOptionalParam>(&autowire());
    assert!(built.dependency.is_none());
}

#[test]
fn test_union_does_not_swallow_container_failures() {
    let catalog = TypeCatalog::new()
        .with(TypeDescriptor::of::<Second>(|_| Ok(Second)))
        .with(
            TypeDescriptor::of::<Either>(|args: Arguments| {
                Ok(Either { chosen: args.service("value").unwrap_or_else(|| service(())) })
            })
            .param(ParameterDescriptor::union(
                "value",
                [NamedType::class::<First>(), NamedType::class::<Second>()],
            )),
        );

    let container = Container::builder()
        .types(catalog)
        .autowire(true)
        .factory_fn(type_key::<First>(), |_, _| Err(DiError::NotFound("database".to_string())))
        .build();

    assert_eq!(
        container.get(type_key::<Either>()).unwrap_err(),
        DiError::NotFound("database".to_string())
    );
}

#[test]
fn test_autowiring_through_container_uses_registrations() {
    let dependency = Arc::new(FakeDependency);
    let container = Container::builder()
        .types(fake_catalog())
        .autowire(true)
        .instance(type_key::<FakeDependency>(), dependency.clone())
        .build();

    let built = container.get_as::<FakeService>(type_key::<FakeService>()).unwrap();
    assert!(Arc::ptr_eq(&built.dependency, &dependency));
}

#[test]
fn test_recursion_builds_fresh_dependencies() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();

    struct Leaf;
    struct Branch {
        leaf: Arc<Leaf>,
    }
    struct Root {
        branch: Arc<Branch>,
    }

    let catalog = TypeCatalog::new()
        .with(TypeDescriptor::of::<Leaf>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Leaf)
        }))
        .with(
            TypeDescriptor::of::<Branch>(|args: Arguments| {
                Ok(Branch { leaf: args.required("leaf")? })
            })
            .param(ParameterDescriptor::class::<Leaf>("leaf")),
        )
        .with(
            TypeDescriptor::of::<Root>(|args: Arguments| {
                Ok(Root { branch: args.required("branch")? })
            })
            .param(ParameterDescriptor::class::<Branch>("branch")),
        );

    let autowire = Autowire::new(Arc::new(catalog));
    let first = autowire.create(type_key::<Root>(), None).unwrap();
    let second = autowire.create(type_key::<Root>(), None).unwrap();

    let first = first.downcast_ref::<Root>().unwrap();
    let second = second.downcast_ref::<Root>().unwrap();
    assert!(!Arc::ptr_eq(&first.branch.leaf, &second.branch.leaf));
    assert_eq!(created.load(Ordering::SeqCst), 2);
}
