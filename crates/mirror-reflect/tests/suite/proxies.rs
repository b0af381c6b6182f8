use mirror_reflect::{MapRef, Proxy, ProxyTarget, Reflect, ResolutionError, Runtime, Value};
use pretty_assertions::assert_eq;

fn with_named() -> Runtime {
    let mut rt = Runtime::with_minimal_jdk();
    rt.define_interface("zoo.Named")
        .abstract_method("getName", &[], "java.lang.String")
        .abstract_method("setName", &["java.lang.String"], "void")
        .abstract_method("isFriendly", &[], "boolean")
        .register()
        .expect("zoo.Named registers");
    rt.define_interface("zoo.Sized")
        .implements("zoo.Named")
        .abstract_method("size", &[], "int")
        .register()
        .expect("zoo.Sized registers");
    rt.define_interface("zoo.Lookup")
        .abstract_method("get", &["java.lang.Object"], "java.lang.Object")
        .register()
        .expect("zoo.Lookup registers");
    rt
}

#[test]
fn map_bag_backs_bean_properties() {
    let rt = with_named();
    let bag: MapRef = [("name", "a")].into_iter().collect();
    let proxy = Proxy::new(&rt, "zoo.Named", Value::Map(bag.clone())).expect("zoo.Named");
    assert!(matches!(proxy.target(), ProxyTarget::Bag(_)));

    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), Some(Value::str("a")));
    assert_eq!(proxy.invoke("setName", &["b".into()]).expect("setName"), None);
    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), Some(Value::str("b")));
    assert_eq!(bag.get("name"), Some(Value::str("b")));
}

#[test]
fn absent_entries_read_as_none() {
    let rt = with_named();
    let proxy = Proxy::new(&rt, "zoo.Named", ProxyTarget::Bag(MapRef::new())).expect("zoo.Named");
    assert_eq!(proxy.invoke("isFriendly", &[]).expect("isFriendly"), None);
}

#[test]
fn methods_of_the_bag_take_precedence() {
    let rt = with_named();
    let bag: MapRef = [("name", "a"), ("other", "b")].into_iter().collect();
    let proxy = Proxy::new(&rt, "zoo.Sized", Value::Map(bag)).expect("zoo.Sized");

    // `size` is a HashMap method, not a property.
    assert_eq!(proxy.invoke("size", &[]).expect("size"), Some(Value::Int(2)));
    // Declared on the super interface.
    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), Some(Value::str("a")));
}

#[test]
fn undeclared_methods_are_rejected() {
    let rt = with_named();
    let proxy = Proxy::new(&rt, "zoo.Named", Value::Map(MapRef::new())).expect("zoo.Named");

    let err = proxy.invoke("getAge", &[]).expect_err("not on the interface");
    assert_eq!(err.to_string(), "no such method: zoo.Named.getAge/0");

    let err = proxy.invoke("getName", &["x".into()]).expect_err("wrong arity");
    assert!(matches!(err, ResolutionError::NoSuchMethod { .. }), "{err:?}");
}

#[test]
fn handle_targets_do_not_fall_back_to_properties() {
    let rt = with_named();
    let proxy = Reflect::on(&rt, "plain string")
        .as_proxy("zoo.Named")
        .expect("zoo.Named");
    assert!(matches!(proxy.target(), ProxyTarget::Handle(_)));

    let err = proxy.invoke("getName", &[]).expect_err("String has no getName");
    assert!(err.is_lookup_failure(), "{err:?}");
}

#[test]
fn handle_targets_dispatch_to_methods() {
    let mut rt = with_named();
    rt.define_class("zoo.Pet")
        .implements("zoo.Named")
        .constructor(&[], |_| Ok(Value::Null))
        .field("name", "java.lang.String")
        .method("getName", &[], "java.lang.String", |call| {
            Ok(call.this_object()?.field("name").unwrap_or_default())
        })
        .method("setName", &["java.lang.String"], "void", |call| {
            call.this_object()?.set_field("name", call.arg(0)?.clone());
            Ok(Value::Null)
        })
        .method("isFriendly", &[], "boolean", |_| Ok(Value::Boolean(true)))
        .register()
        .expect("zoo.Pet registers");

    let pet = Reflect::on_name(&rt, "zoo.Pet")
        .and_then(|p| p.create(&[]))
        .expect("Pet()");
    let proxy = pet.as_proxy("zoo.Named").expect("zoo.Named");

    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), None);
    assert_eq!(proxy.invoke("setName", &["rex".into()]).expect("setName"), None);
    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), Some(Value::str("rex")));
    assert_eq!(proxy.invoke("isFriendly", &[]).expect("isFriendly"), Some(Value::Boolean(true)));
}

#[test]
fn bag_properties_are_untyped() {
    let rt = with_named();
    let proxy = Proxy::new(&rt, "zoo.Named", Value::Map(MapRef::new())).expect("zoo.Named");

    assert_eq!(proxy.invoke("setName", &[Value::Int(3)]).expect("setName"), None);
    assert_eq!(proxy.invoke("getName", &[]).expect("getName"), Some(Value::Int(3)));
}

#[test]
fn invocation_failures_behind_a_bag_are_returned() {
    let rt = with_named();
    let proxy = Proxy::new(&rt, "zoo.Lookup", Value::Map(MapRef::new())).expect("zoo.Lookup");

    let err = proxy.invoke("get", &[Value::Int(1)]).expect_err("map keys must be strings");
    assert!(matches!(err, ResolutionError::Invocation { .. }), "{err:?}");
    assert_eq!(proxy.invoke("get", &["k".into()]).expect("get"), None);
}

#[test]
fn proxies_require_an_interface() {
    let rt = with_named();
    let err = Proxy::new(&rt, "java.lang.String", Value::Null).expect_err("not an interface");
    assert!(matches!(err, ResolutionError::IllegalArgument { .. }), "{err:?}");

    let err = Proxy::new(&rt, "zoo.Missing", Value::Null).expect_err("unknown");
    assert!(matches!(err, ResolutionError::ClassNotFound(_)), "{err:?}");
}
