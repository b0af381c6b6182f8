use mirror_reflect::{MapRef, Reflect, ResolutionError, Runtime, Value};
use pretty_assertions::assert_eq;

#[test]
fn create_then_call_on_a_string() {
    let rt = Runtime::with_minimal_jdk();
    let len = Reflect::on_name(&rt, "java.lang.String")
        .and_then(|s| s.create(&["42".into()]))
        .and_then(|s| s.call("length", &[]))
        .and_then(|len| len.get_as::<i32>())
        .expect("String(\"42\").length()");
    assert_eq!(len, 2);
}

#[test]
fn string_arguments_match_char_sequence_parameters() {
    let rt = Runtime::with_minimal_jdk();
    let hello = Reflect::on(&rt, "hello");

    let found = hello.call("contains", &["ell".into()]).expect("contains(CharSequence)");
    assert_eq!(found.get(), Value::Boolean(true));

    let upper = hello.call("toUpperCase", &[]).expect("toUpperCase");
    assert_eq!(upper.get(), Value::str("HELLO"));

    let ch = hello.call("charAt", &[Value::Int(1)]).expect("charAt(int)");
    assert_eq!(ch.get(), Value::Char('e'));
}

#[test]
fn static_value_of_picks_the_unboxed_overload() {
    let rt = Runtime::with_minimal_jdk();
    let string = Reflect::on_name(&rt, "String").expect("implicit java.lang lookup");

    for (arg, expected) in [
        (Value::Int(5), "5"),
        (Value::Boolean(true), "true"),
        (Value::Double(1.5), "1.5"),
        (Value::Char('x'), "x"),
    ] {
        let rendered = string.call("valueOf", &[arg]).expect("valueOf resolves");
        assert_eq!(rendered.get(), Value::str(expected));
    }

    // A map only matches valueOf(Object).
    let map: MapRef = [("a", 1)].into_iter().collect();
    let rendered = string.call("valueOf", &[Value::Map(map)]).expect("valueOf(Object)");
    assert_eq!(rendered.get(), Value::str("{a=1}"));
}

#[test]
fn handler_errors_from_the_jdk_are_wrapped() {
    let rt = Runtime::with_minimal_jdk();
    let err = Reflect::on_name(&rt, "Integer")
        .and_then(|i| i.call("parseInt", &["forty-two".into()]))
        .expect_err("not a number");
    assert!(
        matches!(err, ResolutionError::Invocation { ref member, .. } if member == "java.lang.Integer.parseInt(java.lang.String)"),
        "{err:?}"
    );
}

#[test]
fn hash_map_members_operate_on_the_shared_map() {
    let rt = Runtime::with_minimal_jdk();
    let map = Reflect::on_name(&rt, "java.util.HashMap")
        .and_then(|m| m.create(&[]))
        .expect("HashMap()");

    map.call("put", &["k".into(), Value::Int(1)]).expect("put");
    assert_eq!(
        map.call("size", &[]).and_then(|s| s.get_as::<i32>()).expect("size"),
        1
    );
    assert_eq!(map.call("get", &["k".into()]).expect("get").get(), Value::Int(1));
    assert_eq!(map.call("get", &["absent".into()]).expect("get").get(), Value::Null);

    let shared = map.get_as::<MapRef>().expect("a map");
    assert_eq!(shared.get("k"), Some(Value::Int(1)));
}

#[test]
fn object_identity_methods() {
    let rt = Runtime::with_minimal_jdk();
    let object = Reflect::on_name(&rt, "java.lang.Object")
        .and_then(|o| o.create(&[]))
        .expect("Object()");

    let same = object.call("equals", &[object.get()]).expect("equals");
    assert_eq!(same.get(), Value::Boolean(true));
    let different = object.call("equals", &["x".into()]).expect("equals");
    assert_eq!(different.get(), Value::Boolean(false));

    let hash = object.call("hashCode", &[]).and_then(|h| h.get_as::<i32>());
    assert!(hash.is_ok(), "{hash:?}");
}
