use mirror_reflect::{Reflect, ResolutionConfig, ResolutionError, Value};
use mirror_types::Type;
use pretty_assertions::assert_eq;

use super::fixtures::{zoo, zoo_with};

#[test]
fn constructor_runs_against_the_fresh_instance() {
    let rt = zoo();
    let dog = Reflect::on_name(&rt, "zoo.Dog")
        .expect("zoo.Dog is registered")
        .create(&["rex".into()])
        .expect("Dog(String)");

    assert!(!dog.is_static_view());
    assert_eq!(dog.type_name(), "zoo.Dog");
    assert_eq!(dog.get_field("name").expect("name"), Value::str("rex"));
    // Untouched fields start at their type's default.
    assert_eq!(dog.get_field("barks").expect("barks"), Value::Int(0));
    assert_eq!(dog.get_field("id").expect("id"), Value::Long(0));
}

#[test]
fn constructors_are_not_inherited() {
    let rt = zoo();
    let err = Reflect::on_name(&rt, "zoo.Dog")
        .expect("zoo.Dog is registered")
        .create(&[])
        .expect_err("Dog has no no-arg constructor");
    assert_eq!(err.to_string(), "no such constructor: zoo.Dog()");
}

#[test]
fn private_constructors_need_the_declared_path() {
    let rt = zoo();
    let dog = Reflect::on_name(&rt, "zoo.Dog")
        .expect("zoo.Dog is registered")
        .create(&[Value::Int(7)])
        .expect("private Dog(int)");
    assert_eq!(dog.get_field("secret").expect("secret"), Value::Int(7));

    let rt = zoo_with(ResolutionConfig {
        declared_fallback: false,
        ..ResolutionConfig::default()
    });
    let err = Reflect::on_name(&rt, "zoo.Dog")
        .expect("zoo.Dog is registered")
        .create(&[Value::Int(7)])
        .expect_err("private constructor is hidden");
    assert!(
        matches!(err, ResolutionError::NoSuchConstructor { .. }),
        "{err:?}"
    );
}

#[test]
fn interfaces_and_abstract_classes_cannot_be_created() {
    let rt = zoo();
    for name in ["java.lang.CharSequence", "java.lang.Number"] {
        let err = Reflect::on_name(&rt, name)
            .expect("seeded class")
            .create(&[])
            .expect_err("not instantiable");
        assert!(
            matches!(err, ResolutionError::Instantiation { ref class, .. } if class == name),
            "{err:?}"
        );
    }
}

#[test]
fn unknown_classes_are_reported() {
    let rt = zoo();
    let err = Reflect::on_name(&rt, "zoo.Cat").expect_err("never registered");
    assert!(matches!(err, ResolutionError::ClassNotFound(ref name) if name == "zoo.Cat"));
}

#[test]
fn boxed_wrappers_construct_from_primitives() {
    let rt = zoo();
    let boxed = Reflect::on_name(&rt, "Integer")
        .expect("implicit java.lang lookup")
        .create(&[Value::Int(5)])
        .expect("Integer(int)");
    assert_eq!(boxed.get(), Value::Int(5));
    assert_eq!(boxed.type_name(), "java.lang.Integer");

    let unboxed = boxed.call("intValue", &[]).expect("intValue");
    assert_eq!(unboxed.type_name(), "int");
    assert_eq!(unboxed.ty(), &Type::int());
    assert_eq!(unboxed.get_as::<i64>().expect("int widens to i64"), 5);
}
