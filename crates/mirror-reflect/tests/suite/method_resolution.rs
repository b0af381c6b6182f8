use mirror_reflect::{AmbiguityPolicy, Reflect, ResolutionConfig, ResolutionError, Value};
use pretty_assertions::assert_eq;

use super::fixtures::{zoo, zoo_with};

fn dog(rt: &mirror_reflect::Runtime) -> Reflect<'_> {
    Reflect::on_name(rt, "zoo.Dog")
        .expect("zoo.Dog is registered")
        .create(&["rex".into()])
        .expect("public constructor resolves")
}

#[test]
fn boxed_argument_prefers_the_matching_primitive_over_a_wider_one() {
    let rt = zoo();
    let dog = dog(&rt);

    let picked = dog.call("feed", &[Value::Int(42)]).expect("feed(int) resolves");
    assert_eq!(picked.get_as::<String>().expect("string result"), "int");

    let picked = dog.call("feed", &[Value::Long(42)]).expect("feed(long) resolves");
    assert_eq!(picked.get_as::<String>().expect("string result"), "long");
}

#[test]
fn most_specific_reference_overload_wins() {
    let rt = zoo();
    let dog = dog(&rt);
    let animal = Reflect::on_name(&rt, "zoo.Animal")
        .expect("zoo.Animal is registered")
        .create(&[])
        .expect("animal constructor resolves");

    let greeting = dog.call("greet", &[dog.get()]).expect("greet(Dog)");
    assert_eq!(greeting.get(), Value::str("dog"));

    let greeting = dog.call("greet", &[animal.get()]).expect("greet(Animal)");
    assert_eq!(greeting.get(), Value::str("animal"));

    let picked = dog.call("pick", &["text".into()]).expect("pick(String)");
    assert_eq!(picked.get(), Value::str("string"));
    let picked = dog.call("pick", &[Value::Int(1)]).expect("pick(Object)");
    assert_eq!(picked.get(), Value::str("object"));
}

#[test]
fn null_argument_picks_the_most_specific_related_overload() {
    let rt = zoo();
    let picked = dog(&rt).call("pick", &[Value::Null]).expect("pick(null)");
    assert_eq!(picked.get(), Value::str("string"));
}

#[test]
fn null_argument_with_unrelated_overloads_is_ambiguous() {
    let rt = zoo();
    let err = dog(&rt)
        .call("tie", &[Value::Null])
        .expect_err("String and Integer are unrelated");

    let ResolutionError::Ambiguous {
        signature,
        candidates,
    } = err
    else {
        panic!("expected an ambiguity error, got {err:?}");
    };
    assert_eq!(signature, "zoo.Dog.tie(null)");
    assert_eq!(
        candidates,
        vec![
            "zoo.Dog.tie(java.lang.String)".to_string(),
            "zoo.Dog.tie(java.lang.Integer)".to_string(),
        ]
    );
}

#[test]
fn exact_match_wins_before_similar_ranking() {
    let rt = zoo();
    let dog = dog(&rt);

    // `wrap(int)` and `wrap(Integer)` are equally specific once boxing is allowed; only the
    // exact stage can tell them apart.
    let picked = dog.call("wrap", &[Value::Int(1)]).expect("exact wrap(Integer)");
    assert_eq!(picked.get(), Value::str("Integer"));

    let err = dog
        .call("wrap", &[Value::Null])
        .expect_err("null never matches exactly");
    let ResolutionError::Ambiguous { signature, candidates } = err else {
        panic!("expected an ambiguity error, got {err:?}");
    };
    assert_eq!(signature, "zoo.Dog.wrap(null)");
    assert_eq!(
        candidates,
        vec![
            "zoo.Dog.wrap(int)".to_string(),
            "zoo.Dog.wrap(java.lang.Integer)".to_string(),
        ]
    );
}

#[test]
fn first_declared_policy_breaks_ties() {
    let rt = zoo_with(ResolutionConfig {
        ambiguity: AmbiguityPolicy::FirstDeclared,
        ..ResolutionConfig::default()
    });
    let picked = dog(&rt).call("tie", &[Value::Null]).expect("first declared wins");
    assert_eq!(picked.get(), Value::str("string"));
}

#[test]
fn overrides_dispatch_to_the_most_derived_class() {
    let rt = zoo();
    let spoken = dog(&rt).call("speak", &[]).expect("speak resolves");
    assert_eq!(spoken.get(), Value::str("woof"));
    assert_eq!(spoken.type_name(), "java.lang.String");

    let rendered = dog(&rt)
        .call("toString", &[])
        .expect("inherited from Object")
        .get_as::<String>()
        .expect("string result");
    assert!(rendered.starts_with("zoo.Dog@"), "{rendered}");
}

#[test]
fn void_methods_return_the_receiver_for_chaining() {
    let rt = zoo();
    let dog = dog(&rt);
    let chained = dog
        .call("bark", &[])
        .and_then(|d| d.call("bark", &[]))
        .expect("bark chains");

    assert_eq!(chained.get(), dog.get());
    assert_eq!(dog.get_field("barks").expect("barks"), Value::Int(2));
}

#[test]
fn private_methods_resolve_through_the_declared_path() {
    let rt = zoo();
    let whispered = dog(&rt).call("whisper", &[]).expect("declared on zoo.Animal");
    assert_eq!(whispered.get(), Value::str("psst"));
}

#[test]
fn declared_path_can_be_disabled() {
    let rt = zoo_with(ResolutionConfig {
        declared_fallback: false,
        ..ResolutionConfig::default()
    });
    let err = dog(&rt).call("whisper", &[]).expect_err("only public members");
    assert!(
        matches!(err, ResolutionError::NoSuchMethod { ref signature } if signature == "zoo.Dog.whisper()"),
        "{err:?}"
    );
}

#[test]
fn static_view_only_sees_static_methods() {
    let rt = zoo();
    let class = Reflect::on_name(&rt, "zoo.Dog").expect("zoo.Dog is registered");
    assert!(class.is_static_view());

    let kind = class.call("kind", &[]).expect("static method");
    assert_eq!(kind.get(), Value::str("canine"));

    let err = class.call("speak", &[]).expect_err("instance method needs a receiver");
    assert!(matches!(err, ResolutionError::NoSuchMethod { .. }), "{err:?}");

    // Static methods are still callable through an instance.
    let kind = dog(&rt).call("kind", &[]).expect("static method via instance");
    assert_eq!(kind.get(), Value::str("canine"));
}

#[test]
fn handler_failures_surface_as_invocation_errors() {
    let rt = zoo();
    let err = dog(&rt).call("fail", &[]).expect_err("handler fails");
    assert!(!err.is_lookup_failure());

    let ResolutionError::Invocation { member, source } = &err else {
        panic!("expected an invocation error, got {err:?}");
    };
    assert_eq!(member, "zoo.Dog.fail()");
    assert_eq!(source.to_string(), "boom");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn unknown_methods_and_arities_are_not_found() {
    let rt = zoo();
    let dog = dog(&rt);

    let err = dog.call("fly", &[]).expect_err("no such method");
    assert!(err.is_lookup_failure());
    assert_eq!(err.to_string(), "no such method: zoo.Dog.fly()");

    let err = dog
        .call("feed", &["lots".into()])
        .expect_err("no feed(String)");
    assert!(matches!(err, ResolutionError::NoSuchMethod { .. }), "{err:?}");
}

#[test]
fn runtime_is_shared_across_threads() {
    let rt = zoo();
    let dog = dog(&rt);
    let target = dog.get();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let rt = &rt;
            let target = target.clone();
            scope.spawn(move || {
                Reflect::on(rt, target).call("bark", &[]).expect("bark");
            });
        }
    });

    // Increments race; every call lands on the same shared instance.
    let barks = dog.get_field("barks").expect("barks").get::<i32>().expect("int");
    assert!((1..=4).contains(&barks), "{barks}");
}
