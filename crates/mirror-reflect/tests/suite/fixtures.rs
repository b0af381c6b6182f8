use anyhow::anyhow;
use mirror_config::LoggingConfig;
use mirror_reflect::{Modifiers, ResolutionConfig, Runtime, Value};

/// `zoo.Animal` and `zoo.Dog extends zoo.Animal`, registered on a fresh minimal-JDK runtime.
pub(crate) fn zoo() -> Runtime {
    zoo_with(ResolutionConfig::default())
}

pub(crate) fn zoo_with(config: ResolutionConfig) -> Runtime {
    mirror_config::init_tracing(&LoggingConfig {
        level: "mirror.reflect=debug".to_string(),
        ..LoggingConfig::default()
    });
    let mut rt = Runtime::with_minimal_jdk().with_config(config);

    rt.define_class("zoo.Animal")
        .constructor(&[], |_| Ok(Value::Null))
        .field("name", "java.lang.String")
        .field_with(Modifiers::PRIVATE, "secret", "int")
        .field_with(Modifiers::PUBLIC.with_final(), "id", "long")
        .static_field("count", "int", 0)
        .method("speak", &[], "java.lang.String", |_| Ok(Value::str("...")))
        .method_with(
            Modifiers::PRIVATE,
            "whisper",
            &[],
            "java.lang.String",
            |_| Ok(Value::str("psst")),
        )
        .register()
        .expect("zoo.Animal registers");

    rt.define_class("zoo.Dog")
        .extends("zoo.Animal")
        .constructor(&["java.lang.String"], |call| {
            call.this_object()?.set_field("name", call.arg(0)?.clone());
            Ok(Value::Null)
        })
        .constructor_with(Modifiers::PRIVATE, &["int"], |call| {
            call.this_object()?.set_field("secret", call.arg(0)?.clone());
            Ok(Value::Null)
        })
        .field("barks", "int")
        .method("speak", &[], "java.lang.String", |_| Ok(Value::str("woof")))
        .method("bark", &[], "void", |call| {
            let this = call.this_object()?;
            let barks = this.field("barks").and_then(|v| v.get::<i32>()).unwrap_or(0);
            this.set_field("barks", barks + 1);
            Ok(Value::Null)
        })
        .method("greet", &["zoo.Animal"], "java.lang.String", |_| {
            Ok(Value::str("animal"))
        })
        .method("greet", &["zoo.Dog"], "java.lang.String", |_| Ok(Value::str("dog")))
        .method("feed", &["int"], "java.lang.String", |_| Ok(Value::str("int")))
        .method("feed", &["long"], "java.lang.String", |_| Ok(Value::str("long")))
        .method("pick", &["java.lang.Object"], "java.lang.String", |_| {
            Ok(Value::str("object"))
        })
        .method("pick", &["java.lang.String"], "java.lang.String", |_| {
            Ok(Value::str("string"))
        })
        .method("tie", &["java.lang.String"], "java.lang.String", |_| {
            Ok(Value::str("string"))
        })
        .method("tie", &["java.lang.Integer"], "java.lang.String", |_| {
            Ok(Value::str("integer"))
        })
        .method("wrap", &["int"], "java.lang.String", |_| Ok(Value::str("int")))
        .method("wrap", &["java.lang.Integer"], "java.lang.String", |_| {
            Ok(Value::str("Integer"))
        })
        .method("fail", &[], "void", |_| Err(anyhow!("boom")))
        .static_method("kind", &[], "java.lang.String", |_| Ok(Value::str("canine")))
        .register()
        .expect("zoo.Dog registers");

    rt
}
