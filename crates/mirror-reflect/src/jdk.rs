//! Native members of the minimal JDK seeded by [`mirror_types::TypeStore::with_minimal_jdk`].

use anyhow::{anyhow, bail};

use crate::define::ClassBuilder;
use crate::error::Result;
use crate::runtime::{CallArgs, Runtime};
use crate::value::{FromValue, MapRef, Value};

pub(crate) fn register(rt: &mut Runtime) {
    // Every type name used below is part of the seeded type store.
    register_all(rt).expect("minimal JDK members only mention minimal JDK types");
}

fn register_all(rt: &mut Runtime) -> Result<()> {
    for iface in [
        "java.io.Serializable",
        "java.lang.Cloneable",
        "java.lang.Comparable",
    ] {
        rt.define_interface(iface).register()?;
    }

    rt.define_interface("java.lang.CharSequence")
        .abstract_method("length", &[], "int")
        .abstract_method("charAt", &["int"], "char")
        .register()?;

    rt.define_interface("java.util.Map")
        .abstract_method("get", &["java.lang.Object"], "java.lang.Object")
        .abstract_method("put", &["java.lang.Object", "java.lang.Object"], "java.lang.Object")
        .abstract_method("containsKey", &["java.lang.Object"], "boolean")
        .abstract_method("remove", &["java.lang.Object"], "java.lang.Object")
        .abstract_method("size", &[], "int")
        .abstract_method("isEmpty", &[], "boolean")
        .register()?;

    register_object(rt)?;
    register_string(rt)?;
    register_number(rt)?;
    register_wrappers(rt)?;
    register_hash_map(rt)?;
    Ok(())
}

fn register_object(rt: &mut Runtime) -> Result<()> {
    rt.define_class("java.lang.Object")
        .constructor(&[], |_| Ok(Value::Null))
        .method("toString", &[], "java.lang.String", |call| {
            Ok(Value::str(to_java_string(call.runtime(), call.this()?)))
        })
        .method("hashCode", &[], "int", |call| Ok(Value::Int(java_hash(call.this()?))))
        .method("equals", &["java.lang.Object"], "boolean", |call| {
            Ok(Value::Boolean(call.this()? == call.arg(0)?))
        })
        .register()?;
    Ok(())
}

fn register_string(rt: &mut Runtime) -> Result<()> {
    let mut builder = rt
        .define_class("java.lang.String")
        .native()
        .constructor(&[], |_| Ok(Value::str("")))
        .constructor(&["java.lang.String"], |call| {
            Ok(Value::from(call.arg_as::<String>(0)?))
        })
        .method("length", &[], "int", |call| {
            let s = call.this_as::<String>()?;
            Ok(Value::Int(s.encode_utf16().count().try_into()?))
        })
        .method("isEmpty", &[], "boolean", |call| {
            Ok(Value::Boolean(call.this_as::<String>()?.is_empty()))
        })
        .method("charAt", &["int"], "char", |call| {
            let s = call.this_as::<String>()?;
            let idx = call.arg_as::<i32>(0)?;
            let unit = usize::try_from(idx)
                .ok()
                .and_then(|idx| s.encode_utf16().nth(idx))
                .ok_or_else(|| anyhow!("string index out of range: {idx}"))?;
            let ch = char::from_u32(unit.into())
                .ok_or_else(|| anyhow!("char at {idx} is half of a surrogate pair"))?;
            Ok(Value::Char(ch))
        })
        .method("concat", &["java.lang.String"], "java.lang.String", |call| {
            let mut s = call.this_as::<String>()?;
            s.push_str(&call.arg_as::<String>(0)?);
            Ok(Value::from(s))
        })
        .method("contains", &["java.lang.CharSequence"], "boolean", |call| {
            let s = call.this_as::<String>()?;
            Ok(Value::Boolean(s.contains(call.arg_as::<String>(0)?.as_str())))
        })
        .method("startsWith", &["java.lang.String"], "boolean", |call| {
            let s = call.this_as::<String>()?;
            Ok(Value::Boolean(s.starts_with(call.arg_as::<String>(0)?.as_str())))
        })
        .method("compareTo", &["java.lang.String"], "int", |call| {
            let a = call.this_as::<String>()?;
            let b = call.arg_as::<String>(0)?;
            Ok(Value::Int(compare_utf16(&a, &b)))
        })
        .method("trim", &[], "java.lang.String", |call| {
            Ok(Value::str(call.this_as::<String>()?.trim()))
        })
        .method("toUpperCase", &[], "java.lang.String", |call| {
            Ok(Value::from(call.this_as::<String>()?.to_uppercase()))
        })
        .method("toLowerCase", &[], "java.lang.String", |call| {
            Ok(Value::from(call.this_as::<String>()?.to_lowercase()))
        });

    for param in ["java.lang.Object", "int", "long", "double", "boolean", "char"] {
        builder = builder.static_method("valueOf", &[param], "java.lang.String", |call| {
            Ok(Value::str(to_java_string(call.runtime(), call.arg(0)?)))
        });
    }
    builder.register()?;
    Ok(())
}

enum Numeric {
    Integral(i64),
    Floating(f64),
}

fn numeric(call: &CallArgs<'_>) -> anyhow::Result<Numeric> {
    match call.this()? {
        Value::Byte(v) => Ok(Numeric::Integral((*v).into())),
        Value::Short(v) => Ok(Numeric::Integral((*v).into())),
        Value::Int(v) => Ok(Numeric::Integral((*v).into())),
        Value::Long(v) => Ok(Numeric::Integral(*v)),
        Value::Float(v) => Ok(Numeric::Floating((*v).into())),
        Value::Double(v) => Ok(Numeric::Floating(*v)),
        other => bail!("{} called on non-numeric receiver {other}", call.member()),
    }
}

// Narrowing below follows Java casts: integral values wrap, floating values saturate.
fn register_number(rt: &mut Runtime) -> Result<()> {
    rt.define_class("java.lang.Number")
        .native()
        .abstract_class()
        .method("intValue", &[], "int", |call| {
            Ok(Value::Int(match numeric(call)? {
                Numeric::Integral(v) => v as i32,
                Numeric::Floating(v) => v as i32,
            }))
        })
        .method("longValue", &[], "long", |call| {
            Ok(Value::Long(match numeric(call)? {
                Numeric::Integral(v) => v,
                Numeric::Floating(v) => v as i64,
            }))
        })
        .method("shortValue", &[], "short", |call| {
            Ok(Value::Short(match numeric(call)? {
                Numeric::Integral(v) => v as i16,
                Numeric::Floating(v) => v as i32 as i16,
            }))
        })
        .method("byteValue", &[], "byte", |call| {
            Ok(Value::Byte(match numeric(call)? {
                Numeric::Integral(v) => v as i8,
                Numeric::Floating(v) => v as i32 as i8,
            }))
        })
        .method("floatValue", &[], "float", |call| {
            Ok(Value::Float(match numeric(call)? {
                Numeric::Integral(v) => v as f32,
                Numeric::Floating(v) => v as f32,
            }))
        })
        .method("doubleValue", &[], "double", |call| {
            Ok(Value::Double(match numeric(call)? {
                Numeric::Integral(v) => v as f64,
                Numeric::Floating(v) => v,
            }))
        })
        .register()?;
    Ok(())
}

/// Boxing constructor, `valueOf` and `xxxValue` for one wrapper class.
fn wrapper<'rt, T>(rt: &'rt mut Runtime, class: &str, keyword: &str) -> ClassBuilder<'rt>
where
    T: FromValue + Into<Value> + 'static,
{
    rt.define_class(class)
        .native()
        .constructor(&[keyword], |call| Ok(call.arg_as::<T>(0)?.into()))
        .static_method("valueOf", &[keyword], class, |call| {
            Ok(call.arg_as::<T>(0)?.into())
        })
        .method(&format!("{keyword}Value"), &[], keyword, |call| {
            Ok(call.this_as::<T>()?.into())
        })
}

fn register_wrappers(rt: &mut Runtime) -> Result<()> {
    wrapper::<bool>(rt, "java.lang.Boolean", "boolean")
        .static_method("parseBoolean", &["java.lang.String"], "boolean", |call| {
            let s = call.arg_as::<Option<String>>(0)?;
            Ok(Value::Boolean(
                s.is_some_and(|s| s.eq_ignore_ascii_case("true")),
            ))
        })
        .register()?;
    wrapper::<char>(rt, "java.lang.Character", "char").register()?;
    wrapper::<i8>(rt, "java.lang.Byte", "byte").register()?;
    wrapper::<i16>(rt, "java.lang.Short", "short").register()?;
    wrapper::<i32>(rt, "java.lang.Integer", "int")
        .static_method("parseInt", &["java.lang.String"], "int", |call| {
            Ok(Value::Int(call.arg_as::<String>(0)?.parse()?))
        })
        .register()?;
    wrapper::<i64>(rt, "java.lang.Long", "long")
        .static_method("parseLong", &["java.lang.String"], "long", |call| {
            Ok(Value::Long(call.arg_as::<String>(0)?.parse()?))
        })
        .register()?;
    wrapper::<f32>(rt, "java.lang.Float", "float").register()?;
    wrapper::<f64>(rt, "java.lang.Double", "double")
        .static_method("parseDouble", &["java.lang.String"], "double", |call| {
            Ok(Value::Double(call.arg_as::<String>(0)?.trim().parse()?))
        })
        .register()?;
    Ok(())
}

fn map_key(call: &CallArgs<'_>) -> anyhow::Result<String> {
    match call.arg(0)? {
        Value::Str(key) => Ok(key.to_string()),
        other => bail!("{}: map keys must be strings, got {other}", call.member()),
    }
}

fn register_hash_map(rt: &mut Runtime) -> Result<()> {
    rt.define_class("java.util.HashMap")
        .native()
        .constructor(&[], |_| Ok(Value::Map(MapRef::new())))
        .method("get", &["java.lang.Object"], "java.lang.Object", |call| {
            let map = call.this_as::<MapRef>()?;
            Ok(map.get(&map_key(call)?).unwrap_or_default())
        })
        .method(
            "put",
            &["java.lang.Object", "java.lang.Object"],
            "java.lang.Object",
            |call| {
                let map = call.this_as::<MapRef>()?;
                let previous = map.insert(map_key(call)?, call.arg(1)?.clone());
                Ok(previous.unwrap_or_default())
            },
        )
        .method("containsKey", &["java.lang.Object"], "boolean", |call| {
            let map = call.this_as::<MapRef>()?;
            Ok(Value::Boolean(map.contains_key(&map_key(call)?)))
        })
        .method("remove", &["java.lang.Object"], "java.lang.Object", |call| {
            let map = call.this_as::<MapRef>()?;
            Ok(map.remove(&map_key(call)?).unwrap_or_default())
        })
        .method("size", &[], "int", |call| {
            Ok(Value::Int(call.this_as::<MapRef>()?.len().try_into()?))
        })
        .method("isEmpty", &[], "boolean", |call| {
            Ok(Value::Boolean(call.this_as::<MapRef>()?.is_empty()))
        })
        .register()?;
    Ok(())
}

/// `Object.toString()`: instances render as `binary.Name@hash`, everything else as its value.
pub(crate) fn to_java_string(rt: &Runtime, value: &Value) -> String {
    match value {
        Value::Object(obj) => format!("{}@{:x}", rt.class_name(obj.class()), obj.identity_hash()),
        other => other.to_string(),
    }
}

/// `Object.hashCode()` with the JDK's value-based hashes for strings, boxes and maps.
pub(crate) fn java_hash(value: &Value) -> i32 {
    match value {
        Value::Null => 0,
        Value::Boolean(true) => 1231,
        Value::Boolean(false) => 1237,
        Value::Byte(v) => (*v).into(),
        Value::Short(v) => (*v).into(),
        Value::Char(v) => *v as i32,
        Value::Int(v) => *v,
        Value::Long(v) => (*v ^ ((*v as u64) >> 32) as i64) as i32,
        Value::Float(v) => v.to_bits() as i32,
        Value::Double(v) => {
            let bits = v.to_bits();
            (bits ^ (bits >> 32)) as i32
        }
        Value::Str(s) => s
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit.into())),
        Value::Map(map) => map.entries().iter().fold(0i32, |h, (k, v)| {
            h.wrapping_add(java_hash(&Value::str(k)) ^ java_hash(v))
        }),
        Value::Object(obj) => obj.identity_hash() as i32,
    }
}

fn compare_utf16(a: &str, b: &str) -> i32 {
    let mut a_units = a.encode_utf16();
    let mut b_units = b.encode_utf16();
    loop {
        match (a_units.next(), b_units.next()) {
            (Some(x), Some(y)) if x != y => return i32::from(x) - i32::from(y),
            (Some(_), Some(_)) => continue,
            (Some(_), None) => return 1 + a_units.count() as i32,
            (None, Some(_)) => return -(1 + b_units.count() as i32),
            (None, None) => return 0,
        }
    }
}
