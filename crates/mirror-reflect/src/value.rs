use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use mirror_types::{ClassId, PrimitiveType, Type, TypeEnv};
use parking_lot::RwLock;

/// A dynamically typed value flowing through resolution and invocation.
///
/// Primitive variants carry their boxed type at runtime (a `Value::Int` matches `Integer`
/// exactly and `int` only through similar matching). `Map` and `Object` are shared handles.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Map(MapRef),
    Object(ObjectRef),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type used to match this value against parameter lists.
    pub fn runtime_type(&self, env: &dyn TypeEnv) -> Type {
        let wk = env.well_known();
        match self {
            Value::Null => Type::Null,
            Value::Boolean(_) => Type::Class(wk.boolean),
            Value::Byte(_) => Type::Class(wk.byte),
            Value::Short(_) => Type::Class(wk.short),
            Value::Char(_) => Type::Class(wk.character),
            Value::Int(_) => Type::Class(wk.integer),
            Value::Long(_) => Type::Class(wk.long),
            Value::Float(_) => Type::Class(wk.float),
            Value::Double(_) => Type::Class(wk.double),
            Value::Str(_) => Type::Class(wk.string),
            Value::Map(_) => Type::Class(wk.hash_map),
            Value::Object(obj) => Type::Class(obj.class()),
        }
    }

    /// The value a freshly allocated field of type `ty` holds.
    pub fn default_for(ty: &Type) -> Self {
        match ty {
            Type::Primitive(prim) => match prim {
                PrimitiveType::Boolean => Value::Boolean(false),
                PrimitiveType::Byte => Value::Byte(0),
                PrimitiveType::Short => Value::Short(0),
                PrimitiveType::Char => Value::Char('\0'),
                PrimitiveType::Int => Value::Int(0),
                PrimitiveType::Long => Value::Long(0),
                PrimitiveType::Float => Value::Float(0.0),
                PrimitiveType::Double => Value::Double(0.0),
            },
            _ => Value::Null,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn get<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Str(v) => f.write_str(v),
            Value::Map(map) => {
                f.write_str("{")?;
                for (idx, (key, value)) in map.entries().into_iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Value::Object(obj) => write!(f, "object@{:x}", obj.identity_hash()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    char => Char,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    MapRef => Map,
    ObjectRef => Object,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion out of a [`Value`]. Integral and floating conversions only widen.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i8 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some((*v).into()),
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some((*v).into()),
            Value::Short(v) => Some((*v).into()),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some((*v).into()),
            Value::Short(v) => Some((*v).into()),
            Value::Int(v) => Some((*v).into()),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some((*v).into()),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl FromValue for MapRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Shared, insertion-ordered string-keyed map (`java.util.HashMap` at runtime).
#[derive(Clone, Debug, Default)]
pub struct MapRef(Arc<RwLock<IndexMap<String, Value>>>);

impl MapRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Snapshot of the entries, in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Maps compare by identity, like `Value::Map`.
impl PartialEq for MapRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapRef {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<IndexMap<_, _>>();
        MapRef(Arc::new(RwLock::new(map)))
    }
}

/// A live instance of a registered (non-native) class.
#[derive(Debug)]
pub struct Instance {
    class: ClassId,
    fields: RwLock<HashMap<String, Value>>,
}

#[derive(Clone, Debug)]
pub struct ObjectRef(Arc<Instance>);

impl ObjectRef {
    pub(crate) fn allocate(class: ClassId, fields: HashMap<String, Value>) -> Self {
        ObjectRef(Arc::new(Instance {
            class,
            fields: RwLock::new(fields),
        }))
    }

    pub fn class(&self) -> ClassId {
        self.0.class
    }

    /// Raw slot read, bypassing resolution. `None` if the instance has no such slot.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Raw slot write, bypassing resolution and type checks. Returns `false` (and writes
    /// nothing) if the instance has no such slot.
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> bool {
        match self.0.fields.write().get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn identity_hash(&self) -> u32 {
        // Truncation is fine; this only needs to be stable for the lifetime of the instance.
        Arc::as_ptr(&self.0) as usize as u32
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
