use std::collections::{HashSet, VecDeque};

use mirror_types::{ClassId, ClassKind, TypeEnv};

use crate::error::{ResolutionError, Result};
use crate::reflect::Reflect;
use crate::runtime::Runtime;
use crate::value::{MapRef, Value};

const TARGET: &str = "mirror.reflect";

/// What a [`Proxy`] forwards to.
#[derive(Clone, Debug, PartialEq)]
pub enum ProxyTarget {
    /// A typed handle: every call is a method call on the value.
    Handle(Value),
    /// A key-value bag: method calls first, then bean-style property access on the entries.
    Bag(MapRef),
}

impl ProxyTarget {
    pub fn value(&self) -> Value {
        match self {
            ProxyTarget::Handle(value) => value.clone(),
            ProxyTarget::Bag(map) => Value::Map(map.clone()),
        }
    }
}

impl From<Value> for ProxyTarget {
    fn from(value: Value) -> Self {
        match value {
            Value::Map(map) => ProxyTarget::Bag(map),
            other => ProxyTarget::Handle(other),
        }
    }
}

/// Exposes a target through an interface.
///
/// Each interface call is first dispatched as a same-named call on the target. When that fails
/// to resolve and the target is a [`ProxyTarget::Bag`], `getX()`/`isX()` read entry `x` and
/// `setX(v)` writes it. Failures are returned, never swallowed: `Ok(None)` means a `void` call,
/// a `null` result, or an absent entry.
#[derive(Clone, Debug)]
pub struct Proxy<'rt> {
    runtime: &'rt Runtime,
    interface: ClassId,
    target: ProxyTarget,
}

impl<'rt> Proxy<'rt> {
    pub fn new(runtime: &'rt Runtime, interface: &str, target: impl Into<ProxyTarget>) -> Result<Self> {
        let id = runtime
            .lookup_class(interface)
            .filter(|id| runtime.is_defined(*id))
            .ok_or_else(|| ResolutionError::ClassNotFound(interface.to_string()))?;
        let is_interface = runtime
            .class(id)
            .is_some_and(|def| def.kind == ClassKind::Interface);
        if !is_interface {
            return Err(ResolutionError::IllegalArgument {
                member: "proxy".to_string(),
                expected: "an interface".to_string(),
                found: runtime.class_name(id).to_string(),
            });
        }
        Ok(Self {
            runtime,
            interface: id,
            target: target.into(),
        })
    }

    pub fn interface(&self) -> ClassId {
        self.interface
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    /// Whether the interface (or one of its super interfaces) declares `name` with `arity`
    /// parameters.
    fn declares(&self, name: &str, arity: usize) -> bool {
        let mut queue = VecDeque::from([self.interface]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let declared = self
                .runtime
                .declared_methods(current)
                .iter()
                .any(|m| m.name == name && m.params.len() == arity);
            if declared {
                return true;
            }
            if let Some(def) = self.runtime.class(current) {
                queue.extend(def.interfaces.iter().copied());
            }
        }
        false
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        if !self.declares(name, args.len()) {
            return Err(ResolutionError::NoSuchMethod {
                signature: format!(
                    "{}.{name}/{}",
                    self.runtime.class_name(self.interface),
                    args.len()
                ),
            });
        }

        let err = match Reflect::on(self.runtime, self.target.value()).invoke(name, args) {
            Ok((_, Value::Null)) => return Ok(None),
            Ok((_, value)) => return Ok(Some(value)),
            Err(err) => err,
        };

        let ProxyTarget::Bag(map) = &self.target else {
            return Err(err);
        };
        if !err.is_lookup_failure() {
            return Err(err);
        }

        match (args, accessor(name)) {
            ([], Some(Accessor::Get(key))) | ([], Some(Accessor::Is(key))) => {
                tracing::debug!(target: TARGET, method = name, key = %key, "proxy property read");
                Ok(map.get(&key).filter(|v| !v.is_null()))
            }
            ([value], Some(Accessor::Set(key))) => {
                tracing::debug!(target: TARGET, method = name, key = %key, "proxy property write");
                map.insert(key, value.clone());
                Ok(None)
            }
            _ => Err(err),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Accessor {
    Get(String),
    Is(String),
    Set(String),
}

fn accessor(name: &str) -> Option<Accessor> {
    if let Some(rest) = name.strip_prefix("get") {
        return Some(Accessor::Get(property(rest)));
    }
    if let Some(rest) = name.strip_prefix("is") {
        return Some(Accessor::Is(property(rest)));
    }
    name.strip_prefix("set")
        .map(|rest| Accessor::Set(property(rest)))
}

/// `Name` -> `name`, `X` -> `x`, `` -> ``.
fn property(rest: &str) -> String {
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
