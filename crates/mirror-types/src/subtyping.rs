use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassKind, PrimitiveType, Type, TypeEnv};

/// Replace a primitive type by its wrapper class; every other type is returned unchanged.
pub fn boxed(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Primitive(prim) => Type::Class(env.well_known().wrapper(*prim)),
        other => other.clone(),
    }
}

/// The primitive type a wrapper class boxes, if `ty` is one.
pub fn unboxed(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Primitive(prim) => Some(*prim),
        Type::Class(id) => env.well_known().primitive_of(*id),
        _ => None,
    }
}

/// Whether `sub` is `sup` or inherits from it through super classes or interfaces.
///
/// Interfaces are treated as subtypes of `java.lang.Object`.
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup {
        return true;
    }

    let object = env.well_known().object;
    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if current == sup {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        if let Some(sc) = def.super_class {
            queue.push_back(sc);
        }
        queue.extend(def.interfaces.iter().copied());
        if def.kind == ClassKind::Interface {
            queue.push_back(object);
        }
    }
    false
}

/// Wrapped assignability: can a value of type `source` be passed where `target` is declared?
///
/// Primitive and boxed types are interchangeable (both sides are boxed before comparing), but
/// there is no primitive widening: an `Integer` is not assignable to `long`. The null marker is
/// compatible with every non-void target.
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if matches!(target, Type::Void) || matches!(source, Type::Void) {
        return false;
    }
    if matches!(source, Type::Null) {
        return true;
    }
    if target == source {
        return true;
    }

    let target = boxed(env, target);
    let source = boxed(env, source);
    match (&target, &source) {
        (Type::Class(t), Type::Class(s)) => is_subclass(env, *s, *t),
        (Type::Class(t), Type::Array(_)) => {
            let wk = env.well_known();
            *t == wk.object || *t == wk.cloneable || *t == wk.serializable
        }
        (Type::Array(t), Type::Array(s)) => match (t.as_ref(), s.as_ref()) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (t, s) => is_assignable(env, t, s),
        },
        _ => false,
    }
}
