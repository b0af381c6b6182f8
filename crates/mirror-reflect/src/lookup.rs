//! Member lookup: exact-signature match first, then similar (assignable) match ranked by
//! specificity.
//!
//! Both stages consult the public lookup path (public members of the class, its super classes
//! and its super interfaces, most-derived first) before the declared path (members of any
//! visibility, one super class level at a time). The declared path can be disabled through
//! [`ResolutionConfig::declared_fallback`](mirror_config::ResolutionConfig).

use std::collections::{HashSet, VecDeque};

use mirror_config::AmbiguityPolicy;
use mirror_types::{
    format_signature, is_applicable, select_most_specific, ClassId, MatchMode, Selection, Type,
    TypeEnv,
};

use crate::error::{ResolutionError, Result};
use crate::runtime::{ConstructorDef, FieldDef, MethodDef, NativeFn, Runtime};

const TARGET: &str = "mirror.reflect";

/// The class followed by its super classes, then every super interface (breadth first).
fn hierarchy(rt: &Runtime, class: ClassId) -> Vec<ClassId> {
    let chain = rt.superclass_chain(class);
    let mut out = chain.clone();
    let mut seen: HashSet<ClassId> = chain.iter().copied().collect();
    let mut queue: VecDeque<ClassId> = VecDeque::new();
    for level in &chain {
        if let Some(def) = rt.class(*level) {
            queue.extend(def.interfaces.iter().copied());
        }
    }
    while let Some(iface) = queue.pop_front() {
        if !seen.insert(iface) {
            continue;
        }
        out.push(iface);
        if let Some(def) = rt.class(iface) {
            queue.extend(def.interfaces.iter().copied());
        }
    }
    out
}

/// A resolved method together with its body. Abstract methods never resolve.
#[derive(Clone, Copy)]
pub(crate) struct Invocable<'rt> {
    pub(crate) method: &'rt MethodDef,
    pub(crate) handler: &'rt NativeFn,
}

impl<'rt> Invocable<'rt> {
    fn of(method: &'rt MethodDef, name: &str, static_only: bool) -> Option<Self> {
        if method.name != name || (static_only && !method.modifiers.is_static) {
            return None;
        }
        let handler = method.handler.as_ref()?;
        Some(Self { method, handler })
    }

    fn params(&self) -> &[Type] {
        &self.method.params
    }
}

/// Invocable public methods named `name`, with overrides collapsed onto the most-derived one.
fn public_methods<'rt>(
    rt: &'rt Runtime,
    class: ClassId,
    name: &str,
    static_only: bool,
) -> Vec<Invocable<'rt>> {
    let mut seen: HashSet<&[Type]> = HashSet::new();
    let mut out = Vec::new();
    for level in hierarchy(rt, class) {
        for method in rt.declared_methods(level) {
            if !method.modifiers.is_public() {
                continue;
            }
            let Some(found) = Invocable::of(method, name, static_only) else {
                continue;
            };
            if seen.insert(method.params.as_slice()) {
                out.push(found);
            }
        }
    }
    out
}

fn declared_methods<'rt>(
    rt: &'rt Runtime,
    level: ClassId,
    name: &str,
    static_only: bool,
) -> Vec<Invocable<'rt>> {
    rt.declared_methods(level)
        .iter()
        .filter_map(|m| Invocable::of(m, name, static_only))
        .collect()
}

/// Pick one candidate out of `candidates` (all already applicable).
fn choose<T: Copy>(
    rt: &Runtime,
    candidates: Vec<T>,
    params: impl Fn(&T) -> &[Type],
    signature: impl FnOnce() -> String,
    describe: impl Fn(&T) -> String,
) -> Result<Option<T>> {
    let lists: Vec<&[Type]> = candidates.iter().map(|c| params(c)).collect();
    match select_most_specific(rt, &lists) {
        Selection::Empty => Ok(None),
        Selection::Unique(idx) => Ok(Some(candidates[idx])),
        Selection::Ambiguous(maximal) => match rt.config().ambiguity {
            AmbiguityPolicy::FirstDeclared => {
                tracing::debug!(
                    target: TARGET,
                    candidates = maximal.len(),
                    "ambiguous overloads; taking the first declared"
                );
                Ok(Some(candidates[maximal[0]]))
            }
            AmbiguityPolicy::Error => Err(ResolutionError::Ambiguous {
                signature: signature(),
                candidates: maximal.iter().map(|idx| describe(&candidates[*idx])).collect(),
            }),
        },
    }
}

fn method_signature(rt: &Runtime, class: ClassId, name: &str, args: &[Type]) -> String {
    format_signature(rt, Some(&Type::Class(class)), name, args)
}

fn describe_method(rt: &Runtime, method: &MethodDef) -> String {
    format_signature(rt, Some(&Type::Class(method.owner)), &method.name, &method.params)
}

fn describe_constructor(rt: &Runtime, ctor: &ConstructorDef) -> String {
    format_signature(rt, None, rt.class_name(ctor.owner), &ctor.params)
}

/// Resolve `name(args)` on `class`. With `static_only` (no live receiver) instance methods are
/// not candidates.
pub(crate) fn resolve_method<'rt>(
    rt: &'rt Runtime,
    class: ClassId,
    name: &str,
    args: &[Type],
    static_only: bool,
) -> Result<Invocable<'rt>> {
    if let Some(found) = exact_method(rt, class, name, args, static_only) {
        return Ok(found);
    }
    tracing::debug!(
        target: TARGET,
        class = rt.class_name(class),
        method = name,
        "no exact match; trying similar signatures"
    );
    similar_method(rt, class, name, args, static_only)?.ok_or_else(|| {
        ResolutionError::NoSuchMethod {
            signature: method_signature(rt, class, name, args),
        }
    })
}

fn exact_method<'rt>(
    rt: &'rt Runtime,
    class: ClassId,
    name: &str,
    args: &[Type],
    static_only: bool,
) -> Option<Invocable<'rt>> {
    let public = public_methods(rt, class, name, static_only)
        .into_iter()
        .find(|m| is_applicable(rt, m.params(), args, MatchMode::Exact));
    if public.is_some() {
        tracing::trace!(target: TARGET, method = name, "exact public match");
        return public;
    }
    if !rt.config().declared_fallback {
        return None;
    }

    rt.superclass_chain(class).into_iter().find_map(|level| {
        declared_methods(rt, level, name, static_only)
            .into_iter()
            .find(|m| is_applicable(rt, m.params(), args, MatchMode::Exact))
    })
}

fn similar_method<'rt>(
    rt: &'rt Runtime,
    class: ClassId,
    name: &str,
    args: &[Type],
    static_only: bool,
) -> Result<Option<Invocable<'rt>>> {
    let signature = || method_signature(rt, class, name, args);
    let describe = |m: &Invocable<'_>| describe_method(rt, m.method);

    let public: Vec<_> = public_methods(rt, class, name, static_only)
        .into_iter()
        .filter(|m| is_applicable(rt, m.params(), args, MatchMode::Similar))
        .collect();
    if !public.is_empty() {
        tracing::trace!(target: TARGET, method = name, candidates = public.len(), "similar public match");
        return choose(rt, public, Invocable::params, signature, describe);
    }
    if !rt.config().declared_fallback {
        return Ok(None);
    }

    for level in rt.superclass_chain(class) {
        let declared: Vec<_> = declared_methods(rt, level, name, static_only)
            .into_iter()
            .filter(|m| is_applicable(rt, m.params(), args, MatchMode::Similar))
            .collect();
        if !declared.is_empty() {
            tracing::trace!(
                target: TARGET,
                method = name,
                level = rt.class_name(level),
                candidates = declared.len(),
                "similar declared match"
            );
            return choose(rt, declared, Invocable::params, signature, describe);
        }
    }
    Ok(None)
}

/// Constructors are never inherited: only `class`'s own constructors are candidates.
pub(crate) fn resolve_constructor<'rt>(
    rt: &'rt Runtime,
    class: ClassId,
    args: &[Type],
) -> Result<&'rt ConstructorDef> {
    let ctors = rt.constructors(class);
    let visible = |public_only: bool| {
        ctors
            .iter()
            .filter(move |c| !public_only || c.modifiers.is_public())
    };
    let mut paths = vec![true];
    if rt.config().declared_fallback {
        paths.push(false);
    }

    for &public_only in &paths {
        if let Some(found) =
            visible(public_only).find(|c| is_applicable(rt, &c.params, args, MatchMode::Exact))
        {
            return Ok(found);
        }
    }

    tracing::debug!(
        target: TARGET,
        class = rt.class_name(class),
        "no exact constructor; trying similar signatures"
    );
    let signature = || format_signature(rt, None, rt.class_name(class), args);
    for &public_only in &paths {
        let candidates: Vec<_> = visible(public_only)
            .filter(|c| is_applicable(rt, &c.params, args, MatchMode::Similar))
            .collect();
        if let Some(found) = choose(
            rt,
            candidates,
            |c| c.params.as_slice(),
            signature,
            |c| describe_constructor(rt, c),
        )? {
            return Ok(found);
        }
    }

    Err(ResolutionError::NoSuchConstructor {
        signature: signature(),
    })
}

/// Find field `name`: public fields along the hierarchy first, then declared fields of any
/// visibility up the super class chain.
pub(crate) fn resolve_field<'rt>(rt: &'rt Runtime, class: ClassId, name: &str) -> Result<&'rt FieldDef> {
    let public = hierarchy(rt, class).into_iter().find_map(|level| {
        rt.declared_fields(level)
            .iter()
            .find(|f| f.name == name && f.modifiers.is_public())
    });
    if let Some(field) = public {
        return Ok(field);
    }

    if rt.config().declared_fallback {
        let declared = rt
            .superclass_chain(class)
            .into_iter()
            .find_map(|level| rt.declared_fields(level).iter().find(|f| f.name == name));
        if let Some(field) = declared {
            tracing::trace!(target: TARGET, field = name, "declared field match");
            return Ok(field);
        }
    }

    Err(ResolutionError::NoSuchField {
        class: rt.class_name(class).to_string(),
        name: name.to_string(),
    })
}

/// Every field visible from `class`, most-derived declaration first.
pub(crate) fn all_fields(rt: &Runtime, class: ClassId) -> Vec<&FieldDef> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for level in hierarchy(rt, class) {
        for field in rt.declared_fields(level) {
            if seen.insert(field.name.as_str()) {
                out.push(field);
            }
        }
    }
    out
}
