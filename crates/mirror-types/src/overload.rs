//! Applicability and specificity checks for overload selection.
//!
//! Callers gather candidate parameter lists (constructors or methods of one name) and use
//! [`is_applicable`] to filter and [`select_most_specific`] to rank them.

use crate::{is_assignable, Type, TypeEnv};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// Every parameter type is identical to the argument type.
    Exact,
    /// Every parameter type is assignable from the argument type (after boxing).
    Similar,
}

pub fn is_applicable(env: &dyn TypeEnv, params: &[Type], args: &[Type], mode: MatchMode) -> bool {
    if params.len() != args.len() {
        return false;
    }
    match mode {
        MatchMode::Exact => params.iter().zip(args).all(|(param, arg)| param == arg),
        MatchMode::Similar => params
            .iter()
            .zip(args)
            .all(|(param, arg)| is_assignable(env, param, arg)),
    }
}

/// `a` is at least as specific as `b`: same arity, and each `a_i` is assignable to `b_i`.
pub fn is_more_specific(env: &dyn TypeEnv, a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| is_assignable(env, b, a))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Empty,
    Unique(usize),
    /// Indices of the maximally specific candidates, in input order.
    Ambiguous(Vec<usize>),
}

/// Pick the most specific candidate.
///
/// Specificity is only a partial order: `f(A, B)` and `f(B, A)` are incomparable, as are
/// overloads over unrelated types. No total order is assumed; when more than one candidate is
/// maximal the result is [`Selection::Ambiguous`]. Maximal candidates with identical parameter
/// lists are the same signature seen twice and collapse to the first occurrence.
pub fn select_most_specific(env: &dyn TypeEnv, candidates: &[&[Type]]) -> Selection {
    match candidates.len() {
        0 => return Selection::Empty,
        1 => return Selection::Unique(0),
        _ => {}
    }

    let strictly_more_specific = |a: &[Type], b: &[Type]| {
        is_more_specific(env, a, b) && !is_more_specific(env, b, a)
    };

    let maximal: Vec<usize> = (0..candidates.len())
        .filter(|&idx| {
            !candidates
                .iter()
                .enumerate()
                .any(|(other, params)| other != idx && strictly_more_specific(params, candidates[idx]))
        })
        .collect();

    match maximal.as_slice() {
        [] => Selection::Empty,
        [only] => Selection::Unique(*only),
        [first, rest @ ..] => {
            if rest.iter().all(|idx| candidates[*idx] == candidates[*first]) {
                Selection::Unique(*first)
            } else {
                Selection::Ambiguous(maximal)
            }
        }
    }
}
