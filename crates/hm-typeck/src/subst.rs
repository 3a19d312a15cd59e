//! Explicit substitutions, used only by the W-style strategy.
//!
//! A `Subst` maps type variables to monotypes. Unlike the J-style
//! strategy's in-place resolution table, nothing here mutates a `Ty` in
//! place: applying a substitution always produces a new value.

use crate::ty::{Ty, TyOp, TyVar};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Clone, Debug, Default)]
pub struct Subst {
    map: FxHashMap<TyVar, Ty>,
}

impl fmt::Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.map.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{")?;
        for (idx, (v, t)) in self.map.iter().enumerate() {
            write!(f, "{v} ↦ {t}")?;
            if idx != self.map.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, "}}")
    }
}

impl Subst {
    pub fn empty() -> Subst {
        Subst { map: FxHashMap::default() }
    }

    pub fn singleton(v: TyVar, ty: Ty) -> Subst {
        let mut map = FxHashMap::default();
        map.insert(v, ty);
        Subst { map }
    }

    pub fn get(&self, v: &TyVar) -> Option<&Ty> {
        self.map.get(v)
    }
}

/// Structurally copy `ty`, replacing any variable `v` with `s(v)` where
/// defined, recursing into operator arguments.
pub fn apply(s: &Subst, ty: &Ty) -> Ty {
    match ty {
        Ty::Var(v) => s.get(v).cloned().unwrap_or_else(|| ty.clone()),
        Ty::Op(op) => Ty::Op(TyOp {
            op: op.op.clone(),
            args: op.args.iter().map(|a| apply(s, a)).collect(),
        }),
    }
}

/// Compose `s1` (older/base) with `s2` (newer/refining): for each `x ↦ t`
/// in `s1`, replace `t` with `s2(t)`; then merge in any `y ↦ u` from `s2`
/// with `y` not already bound by `s1`. The result represents applying `s1`
/// and then `s2`.
pub fn compose(s1: &Subst, s2: &Subst) -> Subst {
    let mut map = FxHashMap::default();
    for (k, v) in &s1.map {
        map.insert(*k, apply(s2, v));
    }
    for (k, v) in &s2.map {
        map.entry(*k).or_insert_with(|| v.clone());
    }
    Subst { map }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Greek;

    #[test]
    fn apply_replaces_bound_variable() {
        let v = TyVar::fresh(Greek::Alpha);
        let s = Subst::singleton(v, Ty::int());
        assert_eq!(apply(&s, &Ty::Var(v)), Ty::int());
    }

    #[test]
    fn apply_is_identity_on_unbound_variable() {
        let v = TyVar::fresh(Greek::Alpha);
        let s = Subst::empty();
        assert_eq!(apply(&s, &Ty::Var(v)), Ty::Var(v));
    }

    #[test]
    fn apply_recurses_into_operator_args() {
        let v = TyVar::fresh(Greek::Alpha);
        let s = Subst::singleton(v, Ty::int());
        let t = Ty::fun(Ty::Var(v), Ty::bool_());
        assert_eq!(apply(&s, &t), Ty::fun(Ty::int(), Ty::bool_()));
    }

    #[test]
    fn compose_applies_newer_substitution_to_older_range() {
        let a = TyVar::fresh(Greek::Alpha);
        let b = TyVar::fresh(Greek::Beta);
        let s1 = Subst::singleton(a, Ty::Var(b));
        let s2 = Subst::singleton(b, Ty::int());
        let composed = compose(&s1, &s2);
        assert_eq!(apply(&composed, &Ty::Var(a)), Ty::int());
    }

    #[test]
    fn compose_keeps_newer_bindings_not_in_older() {
        let a = TyVar::fresh(Greek::Alpha);
        let b = TyVar::fresh(Greek::Beta);
        let s1 = Subst::singleton(a, Ty::int());
        let s2 = Subst::singleton(b, Ty::bool_());
        let composed = compose(&s1, &s2);
        assert_eq!(apply(&composed, &Ty::Var(a)), Ty::int());
        assert_eq!(apply(&composed, &Ty::Var(b)), Ty::bool_());
    }

    #[test]
    fn compose_prefers_older_binding_when_both_bind_same_var() {
        let a = TyVar::fresh(Greek::Alpha);
        let s1 = Subst::singleton(a, Ty::int());
        let s2 = Subst::singleton(a, Ty::bool_());
        let composed = compose(&s1, &s2);
        assert_eq!(apply(&composed, &Ty::Var(a)), Ty::int());
    }
}
