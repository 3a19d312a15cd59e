//! W-style unification: pure, returns a `Subst` rather than mutating
//! anything. This is the reference strategy used for proof-of-correctness;
//! `unify_j` is the production-style strategy that avoids the quadratic
//! substitution composition this style incurs.

use crate::error::{Diagnostic, DiagnosticKind};
use crate::subst::{self, Subst};
use crate::ty::{Ty, TyOp, TyVar};

/// Attempt to make `t1` and `t2` structurally equal, returning the
/// substitution recording how.
pub fn unify(t1: &Ty, t2: &Ty) -> Result<Subst, Diagnostic> {
    match (t1, t2) {
        (Ty::Op(a), Ty::Op(b)) => unify_ops(a, b)
            .map_err(|e| e.with_context(format!("when unifying types {t1} and {t2}"))),
        (Ty::Var(v), _) => bind(*v, t2.clone()),
        (_, Ty::Var(v)) => bind(*v, t1.clone()),
    }
}

fn bind(v: TyVar, ty: Ty) -> Result<Subst, Diagnostic> {
    if let Ty::Var(v2) = &ty {
        if *v2 == v {
            return Ok(Subst::empty());
        }
    }
    if ty.contains(v) {
        return Err(Diagnostic::new(DiagnosticKind::InfiniteType { var: v, ty }));
    }
    Ok(Subst::singleton(v, ty))
}

fn unify_ops(a: &TyOp, b: &TyOp) -> Result<Subst, Diagnostic> {
    if a.op != b.op {
        return Err(Diagnostic::new(DiagnosticKind::OperatorMismatch {
            op1: a.op.clone(),
            op2: b.op.clone(),
        }));
    }
    if a.args.len() != b.args.len() {
        return Err(Diagnostic::new(DiagnosticKind::ArityMismatch {
            op: a.op.clone(),
            expected: a.args.len(),
            found: b.args.len(),
        }));
    }

    let mut acc = Subst::empty();
    for (idx, (x, y)) in a.args.iter().zip(b.args.iter()).enumerate() {
        let x = subst::apply(&acc, x);
        let y = subst::apply(&acc, y);
        match unify(&x, &y) {
            Ok(s) => acc = subst::compose(&acc, &s),
            Err(e) => {
                return Err(e.with_context(format!(
                    "when unifying argument {} ({x} and {y}); substitution so far: {acc}",
                    idx + 1,
                )))
            }
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subst::apply;
    use crate::ty::Greek;

    #[test]
    fn unify_two_fresh_vars() {
        let a = TyVar::fresh(Greek::Alpha);
        let b = TyVar::fresh(Greek::Beta);
        let s = unify(&Ty::Var(a), &Ty::Var(b)).unwrap();
        assert_eq!(apply(&s, &Ty::Var(a)), Ty::Var(b));
    }

    #[test]
    fn unify_var_with_concrete() {
        let a = TyVar::fresh(Greek::Alpha);
        let s = unify(&Ty::Var(a), &Ty::int()).unwrap();
        assert_eq!(apply(&s, &Ty::Var(a)), Ty::int());
    }

    #[test]
    fn unify_identical_concrete_types_succeeds_with_empty_subst() {
        let s = unify(&Ty::int(), &Ty::int()).unwrap();
        assert_eq!(apply(&s, &Ty::int()), Ty::int());
    }

    #[test]
    fn unify_mismatched_operators_fails() {
        let err = unify(&Ty::int(), &Ty::bool_()).unwrap_err();
        assert!(matches!(err.kind(), DiagnosticKind::OperatorMismatch { .. }));
    }

    #[test]
    fn unify_function_arity_mismatch() {
        let f2 = Ty::fun(Ty::int(), Ty::int());
        let f3 = Ty::Op(TyOp { op: "->".into(), args: vec![Ty::int(), Ty::int(), Ty::int()] });
        let err = unify(&f2, &f3).unwrap_err();
        assert!(matches!(err.kind(), DiagnosticKind::ArityMismatch { .. }));
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let a = TyVar::fresh(Greek::Alpha);
        let t = Ty::fun(Ty::Var(a), Ty::int());
        let err = unify(&Ty::Var(a), &t).unwrap_err();
        assert!(matches!(err.kind(), DiagnosticKind::InfiniteType { .. }));
    }

    #[test]
    fn unify_functions_unifies_args_and_return_pairwise() {
        let a = TyVar::fresh(Greek::Alpha);
        let b = TyVar::fresh(Greek::Beta);
        let f1 = Ty::fun(Ty::Var(a), Ty::int());
        let f2 = Ty::fun(Ty::bool_(), Ty::Var(b));
        let s = unify(&f1, &f2).unwrap();
        assert_eq!(apply(&s, &Ty::Var(a)), Ty::bool_());
        assert_eq!(apply(&s, &Ty::Var(b)), Ty::int());
    }

    #[test]
    fn unify_is_symmetric_in_success() {
        let a = TyVar::fresh(Greek::Alpha);
        let t = Ty::fun(Ty::int(), Ty::bool_());
        assert!(unify(&Ty::Var(a), &t).is_ok());
        let b = TyVar::fresh(Greek::Beta);
        assert!(unify(&t, &Ty::Var(b)).is_ok());
    }

    #[test]
    fn unify_product_types() {
        let p1 = Ty::product(vec![Ty::int(), Ty::bool_()]);
        let p2 = Ty::product(vec![Ty::int(), Ty::bool_()]);
        assert!(unify(&p1, &p2).is_ok());
    }
}
