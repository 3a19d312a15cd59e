//! The W-style inference driver: pure, threading an explicit substitution
//! through the traversal instead of mutating anything. Each rule takes the
//! substitution accumulated so far, applies it wherever a type is read
//! back out of the environment, and returns the refined substitution
//! alongside its result type.
//!
//! The pre-distillation reference only sketches `unify`/`Subst` for this
//! style; the full expression-by-expression driver below is this crate's
//! own generalization of that sketch to the complete rule set, built to
//! the same shape as the J-style driver in `infer_j`.

use crate::env::Env;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::expr::Expr;
use crate::subst::{self, Subst};
use crate::ty::{Greek, Scheme, Ty, TyVar};
use crate::unify_w;

/// Infer the type of `expr` in `env` given the substitution accumulated so
/// far, returning the refined substitution and the expression's type.
pub fn infer(env: &Env<'_>, subst: &Subst, expr: &Expr) -> Result<(Subst, Ty), Diagnostic> {
    infer_inner(env, subst, expr)
        .map_err(|d| d.with_context(format!("when checking expression `{expr}`")))
}

fn infer_inner(env: &Env<'_>, subst: &Subst, expr: &Expr) -> Result<(Subst, Ty), Diagnostic> {
    match expr {
        Expr::LitInt(_) => Ok((subst.clone(), Ty::int())),
        Expr::LitBool(_) => Ok((subst.clone(), Ty::bool_())),
        Expr::LitStr(_) => Ok((subst.clone(), Ty::str_())),

        Expr::Var(name) => match env.lookup(name) {
            Some(scheme) => {
                let resolved = Scheme { vars: scheme.vars.clone(), ty: subst::apply(subst, &scheme.ty) };
                Ok((subst.clone(), resolved.instantiate()))
            }
            None => Err(Diagnostic::new(DiagnosticKind::UndefinedIdentifier(name.clone()))),
        },

        Expr::Abs(x, body) => {
            let beta = TyVar::fresh(Greek::Beta);
            let mut inner = Env::child(env);
            inner.insert(x.clone(), Scheme::mono(Ty::Var(beta)));
            inner.non_generic.insert(beta);
            let eta = TyVar::fresh(Greek::Eta);
            inner.return_ty = Some(eta);

            let (s1, t_body) = infer(&inner, subst, body)?;
            let eta_ty = subst::apply(&s1, &Ty::Var(eta));
            let s2 = unify_w::unify(&eta_ty, &t_body)?;
            let s = subst::compose(&s1, &s2);
            let beta_final = subst::apply(&s, &Ty::Var(beta));
            let body_final = subst::apply(&s, &t_body);
            Ok((s, Ty::fun(beta_final, body_final)))
        }

        Expr::App(f, a) => {
            let (s1, t_f) = infer(env, subst, f)?;
            let (s2, t_a) = infer(env, &s1, a)?;
            let pi = TyVar::fresh(Greek::Pi);
            let lhs = Ty::fun(t_a, Ty::Var(pi));
            let rhs = subst::apply(&s2, &t_f);
            let s3 = unify_w::unify(&lhs, &rhs)?;
            let s = subst::compose(&s2, &s3);
            let pi_resolved = subst::apply(&s, &Ty::Var(pi));
            let result = match &pi_resolved {
                Ty::Var(v) if *v == pi => Ty::Var(TyVar::fresh(Greek::Eta)),
                _ => pi_resolved,
            };
            Ok((s, result))
        }

        Expr::Let(x, e1, e2) => {
            let mut inner = Env::child(env);
            let (s1, t1) = infer(&inner, subst, e1)?;
            let scheme = generalize(&inner, &s1, &t1);
            inner.insert(x.clone(), scheme);
            infer(&inner, &s1, e2)
        }

        Expr::LetRec(bindings, body) => {
            if bindings.is_empty() {
                return Err(Diagnostic::new(DiagnosticKind::InvariantViolation(
                    "let rec with no bindings".into(),
                )));
            }
            let mut inner = Env::child(env);
            let mut placeholders = Vec::with_capacity(bindings.len());
            for (name, _) in bindings {
                let gamma = TyVar::fresh(Greek::Gamma);
                inner.insert(name.clone(), Scheme::mono(Ty::Var(gamma)));
                inner.non_generic.insert(gamma);
                placeholders.push(gamma);
            }
            let mut s = subst.clone();
            for ((_, binding_expr), gamma) in bindings.iter().zip(&placeholders) {
                let (s_i, t_i) = infer(&inner, &s, binding_expr)?;
                let target = subst::apply(&s_i, &Ty::Var(*gamma));
                let s_u = unify_w::unify(&target, &t_i)?;
                s = subst::compose(&s_i, &s_u);
            }
            for ((name, _), gamma) in bindings.iter().zip(&placeholders) {
                let scheme = generalize(&inner, &s, &Ty::Var(*gamma));
                inner.insert(name.clone(), scheme);
            }
            infer(&inner, &s, body)
        }

        Expr::If(c, t, e) => {
            let (s1, t_c) = infer(env, subst, c)?;
            let (s2, t_t) = infer(env, &s1, t)?;
            let (s3, t_e) = infer(env, &s2, e)?;
            let s4 = unify_w::unify(&subst::apply(&s3, &t_c), &Ty::bool_())?;
            let s5 = subst::compose(&s3, &s4);
            let s6 = unify_w::unify(&subst::apply(&s5, &t_t), &subst::apply(&s5, &t_e))?;
            let s = subst::compose(&s5, &s6);
            let result = subst::apply(&s, &t_t);
            Ok((s, result))
        }

        Expr::Stmt(stmts) => {
            if stmts.is_empty() {
                return Err(Diagnostic::new(DiagnosticKind::InvariantViolation(
                    "empty statement list".into(),
                )));
            }
            let mut s = subst.clone();
            let mut last = None;
            for stmt_expr in stmts {
                let (s_next, t) = infer(env, &s, stmt_expr)?;
                s = s_next;
                last = Some(t);
            }
            Ok((s, last.expect("non-empty statement list always yields a last type")))
        }

        Expr::Return(opt) => {
            let return_ty = env
                .closest_return_ty()
                .ok_or_else(|| Diagnostic::new(DiagnosticKind::ReturnOutsideFunction))?;
            let (s1, t_r) = match opt {
                Some(e) => infer(env, subst, e)?,
                None => (subst.clone(), Ty::unit()),
            };
            let s2 = unify_w::unify(&subst::apply(&s1, &Ty::Var(return_ty)), &t_r)?;
            let s = subst::compose(&s1, &s2);
            Ok((s, Ty::Var(TyVar::fresh(Greek::Eta))))
        }
    }
}

/// `generalize(Γ, τ)` under the W-style: `τ` is already fully substituted,
/// so generalization only needs to filter its free variables against the
/// environment's non-generic set.
fn generalize(env: &Env<'_>, subst: &Subst, ty: &Ty) -> Scheme {
    let resolved = subst::apply(subst, ty);
    let mut vars = Vec::new();
    resolved.collect_vars(&mut vars);
    let mut seen = rustc_hash::FxHashSet::default();
    let mut quantified = Vec::new();
    for v in vars {
        if seen.insert(v) && !env.is_non_generic(v) {
            quantified.push(v);
        }
    }
    Scheme { vars: quantified, ty: resolved }
}

/// Run inference for a standalone expression against the seed environment,
/// generalizing the result.
pub fn check(expr: &Expr) -> Result<Scheme, Diagnostic> {
    check_in(&crate::builtins::seed_env(), expr)
}

/// As `check`, but against a caller-supplied seed environment.
pub fn check_in(seed: &Env<'_>, expr: &Expr) -> Result<Scheme, Diagnostic> {
    let (s, ty) = infer(seed, &Subst::empty(), expr)?;
    Ok(generalize(seed, &s, &ty))
}
