//! The J-style inference driver: syntax-directed, mutating an `InferCtx`'s
//! union-find table as it goes, returning a single resolved `Ty` per rule.

use crate::env::Env;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::expr::Expr;
use crate::ty::{Greek, Scheme, Ty, TyVar};
use crate::unify_j::InferCtx;

fn as_var(ty: &Ty) -> TyVar {
    match ty {
        Ty::Var(v) => *v,
        _ => unreachable!("InferCtx::fresh always returns Ty::Var"),
    }
}

/// Infer the type of `expr` in `env`, mutating `ctx`'s unification table.
/// Every rule, on catching a diagnostic, appends a breadcrumb naming the
/// expression being checked and re-raises.
pub fn infer(ctx: &mut InferCtx, env: &Env<'_>, expr: &Expr) -> Result<Ty, Diagnostic> {
    infer_inner(ctx, env, expr)
        .map_err(|d| d.with_context(format!("when checking expression `{expr}`")))
}

fn infer_inner(ctx: &mut InferCtx, env: &Env<'_>, expr: &Expr) -> Result<Ty, Diagnostic> {
    match expr {
        Expr::LitInt(_) => Ok(Ty::int()),
        Expr::LitBool(_) => Ok(Ty::bool_()),
        Expr::LitStr(_) => Ok(Ty::str_()),

        Expr::Var(name) => match env.lookup(name) {
            // `ctx.instantiate` (not `Scheme::instantiate`) so every fresh
            // variable is registered with the union-find table before it
            // can reach `unify`.
            Some(scheme) => Ok(ctx.instantiate(scheme)),
            None => Err(Diagnostic::new(DiagnosticKind::UndefinedIdentifier(name.clone()))),
        },

        Expr::Abs(x, body) => {
            let beta = ctx.fresh(Greek::Beta);
            let beta_var = as_var(&beta);
            let mut inner = Env::child(env);
            inner.insert(x.clone(), Scheme::mono(beta.clone()));
            inner.non_generic.insert(beta_var);
            let eta = ctx.fresh(Greek::Eta);
            inner.return_ty = Some(as_var(&eta));

            let t_body = infer(ctx, &inner, body)?;
            ctx.unify(&eta, &t_body)?;
            Ok(Ty::fun(beta, t_body))
        }

        Expr::App(f, a) => {
            let t_f = infer(ctx, env, f)?;
            let t_a = infer(ctx, env, a)?;
            let pi = ctx.fresh(Greek::Pi);
            let pi_var = as_var(&pi);
            ctx.unify(&Ty::fun(t_a, pi.clone()), &t_f)?;
            if ctx.is_unresolved(pi_var) {
                Ok(ctx.fresh(Greek::Eta))
            } else {
                Ok(pi)
            }
        }

        Expr::Let(x, e1, e2) => {
            let mut inner = Env::child(env);
            let t1 = infer(ctx, &inner, e1)?;
            let scheme = ctx.generalize(&inner, &t1);
            inner.insert(x.clone(), scheme);
            infer(ctx, &inner, e2)
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
                let gamma = ctx.fresh(Greek::Gamma);
                let gv = as_var(&gamma);
                inner.insert(name.clone(), Scheme::mono(gamma));
                inner.non_generic.insert(gv);
                placeholders.push(gv);
            }
            for ((_, binding_expr), gv) in bindings.iter().zip(&placeholders) {
                let actual = infer(ctx, &inner, binding_expr)?;
                ctx.unify(&Ty::Var(*gv), &actual)?;
            }
            for ((name, _), gv) in bindings.iter().zip(&placeholders) {
                let scheme = ctx.generalize(&inner, &Ty::Var(*gv));
                inner.insert(name.clone(), scheme);
            }
            infer(ctx, &inner, body)
        }

        Expr::If(c, t, e) => {
            let t_c = infer(ctx, env, c)?;
            let t_t = infer(ctx, env, t)?;
            let t_e = infer(ctx, env, e)?;
            ctx.unify(&t_c, &Ty::bool_())?;
            ctx.unify(&t_t, &t_e)?;
            Ok(t_t)
        }

        Expr::Stmt(stmts) => {
            if stmts.is_empty() {
                return Err(Diagnostic::new(DiagnosticKind::InvariantViolation(
                    "empty statement list".into(),
                )));
            }
            let mut last = None;
            for s in stmts {
                last = Some(infer(ctx, env, s)?);
            }
            Ok(last.expect("non-empty statement list always yields a last type"))
        }

        Expr::Return(opt) => {
            let return_ty = env
                .closest_return_ty()
                .ok_or_else(|| Diagnostic::new(DiagnosticKind::ReturnOutsideFunction))?;
            let t_r = match opt {
                Some(e) => infer(ctx, env, e)?,
                None => Ty::unit(),
            };
            ctx.unify(&Ty::Var(return_ty), &t_r)?;
            Ok(ctx.fresh(Greek::Eta))
        }
    }
}

/// Run inference for a standalone expression against the seed environment,
/// generalizing the result. This is the convenience entry point used by
/// `hm-driver` and by whole-expression tests.
pub fn check(expr: &Expr) -> Result<Scheme, Diagnostic> {
    check_in(&crate::builtins::seed_env(), expr)
}

/// As `check`, but against a caller-supplied seed environment.
pub fn check_in(seed: &Env<'_>, expr: &Expr) -> Result<Scheme, Diagnostic> {
    let mut ctx = InferCtx::new();
    let ty = infer(&mut ctx, seed, expr)?;
    Ok(ctx.generalize(seed, &ty))
}
