//! Hindley-Milner type inference over a small expression language, offered
//! through two independently-grounded strategies: [`infer_w`] threads an
//! explicit substitution (Algorithm W), while [`infer_j`] mutates an
//! in-place union-find table (Algorithm J, after `unify_j::InferCtx`). Both
//! drivers implement the same rule set over [`expr::Expr`] and agree on
//! every well-typed and ill-typed program up to alpha-renaming of the
//! resulting [`ty::Scheme`] (see the integration suite under `tests/`).
//!
//! This crate is pure: no I/O, no logging, no panics outside of internal
//! invariant violations. `hm-driver` is the CLI collaborator that wraps it.

pub mod builtins;
pub mod env;
pub mod error;
pub mod expr;
pub mod infer_j;
pub mod infer_w;
pub mod subst;
pub mod ty;
pub mod unify_j;
pub mod unify_w;

pub use env::Env;
pub use error::{Diagnostic, DiagnosticKind};
pub use expr::Expr;
pub use ty::{Greek, Scheme, Ty, TyOp, TyVar};

/// Which driver to run. `hm-driver` exposes this as `--strategy`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    W,
    J,
}

/// Run inference for `expr` against the seed environment under the chosen
/// strategy, returning its generalized scheme.
pub fn check(strategy: Strategy, expr: &Expr) -> Result<Scheme, Diagnostic> {
    match strategy {
        Strategy::W => infer_w::check(expr),
        Strategy::J => infer_j::check(expr),
    }
}
