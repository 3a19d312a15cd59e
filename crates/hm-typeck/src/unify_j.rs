//! J-style unification: each type variable carries an (implicit) in-place
//! resolution, realized here as an `ena` union-find table owned by
//! `InferCtx` rather than a field on `TyVar` itself.
//!
//! `TyVar` stays a small `Copy` value keyed by `(tag, timestamp)`, which is
//! the identity the rest of the crate and its diagnostics work with. `ena`
//! wants to hand out its own dense keys, so `InferCtx` keeps a two-way
//! mapping between a `TyVar` and the internal `UfKey` `ena` assigned it
//! when it was registered (always at `fresh()` time). This is the
//! idiomatic Rust realization of "each TypeVar carries an optional
//! resolve": the resolution lives in one mutable table instead of being
//! scattered across `Rc<RefCell<_>>` cells on every variable instance.

use crate::env::Env;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::ty::{Greek, Scheme, Ty, TyOp, TyVar};
use ena::unify::{InPlaceUnificationTable, UnifyKey};
use rustc_hash::FxHashMap;

fn as_var(ty: &Ty) -> TyVar {
    match ty {
        Ty::Var(v) => *v,
        _ => unreachable!("InferCtx::fresh always returns Ty::Var"),
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct UfKey(u32);

impl UnifyKey for UfKey {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        UfKey(u)
    }

    fn tag() -> &'static str {
        "UfKey"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

/// Owns the union-find table backing the J-style strategy. One `InferCtx`
/// is used per inference of a single AST; it is not meant to be shared
/// across concurrent inferences of the *same* tree (see the concurrency
/// notes this crate's design ledger cites).
pub struct InferCtx {
    table: InPlaceUnificationTable<UfKey>,
    keys: FxHashMap<TyVar, UfKey>,
    vars: FxHashMap<UfKey, TyVar>,
}

impl InferCtx {
    pub fn new() -> InferCtx {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            keys: FxHashMap::default(),
            vars: FxHashMap::default(),
        }
    }

    /// Allocate a fresh variable with `tag` and register it with the
    /// union-find table.
    pub fn fresh(&mut self, tag: Greek) -> Ty {
        let v = TyVar::fresh(tag);
        let k = self.table.new_key(None);
        self.keys.insert(v, k);
        self.vars.insert(k, v);
        Ty::Var(v)
    }

    fn uf_key(&self, v: TyVar) -> UfKey {
        *self
            .keys
            .get(&v)
            .expect("TyVar used in J-style inference without being registered via InferCtx::fresh")
    }

    /// Recursively resolve a type, following resolution chains to their
    /// root and path-compressing as `ena`'s table does internally.
    /// Unbound variables are normalized to the representative of their
    /// equivalence class, so two unified-but-unbound variables resolve to
    /// the same printed identity.
    pub fn resolve(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => {
                let k = self.uf_key(*v);
                match self.table.probe_value(k) {
                    Some(inner) => self.resolve(&inner),
                    None => {
                        let root = self.table.find(k);
                        Ty::Var(self.vars[&root])
                    }
                }
            }
            Ty::Op(op) => Ty::Op(TyOp {
                op: op.op.clone(),
                args: op.args.iter().map(|a| self.resolve(a)).collect(),
            }),
        }
    }

    /// True iff `v` is still unbound after resolution — the state the
    /// `App` rule checks to decide whether to relabel a result to `η`.
    ///
    /// A variable merged (but not bound to a concrete type) with another
    /// still-unbound variable resolves to whichever of the two `ena` kept
    /// as the equivalence class's representative; this is a presentational
    /// choice only, per the design notes on the `η` relabeling being purely
    /// advisory output.
    pub fn is_unresolved(&mut self, v: TyVar) -> bool {
        matches!(self.resolve(&Ty::Var(v)), Ty::Var(v2) if v2 == v)
    }

    fn occurs_in(&mut self, v: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v2) => {
                if *v2 == v {
                    return true;
                }
                match self.table.probe_value(self.uf_key(*v2)) {
                    Some(inner) => self.occurs_in(v, &inner),
                    None => false,
                }
            }
            Ty::Op(op) => op.args.iter().any(|a| self.occurs_in(v, a)),
        }
    }

    /// Attempt to make `t1` and `t2` structurally equal, mutating the
    /// union-find table in place.
    pub fn unify(&mut self, t1: &Ty, t2: &Ty) -> Result<(), Diagnostic> {
        let t1r = self.resolve(t1);
        let t2r = self.resolve(t2);
        match (&t1r, &t2r) {
            (Ty::Op(a), Ty::Op(b)) => self
                .unify_ops(a, b)
                .map_err(|e| e.with_context(format!("when unifying types {t1r} and {t2r}"))),
            (Ty::Var(v), _) => self.bind(*v, t2r.clone()),
            (_, Ty::Var(v)) => self.bind(*v, t1r.clone()),
        }
    }

    fn bind(&mut self, v: TyVar, ty: Ty) -> Result<(), Diagnostic> {
        if let Ty::Var(v2) = &ty {
            if *v2 == v {
                return Ok(());
            }
        }
        if self.occurs_in(v, &ty) {
            return Err(Diagnostic::new(DiagnosticKind::InfiniteType { var: v, ty }));
        }
        match &ty {
            Ty::Var(v2) => {
                self.table
                    .unify_var_var(self.uf_key(v), self.uf_key(*v2))
                    .expect("unifying two unbound variables cannot fail");
            }
            _ => {
                self.table
                    .unify_var_value(self.uf_key(v), Some(ty))
                    .expect("binding an unbound variable to a concrete type cannot fail");
            }
        }
        Ok(())
    }

    fn unify_ops(&mut self, a: &TyOp, b: &TyOp) -> Result<(), Diagnostic> {
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
        for (idx, (x, y)) in a.args.iter().zip(b.args.iter()).enumerate() {
            self.unify(x, y).map_err(|e| {
                e.with_context(format!("when unifying argument {} ({x} and {y})", idx + 1))
            })?;
        }
        Ok(())
    }

    /// Fresh-rename every quantified variable of `scheme`, allocating each
    /// replacement through `self.fresh` so it is registered with the
    /// union-find table. `Scheme::instantiate` alone must never be used
    /// here: its fresh vars are plain unregistered `TyVar`s, and the first
    /// time one reached `resolve`/`occurs_in`/`bind` it would hit
    /// `uf_key`'s `.expect(...)` and panic.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let mut renaming = FxHashMap::default();
        for v in &scheme.vars {
            renaming.insert(*v, as_var(&self.fresh(v.tag)));
        }
        crate::ty::rename(&scheme.ty, &renaming)
    }

    /// `generalize(Γ, τ)`: the deduplicated free variables of the resolved
    /// form of `τ`, minus anything `env` considers non-generic.
    pub fn generalize(&mut self, env: &Env<'_>, ty: &Ty) -> crate::ty::Scheme {
        let resolved = self.resolve(ty);
        let mut vars = Vec::new();
        resolved.collect_vars(&mut vars);
        let mut seen = rustc_hash::FxHashSet::default();
        let mut quantified = Vec::new();
        for v in vars {
            if seen.insert(v) && !env.is_non_generic(v) {
                quantified.push(v);
            }
        }
        crate::ty::Scheme { vars: quantified, ty: resolved }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        InferCtx::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Scheme;

    #[test]
    fn unify_two_fresh_vars() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let b = ctx.fresh(Greek::Beta);
        ctx.unify(&a, &b).unwrap();
        assert_eq!(ctx.resolve(&a), ctx.resolve(&b));
    }

    #[test]
    fn unify_var_with_concrete_resolves_to_it() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        ctx.unify(&a, &Ty::int()).unwrap();
        assert_eq!(ctx.resolve(&a), Ty::int());
    }

    #[test]
    fn unify_mismatch_reports_operator_mismatch() {
        let mut ctx = InferCtx::new();
        let err = ctx.unify(&Ty::int(), &Ty::bool_()).unwrap_err();
        assert!(matches!(err.kind(), DiagnosticKind::OperatorMismatch { .. }));
    }

    #[test]
    fn unify_function_return_mismatch_reports_under_argument_context() {
        let mut ctx = InferCtx::new();
        let f1 = Ty::fun(Ty::int(), Ty::int());
        let f2 = Ty::fun(Ty::int(), Ty::bool_());
        assert!(ctx.unify(&f1, &f2).is_err());
    }

    #[test]
    fn unify_function_arity_mismatch() {
        let mut ctx = InferCtx::new();
        let f2 = Ty::fun(Ty::int(), Ty::int());
        let f3 = Ty::Op(TyOp { op: "->".into(), args: vec![Ty::int(), Ty::int(), Ty::int()] });
        let err = ctx.unify(&f2, &f3).unwrap_err();
        assert!(matches!(err.kind(), DiagnosticKind::ArityMismatch { .. }));
    }

    #[test]
    fn occurs_check_infinite_type() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let av = if let Ty::Var(v) = a { v } else { unreachable!() };
        let t = Ty::fun(a.clone(), Ty::int());
        let err = ctx.unify(&a, &t).unwrap_err();
        match err.kind() {
            DiagnosticKind::InfiniteType { var, .. } => assert_eq!(*var, av),
            _ => panic!("expected infinite type diagnostic"),
        }
    }

    #[test]
    fn unify_never_fails_for_two_concrete_equal_types() {
        let mut ctx = InferCtx::new();
        assert!(ctx.unify(&Ty::unit(), &Ty::unit()).is_ok());
    }

    #[test]
    fn unify_tuple_types() {
        let mut ctx = InferCtx::new();
        let p1 = Ty::product(vec![Ty::int(), Ty::bool_()]);
        let p2 = Ty::product(vec![Ty::int(), Ty::bool_()]);
        assert!(ctx.unify(&p1, &p2).is_ok());
    }

    #[test]
    fn generalize_and_instantiate_round_trip() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let av = if let Ty::Var(v) = a { v } else { unreachable!() };
        let env = Env::root();
        let scheme: Scheme = ctx.generalize(&env, &Ty::fun(a.clone(), a));
        assert_eq!(scheme.vars, vec![av]);
        let instance = ctx.instantiate(&scheme);
        assert!(matches!(instance, Ty::Op(_)));
    }

    #[test]
    fn instantiate_registers_fresh_vars_so_they_can_be_unified() {
        // Each variable `instantiate` mints must be usable in a further
        // `ctx.unify` call without panicking — `Scheme::instantiate` alone
        // cannot provide this, since its fresh vars are never registered
        // with the union-find table.
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let av = if let Ty::Var(v) = a { v } else { unreachable!() };
        let scheme = Scheme { vars: vec![av], ty: Ty::fun(a.clone(), a) };

        let instance = ctx.instantiate(&scheme);
        ctx.unify(&instance, &Ty::fun(Ty::int(), Ty::int())).unwrap();
        assert_eq!(ctx.resolve(&instance), Ty::fun(Ty::int(), Ty::int()));
    }

    #[test]
    fn instantiate_of_monomorphic_scheme_does_not_allocate_fresh_vars() {
        let mut ctx = InferCtx::new();
        let scheme = Scheme::mono(Ty::int());
        assert_eq!(ctx.instantiate(&scheme), Ty::int());
    }

    #[test]
    fn generalize_excludes_non_generic_vars() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let av = if let Ty::Var(v) = a { v } else { unreachable!() };
        let mut env = Env::root();
        env.non_generic.insert(av);
        let scheme = ctx.generalize(&env, &a);
        assert!(scheme.vars.is_empty());
    }

    #[test]
    fn is_unresolved_is_true_only_for_unbound_variables() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh(Greek::Alpha);
        let av = if let Ty::Var(v) = a { v } else { unreachable!() };
        assert!(ctx.is_unresolved(av));
        ctx.unify(&a, &Ty::int()).unwrap();
        assert!(!ctx.is_unresolved(av));
    }
}
