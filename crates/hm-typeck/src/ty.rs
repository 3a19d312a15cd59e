//! Monotypes, type variables, and type schemes.
//!
//! `Ty` is a closed sum of a type variable or an applied type operator
//! (`TyOp`). Neither carries any resolution state of its own: the J-style
//! strategy keeps its in-place resolutions inside `InferCtx`'s unification
//! table and the W-style strategy keeps its bindings inside an explicit
//! `Subst`, so `Ty` itself is a plain, `Clone`-cheap value that both
//! strategies treat as pure data.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// The conventional tag vocabulary for type variables.
///
/// Tag choice never affects semantics, only diagnostic readability: `Beta`
/// for lambda parameters, `Pi` for application results, `Gamma` for
/// recursive-binding placeholders, `Eta` for the bottom type introduced by
/// `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Greek {
    Alpha,
    Beta,
    Gamma,
    Delta,
    Epsilon,
    Pi,
    Tau,
    Eta,
}

impl Greek {
    fn symbol(self) -> char {
        match self {
            Greek::Alpha => 'α',
            Greek::Beta => 'β',
            Greek::Gamma => 'γ',
            Greek::Delta => 'δ',
            Greek::Epsilon => 'ε',
            Greek::Pi => 'π',
            Greek::Tau => 'τ',
            Greek::Eta => 'η',
        }
    }
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// One process-wide counter per tag. A concurrent re-implementation would
// need these to be atomic or local-per-inference (see the concurrency
// notes this crate's design ledger cites); they're atomic here so that the
// crate is usable from more than one thread even though a single
// `InferCtx`/AST pairing is not meant to be shared across threads.
static COUNTERS: [AtomicU32; 8] = [
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
];

fn next_timestamp(tag: Greek) -> u32 {
    COUNTERS[tag as usize].fetch_add(1, Ordering::Relaxed)
}

/// A type variable, identified by its tag and an increasing-per-tag
/// timestamp. Equality and hashing are by `(tag, timestamp)` alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar {
    pub tag: Greek,
    pub timestamp: u32,
}

impl TyVar {
    /// Allocate a fresh variable with `tag`, taking the next timestamp for
    /// that tag. Consecutive calls with the same tag strictly increase.
    pub fn fresh(tag: Greek) -> Self {
        TyVar {
            tag,
            timestamp: next_timestamp(tag),
        }
    }
}

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag == Greek::Eta {
            write!(f, "!")
        } else {
            write!(f, "{}{}", self.tag, self.timestamp)
        }
    }
}

/// A named operator applied to zero or more argument monotypes.
///
/// Recognized nullary operators: `unit`, `int`, `bool`, `str`. Recognized
/// variable-arity operators: `*` (product) and `->` (function, arity 2).
/// Nothing in this crate closes off the set — a host environment is free to
/// register schemes that mention other operator names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyOp {
    pub op: String,
    pub args: Vec<Ty>,
}

impl TyOp {
    fn needs_quote(&self) -> bool {
        !self.args.is_empty()
    }
}

impl fmt::Display for TyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == "unit" {
            return write!(f, "()");
        }
        if self.args.is_empty() {
            return write!(f, "{}", self.op);
        }

        let infix = self.op == "*" || self.op == "->";
        if !infix {
            write!(f, "{}", self.op)?;
        }
        for (idx, arg) in self.args.iter().enumerate() {
            if arg.needs_quote() {
                write!(f, "({arg})")?;
            } else {
                write!(f, "{arg}")?;
            }
            let last = idx == self.args.len() - 1;
            if !last {
                if infix {
                    write!(f, "{}", if self.op == "*" { " × " } else { "→" })?;
                } else {
                    write!(f, " ")?;
                }
            }
        }
        Ok(())
    }
}

/// A monotype: either a type variable or an applied type operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Var(TyVar),
    Op(TyOp),
}

impl Ty {
    pub fn var(v: TyVar) -> Ty {
        Ty::Var(v)
    }

    pub fn unit() -> Ty {
        Ty::Op(TyOp { op: "unit".into(), args: Vec::new() })
    }

    pub fn int() -> Ty {
        Ty::Op(TyOp { op: "int".into(), args: Vec::new() })
    }

    pub fn bool_() -> Ty {
        Ty::Op(TyOp { op: "bool".into(), args: Vec::new() })
    }

    pub fn str_() -> Ty {
        Ty::Op(TyOp { op: "str".into(), args: Vec::new() })
    }

    pub fn product(types: Vec<Ty>) -> Ty {
        Ty::Op(TyOp { op: "*".into(), args: types })
    }

    pub fn fun(arg: Ty, ret: Ty) -> Ty {
        Ty::Op(TyOp { op: "->".into(), args: vec![arg, ret] })
    }

    fn needs_quote(&self) -> bool {
        match self {
            Ty::Var(_) => false,
            Ty::Op(op) => op.needs_quote(),
        }
    }

    /// True iff `v` occurs anywhere in this (already-pruned/applied)
    /// structure. The occurs-check's workhorse.
    pub fn contains(&self, v: TyVar) -> bool {
        match self {
            Ty::Var(v2) => *v2 == v,
            Ty::Op(op) => op.args.iter().any(|a| a.contains(v)),
        }
    }

    /// Append every `TyVar` appearing in this structure to `out`, including
    /// duplicates. Callers deduplicate.
    pub fn collect_vars(&self, out: &mut Vec<TyVar>) {
        match self {
            Ty::Var(v) => out.push(*v),
            Ty::Op(op) => {
                for a in &op.args {
                    a.collect_vars(out);
                }
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "{v}"),
            Ty::Op(op) => write!(f, "{op}"),
        }
    }
}

/// A universally quantified type: a (possibly empty) list of bound
/// variables plus a body monotype. The bound variables are pairwise
/// distinct.
#[derive(Clone, Debug)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    /// A monomorphic scheme: no quantified variables.
    pub fn mono(ty: Ty) -> Scheme {
        Scheme { vars: Vec::new(), ty }
    }

    /// Fresh-rename every quantified variable (keeping its tag) and
    /// substitute consistently within the body.
    ///
    /// The W-style strategy treats fresh `TyVar`s as plain data, so this is
    /// the only instantiation it needs. The J-style strategy must not call
    /// this directly: its fresh variables have to be registered with
    /// `InferCtx`'s union-find table before they can be unified, which is
    /// what `InferCtx::instantiate` (in `unify_j`) does instead.
    pub fn instantiate(&self) -> Ty {
        if self.vars.is_empty() {
            return self.ty.clone();
        }
        let mut renaming = rustc_hash::FxHashMap::default();
        for v in &self.vars {
            renaming.insert(*v, TyVar::fresh(v.tag));
        }
        rename(&self.ty, &renaming)
    }
}

/// Shared by `Scheme::instantiate` (W-style, where fresh vars need no
/// registration) and `InferCtx::instantiate` (J-style, which allocates each
/// renaming target through `ctx.fresh` before calling this).
pub(crate) fn rename(ty: &Ty, renaming: &rustc_hash::FxHashMap<TyVar, TyVar>) -> Ty {
    match ty {
        Ty::Var(v) => Ty::Var(*renaming.get(v).unwrap_or(v)),
        Ty::Op(op) => Ty::Op(TyOp {
            op: op.op.clone(),
            args: op.args.iter().map(|a| rename(a, renaming)).collect(),
        }),
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        let mut any = false;
        for v in &self.vars {
            if v.tag != Greek::Eta {
                write!(f, "∀{v}")?;
                any = true;
            }
        }
        if any {
            write!(f, ". {}", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}
