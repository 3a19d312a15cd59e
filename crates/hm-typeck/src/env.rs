//! The typing environment: a chain of scopes, each carrying its own
//! variable bindings, its own non-generic set, and an optional return-type
//! slot, consulting its parent for anything it doesn't hold itself.

use crate::ty::{Scheme, TyVar};
use rustc_hash::{FxHashMap, FxHashSet};

/// One scope in the chain. `Env::root()` creates the outermost scope;
/// `Env::child` opens a new one nested inside a borrowed parent, which is
/// exactly as long-lived as the inference of the expression that opened it.
pub struct Env<'a> {
    parent: Option<&'a Env<'a>>,
    vars: FxHashMap<String, Scheme>,
    pub non_generic: FxHashSet<TyVar>,
    pub return_ty: Option<TyVar>,
}

impl<'a> Env<'a> {
    pub fn root() -> Env<'a> {
        Env {
            parent: None,
            vars: FxHashMap::default(),
            non_generic: FxHashSet::default(),
            return_ty: None,
        }
    }

    pub fn child(parent: &'a Env<'a>) -> Env<'a> {
        Env {
            parent: Some(parent),
            vars: FxHashMap::default(),
            non_generic: FxHashSet::default(),
            return_ty: None,
        }
    }

    pub fn insert(&mut self, name: String, scheme: Scheme) {
        self.vars.insert(name, scheme);
    }

    /// The innermost scheme bound to `name`, or `None`.
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.vars.get(name).or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    /// Whether `v` is locked against generalization by this scope or any
    /// enclosing one.
    pub fn is_non_generic(&self, v: TyVar) -> bool {
        self.non_generic.contains(&v) || self.parent.is_some_and(|p| p.is_non_generic(v))
    }

    /// The return-type slot of the nearest enclosing scope that defines
    /// one, or `None` if there is no enclosing function body.
    pub fn closest_return_ty(&self) -> Option<TyVar> {
        self.return_ty.or_else(|| self.parent.and_then(|p| p.closest_return_ty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Greek, Ty};

    #[test]
    fn lookup_in_current_scope() {
        let mut root = Env::root();
        root.insert("x".into(), Scheme::mono(Ty::int()));
        assert_eq!(root.lookup("x").unwrap().ty, Ty::int());
    }

    #[test]
    fn lookup_in_outer_scope() {
        let mut root = Env::root();
        root.insert("x".into(), Scheme::mono(Ty::int()));
        let child = Env::child(&root);
        assert_eq!(child.lookup("x").unwrap().ty, Ty::int());
    }

    #[test]
    fn shadowing_prefers_innermost() {
        let mut root = Env::root();
        root.insert("x".into(), Scheme::mono(Ty::int()));
        let mut child = Env::child(&root);
        child.insert("x".into(), Scheme::mono(Ty::bool_()));
        assert_eq!(child.lookup("x").unwrap().ty, Ty::bool_());
        assert_eq!(root.lookup("x").unwrap().ty, Ty::int());
    }

    #[test]
    fn lookup_of_unbound_name_is_none() {
        let root = Env::root();
        assert!(root.lookup("nope").is_none());
    }

    #[test]
    fn non_generic_is_inherited_through_parent_chain() {
        let mut root = Env::root();
        let v = TyVar::fresh(Greek::Beta);
        root.non_generic.insert(v);
        let child = Env::child(&root);
        let grandchild = Env::child(&child);
        assert!(grandchild.is_non_generic(v));
    }

    #[test]
    fn non_generic_does_not_leak_sideways() {
        let root = Env::root();
        let mut sibling_a = Env::child(&root);
        let v = TyVar::fresh(Greek::Beta);
        sibling_a.non_generic.insert(v);
        let sibling_b = Env::child(&root);
        assert!(!sibling_b.is_non_generic(v));
    }

    #[test]
    fn closest_return_ty_walks_up_to_nearest_function_scope() {
        let mut root = Env::root();
        let outer_return = TyVar::fresh(Greek::Eta);
        root.return_ty = Some(outer_return);
        let inner = Env::child(&root);
        assert_eq!(inner.closest_return_ty(), Some(outer_return));
    }

    #[test]
    fn nearest_return_ty_shadows_outer_one() {
        let mut root = Env::root();
        root.return_ty = Some(TyVar::fresh(Greek::Eta));
        let mut inner = Env::child(&root);
        let inner_return = TyVar::fresh(Greek::Eta);
        inner.return_ty = Some(inner_return);
        assert_eq!(inner.closest_return_ty(), Some(inner_return));
    }

    #[test]
    fn closest_return_ty_is_none_at_top_level() {
        let root = Env::root();
        assert_eq!(root.closest_return_ty(), None);
    }
}
