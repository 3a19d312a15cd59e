//! The minimum seed environment the core contract requires (§6): `square`
//! and `print`. Callers and the `hm-driver` collaborator are free to layer
//! additional entries onto a clone of this before running inference.

use crate::env::Env;
use crate::ty::{Scheme, Ty};

/// `square: int → int`, `print: str → unit`.
pub fn seed_env<'a>() -> Env<'a> {
    let mut env = Env::root();
    env.insert("square".into(), Scheme::mono(Ty::fun(Ty::int(), Ty::int())));
    env.insert("print".into(), Scheme::mono(Ty::fun(Ty::str_(), Ty::unit())));
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_and_print_are_seeded() {
        let env = seed_env();
        assert_eq!(env.lookup("square").unwrap().ty, Ty::fun(Ty::int(), Ty::int()));
        assert_eq!(env.lookup("print").unwrap().ty, Ty::fun(Ty::str_(), Ty::unit()));
    }
}
