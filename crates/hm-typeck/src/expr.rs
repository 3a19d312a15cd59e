//! The surface expression tree the engine consumes.
//!
//! The parser producing this tree is an external collaborator; this module
//! owns only the data model and a `Display` impl used for diagnostic
//! breadcrumbs. Helper constructors are provided for building expressions
//! by hand in tests and in the `hm-driver` collaborator, since there is no
//! lexer/parser in scope to build them from source text.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Expr {
    LitInt(i64),
    LitBool(bool),
    LitStr(String),
    Var(String),
    Abs(String, Box<Expr>),
    App(Box<Expr>, Box<Expr>),
    Let(String, Box<Expr>, Box<Expr>),
    LetRec(Vec<(String, Expr)>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Stmt(Vec<Expr>),
    Return(Option<Box<Expr>>),
}

impl Expr {
    fn needs_quote(&self) -> bool {
        !matches!(self, Expr::LitInt(_) | Expr::LitBool(_) | Expr::LitStr(_) | Expr::Var(_))
    }

    fn quoted(&self) -> String {
        if self.needs_quote() {
            format!("({self})")
        } else {
            format!("{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::LitInt(n) => write!(f, "{n}"),
            Expr::LitBool(b) => write!(f, "{b}"),
            Expr::LitStr(s) => write!(f, "\"{s}\""),
            Expr::Var(x) => write!(f, "{x}"),
            Expr::Abs(x, body) => write!(f, "λ{x}. {}", body.quoted()),
            Expr::App(e1, e2) => write!(f, "{} {}", e1.quoted(), e2.quoted()),
            Expr::Let(x, e1, e2) => {
                let e2_s = if matches!(**e2, Expr::Let(..)) { format!("{e2}") } else { e2.quoted() };
                write!(f, "let {x} = {} in {e2_s}", e1.quoted())
            }
            Expr::Stmt(stmts) => {
                for (idx, s) in stmts.iter().enumerate() {
                    write!(f, "{s}")?;
                    if idx != stmts.len() - 1 {
                        write!(f, "; ")?;
                    }
                }
                Ok(())
            }
            Expr::Return(Some(e)) => write!(f, "return {e}"),
            Expr::Return(None) => write!(f, "return"),
            Expr::If(c, t, e) => {
                write!(f, "if {} then {} else {}", c.quoted(), t.quoted(), e.quoted())
            }
            Expr::LetRec(bindings, body) => {
                write!(f, "let rec ")?;
                for (idx, (name, e)) in bindings.iter().enumerate() {
                    write!(f, "{name} = {}", e.quoted())?;
                    if idx != bindings.len() - 1 {
                        write!(f, "; ")?;
                    }
                }
                write!(f, " in {}", body.quoted())
            }
        }
    }
}

pub fn int(n: i64) -> Expr {
    Expr::LitInt(n)
}

pub fn bool_(b: bool) -> Expr {
    Expr::LitBool(b)
}

pub fn str_(s: impl Into<String>) -> Expr {
    Expr::LitStr(s.into())
}

pub fn var(x: impl Into<String>) -> Expr {
    Expr::Var(x.into())
}

pub fn abs(x: impl Into<String>, body: Expr) -> Expr {
    Expr::Abs(x.into(), Box::new(body))
}

pub fn app(f: Expr, a: Expr) -> Expr {
    Expr::App(Box::new(f), Box::new(a))
}

pub fn app2(f: Expr, a: Expr, b: Expr) -> Expr {
    app(app(f, a), b)
}

pub fn let_(x: impl Into<String>, e1: Expr, e2: Expr) -> Expr {
    Expr::Let(x.into(), Box::new(e1), Box::new(e2))
}

pub fn let_rec(bindings: Vec<(&str, Expr)>, body: Expr) -> Expr {
    Expr::LetRec(
        bindings.into_iter().map(|(n, e)| (n.to_string(), e)).collect(),
        Box::new(body),
    )
}

pub fn if_(c: Expr, t: Expr, e: Expr) -> Expr {
    Expr::If(Box::new(c), Box::new(t), Box::new(e))
}

pub fn stmt(exprs: Vec<Expr>) -> Expr {
    Expr::Stmt(exprs)
}

pub fn return_some(e: Expr) -> Expr {
    Expr::Return(Some(Box::new(e)))
}

pub fn return_unit() -> Expr {
    Expr::Return(None)
}
