//! Diagnostics: a root-cause kind plus a breadcrumb trail accumulated as
//! the error unwinds through `unify` and the inference driver.
//!
//! This mirrors the reference implementation's exception type, which
//! carries a growing text field that each enclosing call appends to before
//! re-raising. Here that becomes an explicit `Vec<String>` pushed onto a
//! plain `Result` error value instead of a raised-and-rethrown exception.

use crate::ty::{Ty, TyVar};
use std::fmt;

/// The root cause of a failed inference.
#[derive(Clone, Debug)]
pub enum DiagnosticKind {
    UndefinedIdentifier(String),
    OperatorMismatch { op1: String, op2: String },
    ArityMismatch { op: String, expected: usize, found: usize },
    InfiniteType { var: TyVar, ty: Ty },
    StructuralMismatch { t1: Ty, t2: Ty },
    ReturnOutsideFunction,
    InvariantViolation(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UndefinedIdentifier(name) => {
                write!(f, "undefined identifier `{name}`")
            }
            DiagnosticKind::OperatorMismatch { op1, op2 } => {
                write!(f, "cannot unify type operators `{op1}` and `{op2}` (operators differ)")
            }
            DiagnosticKind::ArityMismatch { op, expected, found } => {
                write!(
                    f,
                    "cannot unify applications of `{op}`: expected {expected} argument(s), found {found}"
                )
            }
            DiagnosticKind::InfiniteType { var, ty } => {
                write!(f, "cannot unify {var} with {ty}: the latter mentions {var}, which would form an infinite type")
            }
            DiagnosticKind::StructuralMismatch { t1, t2 } => {
                write!(f, "cannot unify {t1} and {t2}")
            }
            DiagnosticKind::ReturnOutsideFunction => {
                write!(f, "`return` used outside of a function body")
            }
            DiagnosticKind::InvariantViolation(what) => {
                write!(f, "internal invariant violated: {what}")
            }
        }
    }
}

/// A failed inference: the root cause plus an outward-widening trail of
/// context. The first `Display` line is the root cause; each subsequent
/// line names an enclosing check, innermost first.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    trail: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Diagnostic {
        Diagnostic { kind, trail: Vec::new() }
    }

    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    /// Push a context frame onto the trail and return `self`, so call
    /// sites can write `.map_err(|d| d.with_context(...))`.
    pub fn with_context(mut self, context: impl Into<String>) -> Diagnostic {
        self.trail.push(context.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        for (idx, line) in self.trail.iter().enumerate() {
            if idx == self.trail.len() - 1 {
                write!(f, "  - {line}")?;
            } else {
                writeln!(f, "  - {line}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_is_the_first_line() {
        let d = Diagnostic::new(DiagnosticKind::UndefinedIdentifier("x".into()));
        let s = format!("{d}");
        assert!(s.starts_with("undefined identifier `x`"));
    }

    #[test]
    fn context_is_appended_innermost_first() {
        let d = Diagnostic::new(DiagnosticKind::ReturnOutsideFunction)
            .with_context("when checking expression `return 1`");
        let s = format!("{d}");
        let mut lines = s.lines();
        assert_eq!(lines.next().unwrap(), "`return` used outside of a function body");
        assert_eq!(lines.next().unwrap(), "  - when checking expression `return 1`");
    }
}
