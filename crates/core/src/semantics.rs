//! Per-thread sequential semantics.
//!
//! The legality engine treats "each thread computes what its code says,
//! given the values its reads returned" as an opaque conjunct supplied by
//! the front end. [`GuardedSemantics`] is the litmus-style front end
//! shipped with the crate: every action may carry a guard over earlier
//! reads of its thread, and every write a value expression.

use std::collections::BTreeMap;

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, bool_lit, eq, iff, implies, int, le, lt, not, or, sub, sum};

use crate::action::ActionId;
use crate::error::ProgramError;
use crate::execution::Execution;
use crate::program::Program;

/// The front end's view of thread-local control flow and values.
pub trait SequentialSemantics {
    /// Constraint that the execution's `act`/`v` agree with each thread's
    /// code under the execution's `w`.
    fn sequentially_valid(&self, exec: &Execution<'_>) -> Term;

    /// Check that the semantics only refers to actions of `program`.
    fn validate(&self, _program: &Program) -> Result<(), ProgramError> {
        Ok(())
    }
}

/// A small expression language over the values returned by reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    /// Value returned by a read.
    Read(ActionId),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn read(r: ActionId) -> Self {
        Expr::Read(r)
    }

    pub fn int(n: i64) -> Self {
        Expr::Int(n)
    }

    pub fn equals(self, other: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn differs(self, other: Expr) -> Self {
        Expr::Ne(Box::new(self), Box::new(other))
    }

    pub fn less_than(self, other: Expr) -> Self {
        Expr::Lt(Box::new(self), Box::new(other))
    }

    pub fn at_most(self, other: Expr) -> Self {
        Expr::Le(Box::new(self), Box::new(other))
    }

    pub fn plus(self, other: Expr) -> Self {
        Expr::Add(Box::new(self), Box::new(other))
    }

    pub fn minus(self, other: Expr) -> Self {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Lower to a term over the execution's variables.
    pub fn lower(&self, exec: &Execution<'_>) -> Term {
        match self {
            Expr::Int(n) => int(*n),
            Expr::Bool(b) => bool_lit(*b),
            Expr::Read(r) => exec.read_value(*r),
            Expr::Add(a, b) => sum(vec![a.lower(exec), b.lower(exec)]),
            Expr::Sub(a, b) => sub(a.lower(exec), b.lower(exec)),
            Expr::Eq(a, b) => eq(a.lower(exec), b.lower(exec)),
            Expr::Ne(a, b) => not(eq(a.lower(exec), b.lower(exec))),
            Expr::Lt(a, b) => lt(a.lower(exec), b.lower(exec)),
            Expr::Le(a, b) => le(a.lower(exec), b.lower(exec)),
            Expr::Not(a) => not(a.lower(exec)),
            Expr::And(es) => and(es.iter().map(|e| e.lower(exec))),
            Expr::Or(es) => or(es.iter().map(|e| e.lower(exec))),
        }
    }

    /// Reads the expression depends on.
    pub fn reads(&self) -> Vec<ActionId> {
        let mut out = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads(&self, out: &mut Vec<ActionId>) {
        match self {
            Expr::Int(_) | Expr::Bool(_) => {}
            Expr::Read(r) => out.push(*r),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Eq(a, b)
            | Expr::Ne(a, b)
            | Expr::Lt(a, b)
            | Expr::Le(a, b) => {
                a.collect_reads(out);
                b.collect_reads(out);
            }
            Expr::Not(a) => a.collect_reads(out),
            Expr::And(es) | Expr::Or(es) => es.iter().for_each(|e| e.collect_reads(out)),
        }
    }
}

/// Guards and value expressions per action.
///
/// An action occurs exactly when its guard holds (unguarded actions always
/// occur). An occurring write produces its value expression; a write
/// without one may produce any value of its domain.
#[derive(Debug, Clone, Default)]
pub struct GuardedSemantics {
    guards: BTreeMap<ActionId, Expr>,
    values: BTreeMap<ActionId, Expr>,
}

impl GuardedSemantics {
    pub fn new() -> Self {
        Self::default()
    }

    /// `action` occurs iff `condition` holds.
    pub fn guard(&mut self, action: ActionId, condition: Expr) -> &mut Self {
        self.guards.insert(action, condition);
        self
    }

    /// `write` produces `value`.
    pub fn value(&mut self, write: ActionId, value: Expr) -> &mut Self {
        self.values.insert(write, value);
        self
    }

    fn check_dependencies(
        program: &Program,
        action: ActionId,
        expr: &Expr,
    ) -> Result<(), ProgramError> {
        for r in expr.reads() {
            program.check_read(r)?;
            if !program.po(r, action) {
                return Err(ProgramError::ReadNotBefore { read: r, action });
            }
        }
        Ok(())
    }
}

impl SequentialSemantics for GuardedSemantics {
    fn sequentially_valid(&self, exec: &Execution<'_>) -> Term {
        let program = exec.program();
        let mut parts = Vec::new();
        for a in program.ids() {
            let guard = self
                .guards
                .get(&a)
                .map_or_else(|| bool_lit(true), |g| g.lower(exec));
            parts.push(iff(exec.act(a), guard));
        }
        for (&x, value) in &self.values {
            parts.push(implies(exec.act(x), eq(exec.v(x), value.lower(exec))));
        }
        and(parts)
    }

    fn validate(&self, program: &Program) -> Result<(), ProgramError> {
        for (&a, guard) in &self.guards {
            program.check_action(a)?;
            Self::check_dependencies(program, a, guard)?;
        }
        for (&x, value) in &self.values {
            program.check_write(x)?;
            Self::check_dependencies(program, x, value)?;
        }
        Ok(())
    }
}
