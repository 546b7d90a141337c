//! The observed behaviour whose legality is in question.

use std::fmt;

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, eq, int, not};

use crate::action::ActionId;
use crate::error::ProgramError;
use crate::execution::Execution;

/// One observation about the main execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    ReadValue(ActionId, i64),
    Sees(ActionId, ActionId),
    WriteValue(ActionId, i64),
    Occurs(ActionId),
    Absent(ActionId),
}

/// A conjunction of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    observations: Vec<Observation>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// `read` occurs and returns `value`.
    pub fn read_value(mut self, read: ActionId, value: i64) -> Self {
        self.observations.push(Observation::ReadValue(read, value));
        self
    }

    /// `read` sees `write`.
    pub fn sees(mut self, read: ActionId, write: ActionId) -> Self {
        self.observations.push(Observation::Sees(read, write));
        self
    }

    /// `write` occurs and writes `value`.
    pub fn write_value(mut self, write: ActionId, value: i64) -> Self {
        self.observations.push(Observation::WriteValue(write, value));
        self
    }

    pub fn occurs(mut self, action: ActionId) -> Self {
        self.observations.push(Observation::Occurs(action));
        self
    }

    pub fn absent(mut self, action: ActionId) -> Self {
        self.observations.push(Observation::Absent(action));
        self
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The outcome as a constraint on `exec`.
    ///
    /// Fails if an observation names an action of the wrong kind or a write
    /// the read could never see.
    pub fn to_term(&self, exec: &Execution<'_>) -> Result<Term, ProgramError> {
        let p = exec.program();
        let mut parts = Vec::with_capacity(self.observations.len());
        for obs in &self.observations {
            let term = match *obs {
                Observation::ReadValue(r, value) => {
                    p.check_read(r)?;
                    and(vec![exec.act(r), eq(exec.read_value(r), int(value))])
                }
                Observation::Sees(r, x) => {
                    p.check_read(r)?;
                    p.check_write(x)?;
                    if !p.is_candidate(r, x) {
                        return Err(ProgramError::NotACandidate { read: r, write: x });
                    }
                    exec.w(r, x)
                }
                Observation::WriteValue(x, value) => {
                    p.check_write(x)?;
                    and(vec![exec.act(x), eq(exec.v(x), int(value))])
                }
                Observation::Occurs(a) => {
                    p.check_action(a)?;
                    exec.act(a)
                }
                Observation::Absent(a) => {
                    p.check_action(a)?;
                    not(exec.act(a))
                }
            };
            parts.push(term);
        }
        Ok(and(parts))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for obs in &self.observations {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match obs {
                Observation::ReadValue(r, v) => write!(f, "{r} = {v}")?,
                Observation::Sees(r, x) => write!(f, "{r} sees {x}")?,
                Observation::WriteValue(x, v) => write!(f, "{x} writes {v}")?,
                Observation::Occurs(a) => write!(f, "{a} occurs")?,
                Observation::Absent(a) => write!(f, "{a} absent")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::LocationId;
    use crate::program::{Program, ProgramBuilder};

    fn one_read() -> (Program, ActionId, ActionId, ActionId) {
        let mut b = ProgramBuilder::new();
        let init = b.initial_write(LocationId(0), 0, false);
        let t1 = b.thread("t1");
        let w = b.write(t1, [LocationId(0)], [1, 2]);
        let t2 = b.thread("t2");
        let r = b.read(t2, [LocationId(0)]);
        (b.build().unwrap(), init, w, r)
    }

    #[test]
    fn read_value_implies_occurrence() {
        let (p, _, _, r) = one_read();
        let e = Execution::main(&p);
        let text = Outcome::new().read_value(r, 1).to_term(&e).unwrap().to_string();
        assert!(text.starts_with(&format!("(and e_act_{}", r.0)), "{text}");
        assert!(text.contains("ite"), "{text}");
    }

    #[test]
    fn observations_lower_to_relation_terms() {
        let (p, init, w, r) = one_read();
        let e = Execution::main(&p);
        let outcome = Outcome::new().sees(r, init).write_value(w, 2).absent(w);
        assert_eq!(outcome.observations().len(), 3);
        let text = outcome.to_term(&e).unwrap().to_string();
        assert!(text.contains(&format!("e_w_{}_{}", r.0, init.0)), "{text}");
        assert!(text.contains(&format!("(= e_v_{} 2)", w.0)), "{text}");
        assert!(text.contains(&format!("(not e_act_{})", w.0)), "{text}");
    }

    #[test]
    fn wrong_kinds_are_rejected() {
        let (p, init, w, r) = one_read();
        let e = Execution::main(&p);
        assert_eq!(
            Outcome::new().read_value(w, 1).to_term(&e),
            Err(ProgramError::NotARead(w))
        );
        assert_eq!(
            Outcome::new().write_value(r, 1).to_term(&e),
            Err(ProgramError::NotAWrite(r))
        );
        assert_eq!(
            Outcome::new().sees(r, r).to_term(&e),
            Err(ProgramError::NotAWrite(r))
        );
        assert_eq!(
            Outcome::new().occurs(ActionId(99)).to_term(&e),
            Err(ProgramError::UnknownAction(ActionId(99)))
        );
        assert!(Outcome::new().sees(r, init).to_term(&e).is_ok());
    }

    #[test]
    fn display_lists_observations() {
        let outcome = Outcome::new().read_value(ActionId(3), 1).absent(ActionId(4));
        assert_eq!(outcome.to_string(), "a3 = 1, a4 absent");
        assert!(Outcome::new().is_empty());
    }
}
