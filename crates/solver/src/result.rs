use crate::model::Model;

/// Answer of one solver run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// The constraints are satisfiable; carries the model if one was printed.
    Sat(Option<Model>),
    /// The constraints are unsatisfiable.
    Unsat,
    /// The solver gave up (timeout, resource limit, incomplete theory).
    Unknown(String),
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverResult::Unknown(_))
    }

    /// Returns the model if the result is `Sat` with a model.
    pub fn model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(Some(model)) => Some(model),
            _ => None,
        }
    }

    /// Consume the result, yielding the model of a `Sat` answer.
    pub fn into_model(self) -> Option<Model> {
        match self {
            SolverResult::Sat(model) => model,
            _ => None,
        }
    }
}
