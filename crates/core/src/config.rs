//! Configuration of a legality check.

use crate::error::JustifyError;
use crate::memory_model::ModelKind;

/// How a [`crate::JustificationDriver`] builds its problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JustificationConfig {
    /// Length `N` of the commit chain `C_0 .. C_{N-1}`.
    pub rounds: usize,
    pub model: ModelKind,
    /// Accept sequentially consistent executions without a commit chain.
    pub sc_shortcut: bool,
    /// SMT-LIB logic announced to the solver.
    pub logic: String,
}

impl Default for JustificationConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            model: ModelKind::Original,
            sc_shortcut: true,
            logic: "QF_LIA".to_string(),
        }
    }
}

impl JustificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_sc_shortcut(mut self, enabled: bool) -> Self {
        self.sc_shortcut = enabled;
        self
    }

    pub fn with_logic(mut self, logic: impl Into<String>) -> Self {
        self.logic = logic.into();
        self
    }

    /// Rejects a zero round count.
    pub fn validate(&self) -> Result<(), JustifyError> {
        if self.rounds == 0 {
            return Err(JustifyError::InvalidRounds(self.rounds));
        }
        Ok(())
    }

    /// Whether the commit chain takes part in the formula.
    pub fn uses_chain(&self) -> bool {
        self.rounds >= 2
    }

    /// Whether the formula accepts sequentially consistent executions.
    pub fn uses_sc(&self) -> bool {
        self.rounds == 1 || self.sc_shortcut
    }
}
