//! Abstraction over solver backends.
//!
//! The legality driver only needs "check this script". [`SolverBackend`]
//! is that seam: [`CliSolver`] implements it for real solvers and tests
//! substitute scripted answers.

use jmmcheck_smtlib::script::Script;

use crate::config::SolverKind;
use crate::error::SolverError;
use crate::result::SolverResult;
use crate::solver::CliSolver;

/// Something that decides satisfiability of an SMT-LIB script.
pub trait SolverBackend {
    /// Check satisfiability of the given script.
    ///
    /// Returns:
    /// - `Ok(SolverResult::Sat(model))` if satisfiable
    /// - `Ok(SolverResult::Unsat)` if unsatisfiable
    /// - `Ok(SolverResult::Unknown(reason))` if the solver gave up
    /// - `Err(SolverError)` if the solver invocation failed
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError>;
}

impl SolverBackend for CliSolver {
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        CliSolver::check_sat(self, script)
    }
}

/// Create a subprocess backend for the given solver kind.
pub fn create_backend(kind: SolverKind) -> Result<Box<dyn SolverBackend>, SolverError> {
    tracing::debug!("Using {kind} subprocess backend");
    let solver = CliSolver::with_default_config_for(kind)?;
    Ok(Box::new(solver))
}

/// Create the default backend (Z3).
pub fn create_default_backend() -> Result<Box<dyn SolverBackend>, SolverError> {
    create_backend(SolverKind::Z3)
}
