//! # jmmcheck-solver
//!
//! Adapter to external SMT solvers for memory-model legality problems.
//!
//! Solvers run as subprocesses that receive SMT-LIB2 text on stdin. A
//! satisfying assignment is read back from `(get-model)` output into a
//! [`Model`].
//!
//! ## Usage
//!
//! ```no_run
//! use jmmcheck_solver::{CliSolver, SolverResult};
//!
//! let solver = CliSolver::with_default_config().unwrap();
//! let result = solver.check_sat_raw("
//!     (declare-const so_1 Int)
//!     (declare-const so_2 Int)
//!     (assert (< so_1 so_2))
//!     (check-sat)
//!     (get-model)
//! ").unwrap();
//!
//! match result {
//!     SolverResult::Sat(model) => println!("SAT: {model:?}"),
//!     SolverResult::Unsat => println!("UNSAT"),
//!     SolverResult::Unknown(reason) => println!("Unknown: {reason}"),
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
mod parser;
pub mod result;
pub mod solver;

pub use backend::{SolverBackend, create_backend, create_default_backend};
pub use config::{SolverConfig, SolverKind};
pub use error::SolverError;
pub use model::Model;
pub use result::SolverResult;
pub use solver::CliSolver;
