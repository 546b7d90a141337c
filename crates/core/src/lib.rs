//! # jmmcheck-core
//!
//! Bounded legality checking of concurrent outcomes under the Java memory
//! model.
//!
//! A [`Program`] fixes the actions, program order and thread ordering of a
//! small concurrent program. An [`Outcome`] states what was observed. The
//! [`JustificationDriver`] encodes whether some legal execution exhibits
//! the outcome, either as a sequentially consistent interleaving or through
//! a chain of at most `N` commit sets, under the original model of Manson,
//! Pugh and Adve or the revision of Ševčík and Aspinall. The resulting
//! [`LegalityProblem`] is decided by an external SMT solver.
//!
//! ## Usage
//!
//! ```no_run
//! use jmmcheck_core::{
//!     GuardedSemantics, JustificationConfig, JustificationDriver, LocationId, ModelKind,
//!     Outcome, ProgramBuilder,
//! };
//! use jmmcheck_solver::CliSolver;
//!
//! let (x, y) = (LocationId(0), LocationId(1));
//! let mut b = ProgramBuilder::new();
//! b.initial_write(x, 0, false);
//! b.initial_write(y, 0, false);
//! let t1 = b.thread("t1");
//! b.write(t1, [x], [1]);
//! let r1 = b.read(t1, [y]);
//! let t2 = b.thread("t2");
//! b.write(t2, [y], [1]);
//! let r2 = b.read(t2, [x]);
//! let program = b.build().unwrap();
//!
//! let semantics = GuardedSemantics::new();
//! let config = JustificationConfig::new().with_rounds(3).with_model(ModelKind::Alt);
//! let driver = JustificationDriver::new(&program, &semantics, config);
//! let outcome = Outcome::new().read_value(r1, 0).read_value(r2, 0);
//!
//! let solver = CliSolver::with_default_config().unwrap();
//! let verdict = driver.check(&outcome, &solver).unwrap();
//! println!("legal: {}", verdict.is_legal());
//! ```

pub mod action;
pub mod bounds;
pub mod config;
pub mod error;
pub mod execution;
pub mod graph;
pub mod justify;
pub mod memory_model;
pub mod outcome;
pub mod program;
pub mod semantics;
pub mod sequential;
pub mod witness;

pub use action::{Action, ActionId, ActionKind, LocationId, MonitorId, ThreadId};
pub use bounds::{Bounds, BoundsBuilder, Domain};
pub use config::JustificationConfig;
pub use error::{JustifyError, ProgramError};
pub use execution::{Conjunct, Execution};
pub use justify::{CommitChain, JustificationDriver, JustificationView, LegalityProblem, Verdict};
pub use memory_model::{AltModel, MemoryModel, ModelKind, OriginalModel, RoundContext};
pub use outcome::{Observation, Outcome};
pub use program::{Program, ProgramBuilder, Thread};
pub use semantics::{Expr, GuardedSemantics, SequentialSemantics};
pub use witness::{ExecutionWitness, Justification, Witness};
