use std::fmt;

use jmmcheck_solver::SolverError;

use crate::action::{ActionId, LocationId, ThreadId};

/// A front-end contract violation detected while building a [`Program`].
///
/// [`Program`]: crate::program::Program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// A thread id that the builder never handed out.
    UnknownThread(ThreadId),
    /// An action id outside the program.
    UnknownAction(ActionId),
    /// A read that no write could ever satisfy.
    EmptyCandidates(ActionId),
    /// A location accessed both as volatile and as normal memory.
    MixedVolatility(LocationId),
    /// A memory access with an empty location domain.
    MissingLocation(ActionId),
    /// A lock or unlock with an empty monitor domain.
    MissingMonitor(ActionId),
    /// A write with an empty value domain.
    MissingValues(ActionId),
    /// A program-order edge between actions of different threads.
    CrossThreadOrder(ActionId, ActionId),
    /// Program order reaches this action from itself.
    CyclicProgramOrder(ActionId),
    /// The thread ordering (`endsBefore`) reaches this thread from itself.
    ThreadOrderCycle(ThreadId),
    /// The action was used where a read is required.
    NotARead(ActionId),
    /// The action was used where a write is required.
    NotAWrite(ActionId),
    /// The write is not among the read's candidate writes.
    NotACandidate { read: ActionId, write: ActionId },
    /// A guard or value of `action` depends on a read that is not po-before it.
    ReadNotBefore { read: ActionId, action: ActionId },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::UnknownThread(t) => write!(f, "unknown thread {t}"),
            ProgramError::UnknownAction(a) => write!(f, "unknown action {a}"),
            ProgramError::EmptyCandidates(r) => {
                write!(f, "read {r} has no candidate write")
            }
            ProgramError::MixedVolatility(l) => {
                write!(f, "location {l} is accessed both as volatile and as normal memory")
            }
            ProgramError::MissingLocation(a) => write!(f, "access {a} has no location domain"),
            ProgramError::MissingMonitor(a) => write!(f, "action {a} has no monitor domain"),
            ProgramError::MissingValues(a) => write!(f, "write {a} has no value domain"),
            ProgramError::CrossThreadOrder(a, b) => {
                write!(f, "program order {a} -> {b} crosses threads")
            }
            ProgramError::CyclicProgramOrder(a) => {
                write!(f, "program order is cyclic at action {a}")
            }
            ProgramError::ThreadOrderCycle(t) => {
                write!(f, "thread ordering is cyclic at thread {t}")
            }
            ProgramError::NotARead(a) => write!(f, "action {a} is not a read"),
            ProgramError::NotAWrite(a) => write!(f, "action {a} is not a write"),
            ProgramError::NotACandidate { read, write } => {
                write!(f, "write {write} is not a candidate of read {read}")
            }
            ProgramError::ReadNotBefore { read, action } => {
                write!(f, "action {action} depends on read {read}, which is not po-before it")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// Failure to build or decide a legality problem.
///
/// An illegal outcome is not an error: it is [`Verdict::Illegal`].
///
/// [`Verdict::Illegal`]: crate::justify::Verdict::Illegal
#[derive(Debug)]
pub enum JustifyError {
    /// A justification needs at least one commit set.
    InvalidRounds(usize),
    /// The program or the outcome violates the front-end contract.
    Program(ProgramError),
    /// The solver could not be run or its output could not be read.
    Solver(SolverError),
    /// The solver answered `unknown`.
    Inconclusive(String),
    /// The solver answered `sat` without printing a model.
    MissingModel,
    /// The model lacks a value the witness needs.
    MalformedWitness(String),
}

impl fmt::Display for JustifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JustifyError::InvalidRounds(n) => {
                write!(f, "invalid round count {n}: at least one commit set is required")
            }
            JustifyError::Program(e) => write!(f, "malformed program: {e}"),
            JustifyError::Solver(e) => write!(f, "{e}"),
            JustifyError::Inconclusive(reason) => write!(f, "solver was inconclusive: {reason}"),
            JustifyError::MissingModel => write!(f, "solver reported sat without a model"),
            JustifyError::MalformedWitness(msg) => write!(f, "malformed witness: {msg}"),
        }
    }
}

impl std::error::Error for JustifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JustifyError::Program(e) => Some(e),
            JustifyError::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProgramError> for JustifyError {
    fn from(e: ProgramError) -> Self {
        JustifyError::Program(e)
    }
}

impl From<SolverError> for JustifyError {
    fn from(e: SolverError) -> Self {
        JustifyError::Solver(e)
    }
}
