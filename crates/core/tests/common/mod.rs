//! Litmus programs shared by the integration tests.

#![allow(dead_code)]

use jmmcheck_core::{
    ActionId, Expr, GuardedSemantics, LocationId, MonitorId, Outcome, Program, ProgramBuilder,
};
use jmmcheck_solver::{CliSolver, SolverError};

pub const X: LocationId = LocationId(0);
pub const Y: LocationId = LocationId(1);
pub const M: MonitorId = MonitorId(0);

/// A program, its thread semantics and the outcome in question.
pub struct Litmus {
    pub program: Program,
    pub semantics: GuardedSemantics,
    pub outcome: Outcome,
}

/// Set to make solver-backed tests fail instead of skipping when Z3 is missing.
pub const REQUIRE_SOLVER: &str = "JMMCHECK_REQUIRE_SOLVER";

/// The default solver, or `None` when Z3 is not installed and
/// [`REQUIRE_SOLVER`] is unset.
pub fn solver_or_skip() -> Option<CliSolver> {
    let required = std::env::var_os(REQUIRE_SOLVER).is_some_and(|v| !v.is_empty() && v != "0");
    solver_or_skip_with(CliSolver::with_default_config(), required)
}

/// Skip decision for a solver lookup. Every skip is reported on stderr with
/// the test's name so `--nocapture` runs show which checks did not run.
pub fn solver_or_skip_with(
    found: Result<CliSolver, SolverError>,
    required: bool,
) -> Option<CliSolver> {
    match found {
        Ok(solver) => Some(solver),
        Err(e) if required => panic!("{REQUIRE_SOLVER} is set but no solver is usable: {e}"),
        Err(e) => {
            let test = std::thread::current().name().unwrap_or("<unnamed>").to_string();
            eprintln!("SKIPPED {test}: {e} (set {REQUIRE_SOLVER}=1 to fail instead)");
            None
        }
    }
}

fn with_initial_zeros(volatile: bool) -> ProgramBuilder {
    let mut b = ProgramBuilder::new();
    b.initial_write(X, 0, volatile);
    b.initial_write(Y, 0, volatile);
    b
}

/// `r1 = x; y = r1  ∥  r2 = y; x = r2` with `r1 == r2 == 1`.
pub fn out_of_thin_air() -> Litmus {
    let mut b = with_initial_zeros(false);
    let t1 = b.thread("t1");
    let r1 = b.read(t1, [X]);
    let wy = b.write(t1, [Y], [0, 1]);
    let t2 = b.thread("t2");
    let r2 = b.read(t2, [Y]);
    let wx = b.write(t2, [X], [0, 1]);
    let program = b.build().unwrap();

    let mut semantics = GuardedSemantics::new();
    semantics.value(wy, Expr::read(r1)).value(wx, Expr::read(r2));
    Litmus {
        program,
        semantics,
        outcome: Outcome::new().read_value(r1, 1).read_value(r2, 1),
    }
}

/// Redundant read elimination:
/// `r1 = x; r2 = x; if (r1 == r2) y = 1  ∥  r3 = y; x = r3`
/// with `r1 == r2 == r3 == 1`.
pub fn redundant_read_elimination() -> (Litmus, [ActionId; 3]) {
    let mut b = with_initial_zeros(false);
    let t1 = b.thread("t1");
    let r1 = b.read(t1, [X]);
    let r2 = b.read(t1, [X]);
    let wy = b.write(t1, [Y], [1]);
    let t2 = b.thread("t2");
    let r3 = b.read(t2, [Y]);
    let wx = b.write(t2, [X], [0, 1]);
    let program = b.build().unwrap();

    let mut semantics = GuardedSemantics::new();
    semantics
        .guard(wy, Expr::read(r1).equals(Expr::read(r2)))
        .value(wx, Expr::read(r3));
    let litmus = Litmus {
        program,
        semantics,
        outcome: Outcome::new()
            .read_value(r1, 1)
            .read_value(r2, 1)
            .read_value(r3, 1),
    };
    (litmus, [r1, r2, r3])
}

/// `if (x == 1) y = 1  ∥  if (y == 1) x = 1` with both reads seeing 1.
pub fn sc_determined() -> Litmus {
    let mut b = with_initial_zeros(false);
    let t1 = b.thread("t1");
    let r1 = b.read(t1, [X]);
    let wy = b.write(t1, [Y], [1]);
    let t2 = b.thread("t2");
    let r2 = b.read(t2, [Y]);
    let wx = b.write(t2, [X], [1]);
    let program = b.build().unwrap();

    let mut semantics = GuardedSemantics::new();
    semantics
        .guard(wy, Expr::read(r1).equals(Expr::int(1)))
        .guard(wx, Expr::read(r2).equals(Expr::int(1)));
    Litmus {
        program,
        semantics,
        outcome: Outcome::new().read_value(r1, 1).read_value(r2, 1),
    }
}

/// `x = 1; r1 = y  ∥  y = 1; r2 = x` with `r1 == r2 == 0`.
pub fn store_buffering(volatile: bool) -> (Litmus, [ActionId; 2]) {
    let mut b = with_initial_zeros(volatile);
    let t1 = b.thread("t1");
    let t2 = b.thread("t2");
    let (r1, r2) = if volatile {
        b.volatile_write(t1, [X], [1]);
        let r1 = b.volatile_read(t1, [Y]);
        b.volatile_write(t2, [Y], [1]);
        (r1, b.volatile_read(t2, [X]))
    } else {
        b.write(t1, [X], [1]);
        let r1 = b.read(t1, [Y]);
        b.write(t2, [Y], [1]);
        (r1, b.read(t2, [X]))
    };
    let litmus = Litmus {
        program: b.build().unwrap(),
        semantics: GuardedSemantics::new(),
        outcome: Outcome::new().read_value(r1, 0).read_value(r2, 0),
    };
    (litmus, [r1, r2])
}

/// `lock; r1 = x; x = 1; unlock` in two threads, both reads seeing 0.
pub fn lock_mutual_exclusion() -> Litmus {
    let mut b = ProgramBuilder::new();
    b.initial_write(X, 0, false);
    let mut reads = Vec::new();
    for name in ["t1", "t2"] {
        let t = b.thread(name);
        b.lock(t, [M]);
        reads.push(b.read(t, [X]));
        b.write(t, [X], [1]);
        b.unlock(t, [M]);
    }
    Litmus {
        program: b.build().unwrap(),
        semantics: GuardedSemantics::new(),
        outcome: Outcome::new().read_value(reads[0], 0).read_value(reads[1], 0),
    }
}

/// `r1 = x; if (r1 == 0) x = 1; r2 = x; y = r2  ∥  r3 = y; x = r3`
/// with `r1 == r2 == r3 == 1`.
///
/// The justification commits `r2` while its speculative write-seen is the
/// uncommitted conditional write.
pub fn speculative_write_seen() -> Litmus {
    let mut b = with_initial_zeros(false);
    let t1 = b.thread("t1");
    let r1 = b.read(t1, [X]);
    let wx1 = b.write(t1, [X], [1]);
    let r2 = b.read(t1, [X]);
    let wy = b.write(t1, [Y], [0, 1]);
    let t2 = b.thread("t2");
    let r3 = b.read(t2, [Y]);
    let wx2 = b.write(t2, [X], [0, 1]);
    let program = b.build().unwrap();

    let mut semantics = GuardedSemantics::new();
    semantics
        .guard(wx1, Expr::read(r1).equals(Expr::int(0)))
        .value(wy, Expr::read(r2))
        .value(wx2, Expr::read(r3));
    Litmus {
        program,
        semantics,
        outcome: Outcome::new()
            .read_value(r1, 1)
            .read_value(r2, 1)
            .read_value(r3, 1),
    }
}

/// Actions of [`external_after_lock`].
pub struct LockHandoff {
    pub unlock1: ActionId,
    pub external: ActionId,
    pub write: ActionId,
    pub lock2: ActionId,
    pub unlock2: ActionId,
    pub lock1: ActionId,
}

/// `lock m; unlock m; println()  ∥  x = 1; lock m; unlock m`
pub fn external_after_lock() -> (Litmus, LockHandoff) {
    let mut b = ProgramBuilder::new().with_external_methods(["println"]);
    let t1 = b.thread("t1");
    let lock1 = b.lock(t1, [M]);
    let unlock1 = b.unlock(t1, [M]);
    let external = b.call(t1, "println").unwrap();
    let t2 = b.thread("t2");
    let write = b.write(t2, [X], [1]);
    let lock2 = b.lock(t2, [M]);
    let unlock2 = b.unlock(t2, [M]);
    let litmus = Litmus {
        program: b.build().unwrap(),
        semantics: GuardedSemantics::new(),
        outcome: Outcome::new(),
    };
    let ids = LockHandoff {
        unlock1,
        external,
        write,
        lock2,
        unlock2,
        lock1,
    };
    (litmus, ids)
}

pub struct CriticalSections {
    pub lock1: ActionId,
    pub unlock1: ActionId,
    pub lock2: ActionId,
    pub unlock2: ActionId,
    pub write: ActionId,
}

/// `lock m; unlock m  ∥  lock m; unlock m; x = 1`
pub fn write_after_critical_section() -> (Litmus, CriticalSections) {
    let mut b = ProgramBuilder::new();
    let t1 = b.thread("t1");
    let lock1 = b.lock(t1, [M]);
    let unlock1 = b.unlock(t1, [M]);
    let t2 = b.thread("t2");
    let lock2 = b.lock(t2, [M]);
    let unlock2 = b.unlock(t2, [M]);
    let write = b.write(t2, [X], [1]);
    let litmus = Litmus {
        program: b.build().unwrap(),
        semantics: GuardedSemantics::new(),
        outcome: Outcome::new().write_value(write, 1),
    };
    let ids = CriticalSections {
        lock1,
        unlock1,
        lock2,
        unlock2,
        write,
    };
    (litmus, ids)
}
