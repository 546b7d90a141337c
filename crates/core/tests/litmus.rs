//! Litmus tests decided by a real solver.
//!
//! Every test returns early, naming itself on stderr, when no Z3 binary is
//! installed. Set `JMMCHECK_REQUIRE_SOLVER=1` to turn those skips into
//! failures.

mod common;

use std::path::PathBuf;

use common::{Litmus, solver_or_skip, solver_or_skip_with};
use jmmcheck_core::{
    ActionId, Justification, JustificationConfig, JustificationDriver, ModelKind, Verdict,
};
use jmmcheck_solver::{CliSolver, SolverError, SolverKind};

const MODELS: [ModelKind; 2] = [ModelKind::Original, ModelKind::Alt];

fn decide(litmus: &Litmus, config: JustificationConfig, solver: &CliSolver) -> Verdict {
    let driver = JustificationDriver::new(&litmus.program, &litmus.semantics, config);
    let verdict = driver.check(&litmus.outcome, solver).unwrap();
    if let Some(witness) = verdict.witness() {
        witness.check_commit_chain().unwrap();
    }
    verdict
}

fn config(model: ModelKind, rounds: usize) -> JustificationConfig {
    JustificationConfig::new().with_model(model).with_rounds(rounds)
}

fn missing_z3() -> Result<CliSolver, SolverError> {
    Err(SolverError::NotFound(SolverKind::Z3, PathBuf::from("/nonexistent/z3")))
}

#[test]
fn missing_solver_skips_by_default() {
    assert!(solver_or_skip_with(missing_z3(), false).is_none());
}

#[test]
#[should_panic(expected = "JMMCHECK_REQUIRE_SOLVER is set")]
fn missing_solver_fails_when_required() {
    let _ = solver_or_skip_with(missing_z3(), true);
}

#[test]
fn out_of_thin_air_values_are_forbidden() {
    let Some(solver) = solver_or_skip() else { return };
    let litmus = common::out_of_thin_air();
    for model in MODELS {
        for rounds in [3, 5] {
            let verdict = decide(&litmus, config(model, rounds), &solver);
            assert!(!verdict.is_legal(), "{model} with {rounds} rounds");
        }
    }
}

#[test]
fn redundant_read_elimination_is_allowed() {
    let Some(solver) = solver_or_skip() else { return };
    let (litmus, [r1, r2, r3]) = common::redundant_read_elimination();
    for model in MODELS {
        let verdict = decide(&litmus, config(model, 5), &solver);
        let witness = verdict.witness().expect("legal outcome");
        assert!(!witness.is_sequentially_consistent());
        for r in [r1, r2, r3] {
            assert_eq!(witness.main.read_values.get(&r), Some(&1), "{model}");
        }
    }
}

#[test]
fn sc_determined_outcome_is_forbidden_at_every_bound() {
    let Some(solver) = solver_or_skip() else { return };
    let litmus = common::sc_determined();
    for model in MODELS {
        for rounds in 1..=5 {
            let verdict = decide(&litmus, config(model, rounds), &solver);
            assert!(!verdict.is_legal(), "{model} with {rounds} rounds");
        }
    }
}

#[test]
fn store_buffering_needs_three_rounds() {
    let Some(solver) = solver_or_skip() else { return };
    let (litmus, [r1, r2]) = common::store_buffering(false);
    for model in MODELS {
        for rounds in [1, 2] {
            let verdict = decide(&litmus, config(model, rounds), &solver);
            assert!(!verdict.is_legal(), "{model} with {rounds} rounds");
        }
        for rounds in [3, 4] {
            let verdict = decide(&litmus, config(model, rounds), &solver);
            let witness = verdict.witness().expect("legal outcome");
            assert_eq!(witness.rounds, rounds);
            assert_eq!(witness.main.read_values.get(&r1), Some(&0));
            assert_eq!(witness.main.read_values.get(&r2), Some(&0));
        }
    }
}

#[test]
fn sequentially_consistent_outcome_is_legal_at_every_bound() {
    let Some(solver) = solver_or_skip() else { return };
    let (mut litmus, [r1, r2]) = common::store_buffering(false);
    litmus.outcome = jmmcheck_core::Outcome::new()
        .read_value(r1, 1)
        .read_value(r2, 1);
    for model in MODELS {
        for rounds in [1, 2, 3] {
            let verdict = decide(&litmus, config(model, rounds), &solver);
            let witness = verdict.witness().expect("legal outcome");
            if rounds == 1 {
                assert!(witness.is_sequentially_consistent(), "{model}");
            }
        }
    }
}

#[test]
fn volatile_store_buffering_is_forbidden() {
    let Some(solver) = solver_or_skip() else { return };
    let (litmus, _) = common::store_buffering(true);
    for model in MODELS {
        let verdict = decide(&litmus, config(model, 3), &solver);
        assert!(!verdict.is_legal(), "{model}");
    }
}

#[test]
fn locks_exclude_each_other() {
    let Some(solver) = solver_or_skip() else { return };
    let litmus = common::lock_mutual_exclusion();
    for model in MODELS {
        let verdict = decide(&litmus, config(model, 3), &solver);
        assert!(!verdict.is_legal(), "{model}");
    }
}

#[test]
fn committing_a_speculative_write_seen_separates_the_models() {
    let Some(solver) = solver_or_skip() else { return };
    let litmus = common::speculative_write_seen();

    let alt = decide(&litmus, config(ModelKind::Alt, 5), &solver);
    assert!(alt.is_legal());

    let original = decide(&litmus, config(ModelKind::Original, 5), &solver);
    assert!(!original.is_legal());
}

#[test]
fn external_actions_follow_the_hb_of_their_model() {
    let Some(solver) = solver_or_skip() else { return };
    let (litmus, ids) = common::external_after_lock();

    let pinned = |model: ModelKind| {
        let config = config(model, 3).with_sc_shortcut(false);
        let driver = JustificationDriver::new(&litmus.program, &litmus.semantics, config);
        let mut problem = driver.build(&litmus.outcome).unwrap();
        let view = problem.view().clone();
        // T2's critical section comes first in the main execution
        problem.assume(view.main().so_before(ids.unlock2, ids.lock1));
        problem.assume(view.committed(1, ids.external).unwrap());
        problem.assume(jmmcheck_smtlib::builder::not(
            view.committed(1, ids.write).unwrap(),
        ));
        let verdict = problem.check(&solver).unwrap();
        if let Some(witness) = verdict.witness() {
            witness.check_commit_chain().unwrap();
        }
        verdict
    };

    let original = pinned(ModelKind::Original);
    let witness = original.witness().expect("accepted by the original model");
    assert!(!witness.is_sequentially_consistent());
    let main_so = &witness.main.sync_order;
    let pos = |a| main_so.iter().position(|&b| b == a);
    assert!(pos(ids.unlock2) < pos(ids.lock1));
    assert!(pos(ids.lock2) < pos(ids.unlock2));
    assert!(pos(ids.lock1) < pos(ids.unlock1));

    assert!(!pinned(ModelKind::Alt).is_legal());
}

/// T1's unlock synchronizes with T2's lock in `E_1` and justifies committing
/// the write that follows, but `E_2` and the main execution run T2 first.
/// The original model requires that synchronization to persist in every
/// later round; the revised model has no such rule.
#[test]
fn justifying_synchronization_must_persist_in_later_rounds() {
    let Some(solver) = solver_or_skip() else { return };
    let (litmus, ids) = common::write_after_critical_section();

    let pinned = |model: ModelKind| {
        let config = config(model, 3).with_sc_shortcut(false);
        let driver = JustificationDriver::new(&litmus.program, &litmus.semantics, config);
        let mut problem = driver.build(&litmus.outcome).unwrap();
        let view = problem.view().clone();
        let [first, second] = view.speculative() else {
            panic!("three rounds have two speculative executions");
        };
        problem.assume(view.main().so_before(ids.unlock2, ids.lock1));
        problem.assume(first.so_before(ids.unlock1, ids.lock2));
        problem.assume(second.so_before(ids.unlock2, ids.lock1));
        problem.assume(view.committed(1, ids.write).unwrap());
        let verdict = problem.check(&solver).unwrap();
        if let Some(witness) = verdict.witness() {
            witness.check_commit_chain().unwrap();
        }
        verdict
    };

    assert!(!pinned(ModelKind::Original).is_legal());

    let alt = pinned(ModelKind::Alt);
    let witness = alt.witness().expect("accepted by the revised model");
    let Justification::CommitChain { commits, speculative } = &witness.justification else {
        panic!("pure chain requested, got {:?}", witness.justification);
    };
    assert!(commits[1].contains(&ids.write));
    let pos = |order: &[ActionId], a| order.iter().position(|&b| b == a);
    let e1 = &speculative[0].sync_order;
    let e2 = &speculative[1].sync_order;
    assert!(pos(e1, ids.unlock1) < pos(e1, ids.lock2));
    assert!(pos(e2, ids.unlock2) < pos(e2, ids.lock1));
}
