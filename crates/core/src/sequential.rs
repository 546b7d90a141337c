//! Sequential consistency of the main execution.
//!
//! An execution is sequentially consistent when some total order of its
//! actions extends program order, the synchronization order and the thread
//! ordering, and every read sees the latest write to its location before it
//! in that order. The order is solved as one integer position per action.

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, distinct, implies, lt, or, var};

use crate::action::ActionId;
use crate::execution::Execution;

/// Selects the sequentially consistent branch when the commit chain is
/// also on offer.
pub const SC_PATH: &str = "sc_path";

pub fn order_name(a: ActionId) -> String {
    format!("sc_to_{}", a.0)
}

/// Position of `a` in the total order.
pub fn order(a: ActionId) -> Term {
    var(order_name(a))
}

/// `exec` is explained by an interleaving of its threads.
pub fn sequentially_consistent(exec: &Execution<'_>) -> Term {
    let p = exec.program();
    let ids: Vec<ActionId> = p.ids().collect();
    let before = |a: ActionId, b: ActionId| lt(order(a), order(b));

    let mut parts = vec![distinct(ids.iter().map(|&a| order(a)).collect())];
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            if p.po(a, b) || p.ends_before(p.thread_of(a), p.thread_of(b)) {
                parts.push(before(a, b));
            }
        }
    }

    let sync = p.sync_actions();
    for &a in sync {
        for &b in sync {
            if a != b {
                parts.push(implies(before(a, b), exec.so_before(a, b)));
            }
        }
    }

    for r in p.reads() {
        let cands = p.candidate_writes(r);
        for &x in cands {
            let mut latest = vec![before(x, r)];
            for &other in cands.iter().filter(|&&o| o != x) {
                latest.push(implies(
                    and(vec![exec.act(other), exec.same_location(other, r)]),
                    or(vec![before(other, x), before(r, other)]),
                ));
            }
            parts.push(implies(exec.w(r, x), and(latest)));
        }
    }
    and(parts)
}
