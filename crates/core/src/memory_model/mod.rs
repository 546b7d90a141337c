//! The justification rules tying the commit chain to the speculative
//! executions.
//!
//! Rules 1, 4, 5 and 6 and the location/monitor agreement are common to
//! both models and live here as provided methods of [`MemoryModel`].
//! Rules 2, 3, 7, 8 and 9 differ between the models and are implemented by
//! [`OriginalModel`] and [`AltModel`].

mod alt;
mod original;

use std::fmt;
use std::str::FromStr;

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{and, eq, iff, implies, not};
use serde::Serialize;

use crate::action::{ActionId, ActionKind};
use crate::execution::{Conjunct, Execution};
use crate::justify::CommitChain;
use crate::program::Program;

pub use alt::AltModel;
pub use original::OriginalModel;

/// Which published model a legality problem encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Manson, Pugh and Adve.
    #[default]
    Original,
    /// Ševčík and Aspinall.
    Alt,
}

impl ModelKind {
    /// The rule set for this model.
    pub fn model(self) -> &'static dyn MemoryModel {
        match self {
            ModelKind::Original => &OriginalModel,
            ModelKind::Alt => &AltModel,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Original => write!(f, "original"),
            ModelKind::Alt => write!(f, "alt"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" | "jmm" | "manson-pugh-adve" => Ok(ModelKind::Original),
            "alt" | "sevcik" | "sevcik-aspinall" => Ok(ModelKind::Alt),
            _ => Err(format!(
                "unknown memory model `{s}` (expected one of: original, alt)"
            )),
        }
    }
}

/// Everything a rule needs to constrain round `i` of a justification.
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a, 'p> {
    pub program: &'p Program,
    pub main: &'a Execution<'p>,
    /// `E_1 .. E_{N-1}`.
    pub speculative: &'a [Execution<'p>],
    pub commits: &'a CommitChain,
    /// `1 ..= N-1`.
    pub round: usize,
}

impl<'a, 'p> RoundContext<'a, 'p> {
    /// The speculative execution of this round.
    pub fn current(&self) -> &'a Execution<'p> {
        &self.speculative[self.round - 1]
    }

    /// Speculative executions of this and all later rounds.
    pub fn later_rounds(&self) -> &'a [Execution<'p>] {
        &self.speculative[self.round - 1..]
    }

    /// `a ∈ C_i`.
    pub fn committed(&self, a: ActionId) -> Term {
        self.commits.contains(self.round, a)
    }

    /// `a ∈ C_{i-1}`.
    pub fn previously_committed(&self, a: ActionId) -> Term {
        self.commits.contains(self.round - 1, a)
    }

    /// `a ∈ C_i \ C_{i-1}`.
    pub fn newly_committed(&self, a: ActionId) -> Term {
        and(vec![self.committed(a), not(self.previously_committed(a))])
    }
}

/// A memory model expressed as constraints on one justification round.
pub trait MemoryModel: Sync {
    fn kind(&self) -> ModelKind;

    /// Rule 2: agreement of happens-before on committed actions.
    fn hb_agreement(&self, ctx: &RoundContext<'_, '_>) -> Term;

    /// Rule 3: agreement of synchronization order on committed actions.
    fn so_agreement(&self, ctx: &RoundContext<'_, '_>) -> Term;

    /// Rule 7: newly committed reads see writes committed earlier.
    fn new_reads_see_committed(&self, ctx: &RoundContext<'_, '_>) -> Term;

    /// Rule 8: synchronization that justified a commit persists.
    fn sufficient_sync(&self, ctx: &RoundContext<'_, '_>) -> Term;

    /// Rule 9: a committed external action has its hb-predecessors committed.
    fn external_actions(&self, ctx: &RoundContext<'_, '_>) -> Term;

    /// Rule 1: committed actions occur in the round's execution.
    fn committed_actions_occur(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let cur = ctx.current();
        and(ctx
            .program
            .ids()
            .map(|a| implies(ctx.committed(a), cur.act(a))))
    }

    /// Rule 4: committed writes produce their final values.
    fn committed_values_agree(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let cur = ctx.current();
        and(ctx
            .program
            .writes()
            .into_iter()
            .map(|x| implies(ctx.committed(x), eq(cur.v(x), ctx.main.v(x)))))
    }

    /// Rule 5: reads committed in an earlier round see their final writes.
    fn frozen_writes_seen(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let cur = ctx.current();
        and(ctx.program.reads().into_iter().map(|r| {
            let same = ctx
                .program
                .candidate_writes(r)
                .iter()
                .map(|&x| iff(cur.w(r, x), ctx.main.w(r, x)));
            implies(ctx.previously_committed(r), and(same))
        }))
    }

    /// Rule 6: uncommitted reads see writes that happen-before them.
    fn new_reads_see_past(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let cur = ctx.current();
        and(ctx.program.reads().into_iter().map(|r| {
            let past = ctx
                .program
                .candidate_writes(r)
                .iter()
                .map(|&x| implies(cur.w(r, x), cur.hb(x, r)));
            implies(
                and(vec![cur.act(r), not(ctx.previously_committed(r))]),
                and(past),
            )
        }))
    }

    /// Committed accesses and monitor operations resolve as in the main execution.
    fn committed_locations_agree(&self, ctx: &RoundContext<'_, '_>) -> Term {
        let cur = ctx.current();
        let mut parts = Vec::new();
        for action in ctx.program.actions() {
            let a = action.id;
            if action.kind.is_access() && action.fixed_location().is_none() {
                parts.push(implies(ctx.committed(a), eq(cur.loc(a), ctx.main.loc(a))));
            }
            if action.kind.is_monitor_op() && action.fixed_monitor().is_none() {
                parts.push(implies(ctx.committed(a), eq(cur.mon(a), ctx.main.mon(a))));
            }
        }
        and(parts)
    }

    /// All constraints of one round, labelled.
    fn round_rules(&self, ctx: &RoundContext<'_, '_>) -> Vec<Conjunct> {
        let label = |what: &str| format!("round {}: {what}", ctx.round);
        vec![
            (label("rule 1 committed actions occur"), self.committed_actions_occur(ctx)),
            (label("rule 2 hb agreement"), self.hb_agreement(ctx)),
            (label("rule 3 so agreement"), self.so_agreement(ctx)),
            (label("rule 4 committed values"), self.committed_values_agree(ctx)),
            (label("rule 5 frozen writes seen"), self.frozen_writes_seen(ctx)),
            (label("rule 6 reads see the past"), self.new_reads_see_past(ctx)),
            (label("rule 7 newly committed reads"), self.new_reads_see_committed(ctx)),
            (label("rule 8 sufficient synchronization"), self.sufficient_sync(ctx)),
            (label("rule 9 external actions"), self.external_actions(ctx)),
            (label("locations and monitors agree"), self.committed_locations_agree(ctx)),
        ]
    }
}

/// Every `x` with `hb(x, y)` in `hb_of` is committed when `y` is.
pub(crate) fn external_predecessors_committed(
    ctx: &RoundContext<'_, '_>,
    hb_of: &Execution<'_>,
) -> Term {
    let p = ctx.program;
    and(p.all_of(&[ActionKind::External]).into_iter().map(|y| {
        let preds = p
            .ids()
            .map(|x| implies(hb_of.hb(x, y), ctx.committed(x)));
        implies(ctx.committed(y), and(preds))
    }))
}

/// A newly committed read's write-seen is already committed, in the main
/// execution and, when `speculative_too`, in the round's execution.
pub(crate) fn writes_seen_committed(ctx: &RoundContext<'_, '_>, speculative_too: bool) -> Term {
    let cur = ctx.current();
    and(ctx.program.reads().into_iter().map(|r| {
        let mut parts = Vec::new();
        for &x in ctx.program.candidate_writes(r) {
            parts.push(implies(ctx.main.w(r, x), ctx.previously_committed(x)));
            if speculative_too {
                parts.push(implies(cur.w(r, x), ctx.previously_committed(x)));
            }
        }
        implies(ctx.newly_committed(r), and(parts))
    }))
}

/// Name of the commit variable, for tests that inspect formulas.
#[cfg(test)]
pub(crate) fn commit_var(round: usize, a: ActionId) -> Term {
    jmmcheck_smtlib::builder::var(format!("c{round}_{}", a.0))
}
