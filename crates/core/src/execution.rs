//! Symbolic executions and their well-formedness.
//!
//! An [`Execution`] names one copy of the solved relations (`act`, `w`, `v`,
//! `loc`, `mon`, `so`, `hb`) over a program. The main execution and every
//! speculative execution are distinct values that differ only in their
//! variable prefix, so the same well-formedness encoding serves all rounds.

use jmmcheck_smtlib::Term;
use jmmcheck_smtlib::builder::{
    and, bool_lit, distinct, eq, implies, indicator, int, iff, ite, lt, not, or, sum, var,
};

use crate::action::{ActionId, ActionKind, ThreadId};
use crate::program::Program;
use crate::semantics::SequentialSemantics;

/// One named set of relation variables over a program.
///
/// Accessors take ids issued by the execution's own program and panic on
/// any other id, as [`Program::action`] does.
#[derive(Debug, Clone)]
pub struct Execution<'p> {
    program: &'p Program,
    prefix: String,
    round: Option<usize>,
}

/// A labelled conjunct of the legality formula.
pub type Conjunct = (String, Term);

impl<'p> Execution<'p> {
    /// The execution whose outcome is under test.
    pub fn main(program: &'p Program) -> Self {
        Self {
            program,
            prefix: "e".to_string(),
            round: None,
        }
    }

    /// The speculative execution `E_round`.
    pub fn speculative(program: &'p Program, round: usize) -> Self {
        Self {
            program,
            prefix: format!("e{round}"),
            round: Some(round),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `None` for the main execution.
    pub fn round(&self) -> Option<usize> {
        self.round
    }

    pub fn is_main(&self) -> bool {
        self.round.is_none()
    }

    // ---- variable names ----

    pub fn act_name(&self, a: ActionId) -> String {
        format!("{}_act_{}", self.prefix, a.0)
    }

    pub fn w_name(&self, read: ActionId, write: ActionId) -> String {
        format!("{}_w_{}_{}", self.prefix, read.0, write.0)
    }

    pub fn v_name(&self, write: ActionId) -> String {
        format!("{}_v_{}", self.prefix, write.0)
    }

    pub fn loc_name(&self, a: ActionId) -> String {
        format!("{}_loc_{}", self.prefix, a.0)
    }

    pub fn mon_name(&self, a: ActionId) -> String {
        format!("{}_mon_{}", self.prefix, a.0)
    }

    pub fn so_name(&self, a: ActionId) -> String {
        format!("{}_so_{}", self.prefix, a.0)
    }

    pub fn hb_name(&self, a: ActionId, b: ActionId) -> String {
        format!("{}_hb_{}_{}", self.prefix, a.0, b.0)
    }

    // ---- relation terms ----

    /// The action occurs in this execution.
    pub fn act(&self, a: ActionId) -> Term {
        var(self.act_name(a))
    }

    /// `read` sees `write`; `false` unless `write` is a candidate.
    pub fn w(&self, read: ActionId, write: ActionId) -> Term {
        if self.program.is_candidate(read, write) {
            var(self.w_name(read, write))
        } else {
            bool_lit(false)
        }
    }

    /// Value written by `write`.
    pub fn v(&self, write: ActionId) -> Term {
        match self.program.action(write).fixed_value() {
            Some(v) => int(v),
            None => var(self.v_name(write)),
        }
    }

    /// Location touched by an access.
    pub fn loc(&self, a: ActionId) -> Term {
        match self.program.action(a).fixed_location() {
            Some(l) => int(l.0 as i64),
            None => var(self.loc_name(a)),
        }
    }

    /// Monitor of a lock or unlock.
    pub fn mon(&self, a: ActionId) -> Term {
        match self.program.action(a).fixed_monitor() {
            Some(m) => int(m.0 as i64),
            None => var(self.mon_name(a)),
        }
    }

    /// Position of a synchronization action in `so`.
    pub fn so(&self, a: ActionId) -> Term {
        var(self.so_name(a))
    }

    pub fn so_before(&self, a: ActionId, b: ActionId) -> Term {
        if a == b {
            return bool_lit(false);
        }
        lt(self.so(a), self.so(b))
    }

    pub fn same_location(&self, a: ActionId, b: ActionId) -> Term {
        let (x, y) = (self.program.action(a), self.program.action(b));
        if !x.may_alias(y) {
            return bool_lit(false);
        }
        eq(self.loc(a), self.loc(b))
    }

    pub fn same_monitor(&self, a: ActionId, b: ActionId) -> Term {
        let (x, y) = (self.program.action(a), self.program.action(b));
        if !x.may_share_monitor(y) {
            return bool_lit(false);
        }
        eq(self.mon(a), self.mon(b))
    }

    /// Value returned by `read`: the value of its write-seen.
    pub fn read_value(&self, read: ActionId) -> Term {
        self.program
            .candidate_writes(read)
            .iter()
            .rev()
            .fold(int(0), |acc, &x| ite(self.w(read, x), self.v(x), acc))
    }

    /// Synchronizes-with, derived from `so`.
    pub fn sw(&self, a: ActionId, b: ActionId) -> Term {
        if !self.program.is_sw_candidate(a, b) {
            return bool_lit(false);
        }
        let pairing = match (self.program.kind(a), self.program.kind(b)) {
            (ActionKind::VolatileWrite, ActionKind::VolatileRead) => self.same_location(a, b),
            (ActionKind::Unlock, ActionKind::Lock) => self.same_monitor(a, b),
            _ => bool_lit(true),
        };
        and(vec![self.act(a), self.act(b), self.so_before(a, b), pairing])
    }

    /// One step of `po ∪ sw` between occurring actions.
    pub fn hb_base(&self, a: ActionId, b: ActionId) -> Term {
        let po = if self.program.po(a, b) {
            and(vec![self.act(a), self.act(b)])
        } else {
            bool_lit(false)
        };
        or(vec![po, self.sw(a, b)])
    }

    /// Happens-before; `false` for pairs that never synchronize.
    pub fn hb(&self, a: ActionId, b: ActionId) -> Term {
        if a == b || !self.program.hb_possible(a, b) {
            return bool_lit(false);
        }
        var(self.hb_name(a, b))
    }

    /// Reflexive happens-before over occurring actions.
    pub fn hb_reflexive(&self, a: ActionId, b: ActionId) -> Term {
        if a == b { self.act(a) } else { self.hb(a, b) }
    }

    /// Pins every `hb` variable to the transitive closure of `po ∪ sw`.
    ///
    /// `po ∪ sw` is acyclic whenever `so` agrees with `po`, so the
    /// recursive definition has exactly one solution.
    pub fn hb_definition(&self) -> Term {
        let p = self.program;
        let ids: Vec<ActionId> = p.ids().collect();
        let mut defs = Vec::new();
        for &a in &ids {
            for &b in &ids {
                if a == b || !p.hb_possible(a, b) {
                    continue;
                }
                let mut paths = vec![self.hb_base(a, b)];
                for &c in &ids {
                    let step_possible = p.po(a, c) || p.is_sw_candidate(a, c);
                    if c != a && c != b && step_possible && p.hb_possible(c, b) {
                        paths.push(and(vec![self.hb_base(a, c), self.hb(c, b)]));
                    }
                }
                defs.push(iff(self.hb(a, b), or(paths)));
            }
        }
        and(defs)
    }

    // ---- well-formedness ----

    /// Rule 1: `so` totally orders synchronization actions and respects
    /// the thread ordering.
    pub fn wf_sync_order(&self) -> Term {
        let p = self.program;
        let sync = p.sync_actions();
        let mut parts = vec![distinct(sync.iter().map(|&a| self.so(a)).collect())];
        for &a in sync {
            for &b in sync {
                if p.ends_before(p.thread_of(a), p.thread_of(b)) {
                    parts.push(self.so_before(a, b));
                }
            }
        }
        and(parts)
    }

    /// Rule 2: `so` is consistent with `po`.
    pub fn wf_so_respects_po(&self) -> Term {
        let p = self.program;
        let sync = p.sync_actions();
        let mut parts = Vec::new();
        for &a in sync {
            for &b in sync {
                if p.po(a, b) {
                    parts.push(self.so_before(a, b));
                }
            }
        }
        and(parts)
    }

    /// Rule 3: every occurring read sees exactly one occurring write to
    /// its location; a read that does not occur sees nothing.
    pub fn wf_writes_seen(&self) -> Term {
        let p = self.program;
        let mut parts = Vec::new();
        for r in p.reads() {
            let cands = p.candidate_writes(r);
            parts.push(eq(
                sum(cands.iter().map(|&x| indicator(self.w(r, x)))),
                indicator(self.act(r)),
            ));
            for &x in cands {
                parts.push(implies(
                    self.w(r, x),
                    and(vec![self.act(x), self.same_location(x, r)]),
                ));
            }
        }
        and(parts)
    }

    /// Rule 4: a lock only succeeds once every other thread has released
    /// the monitor as often as it acquired it.
    pub fn wf_lock_nesting(&self) -> Term {
        let p = self.program;
        let locks = p.all_of(&[ActionKind::Lock]);
        let unlocks = p.all_of(&[ActionKind::Unlock]);
        let held_before = |ops: &[ActionId], t: ThreadId, l: ActionId| {
            sum(ops.iter().filter(|&&o| p.thread_of(o) == t).map(|&o| {
                indicator(and(vec![
                    self.act(o),
                    self.same_monitor(o, l),
                    self.so_before(o, l),
                ]))
            }))
        };
        let mut parts = Vec::new();
        for &l in &locks {
            let mut per_thread = Vec::new();
            for thread in p.threads() {
                if thread.id == p.thread_of(l) {
                    continue;
                }
                per_thread.push(eq(
                    held_before(&locks, thread.id, l),
                    held_before(&unlocks, thread.id, l),
                ));
            }
            parts.push(implies(self.act(l), and(per_thread)));
        }
        and(parts)
    }

    /// Rule 5: a volatile read sees the last volatile write to its location
    /// in `so`.
    pub fn wf_volatile_reads(&self) -> Term {
        let p = self.program;
        let mut parts = Vec::new();
        for r in p.all_of(&[ActionKind::VolatileRead]) {
            let cands = p.candidate_writes(r);
            for &x in cands {
                let mut seen = vec![self.so_before(x, r)];
                for &other in cands.iter().filter(|&&o| o != x) {
                    seen.push(implies(
                        and(vec![self.act(other), self.same_location(other, r)]),
                        or(vec![self.so_before(other, x), self.so_before(r, other)]),
                    ));
                }
                parts.push(implies(self.w(r, x), and(seen)));
            }
        }
        and(parts)
    }

    /// Rule 6: `hb` is consistent with `w`.
    pub fn wf_hb_consistent(&self) -> Term {
        let p = self.program;
        let mut parts = Vec::new();
        for r in p.reads() {
            let cands = p.candidate_writes(r);
            for &x in cands {
                let mut consistent = vec![not(self.hb(r, x))];
                for &other in cands.iter().filter(|&&o| o != x) {
                    consistent.push(not(and(vec![
                        self.same_location(other, r),
                        self.hb(x, other),
                        self.hb(other, r),
                    ])));
                }
                parts.push(implies(self.w(r, x), and(consistent)));
            }
        }
        and(parts)
    }

    /// All well-formedness conjuncts, labelled for the SMT script.
    pub fn well_formedness(&self, semantics: &dyn SequentialSemantics) -> Vec<Conjunct> {
        let label = |what: &str| format!("{}: {what}", self.prefix);
        vec![
            (label("hb = closure(po | sw)"), self.hb_definition()),
            (label("wf1 so is a total order"), self.wf_sync_order()),
            (label("wf2 so respects po"), self.wf_so_respects_po()),
            (label("wf3 unique write seen"), self.wf_writes_seen()),
            (label("wf4 lock nesting"), self.wf_lock_nesting()),
            (label("wf5 volatile reads"), self.wf_volatile_reads()),
            (label("wf6 hb consistent with w"), self.wf_hb_consistent()),
            (
                label("wf7 sequentially valid"),
                semantics.sequentially_valid(self),
            ),
        ]
    }

    /// Conjunction of [`Execution::well_formedness`].
    pub fn well_formed(&self, semantics: &dyn SequentialSemantics) -> Term {
        and(self
            .well_formedness(semantics)
            .into_iter()
            .map(|(_, t)| t))
    }
}
