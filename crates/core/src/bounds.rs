//! Finite domains of the solved variables.
//!
//! Every variable that can appear in a legality formula is declared here
//! together with the set of values it may take. Variables whose domain is a
//! single value are never declared; the relation terms of
//! [`Execution`](crate::execution::Execution) substitute the literal instead.

use std::collections::BTreeMap;

use jmmcheck_smtlib::builder::{and, bool_lit, int, le, member, var};
use jmmcheck_smtlib::{Command, Sort, Term};

use crate::action::ActionId;
use crate::execution::Execution;
use crate::justify::CommitChain;
use crate::program::Program;
use crate::sequential;

/// Values a declared variable may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Bool,
    /// Inclusive range.
    IntRange(i64, i64),
    IntSet(Vec<i64>),
}

impl Domain {
    pub fn sort(&self) -> Sort {
        match self {
            Domain::Bool => Sort::Bool,
            Domain::IntRange(..) | Domain::IntSet(_) => Sort::Int,
        }
    }

    /// Membership of `t` in the domain; `true` for Booleans.
    pub fn constraint(&self, t: Term) -> Term {
        match self {
            Domain::Bool => bool_lit(true),
            Domain::IntRange(lo, hi) => and(vec![le(int(*lo), t.clone()), le(t, int(*hi))]),
            Domain::IntSet(values) => member(&t, values),
        }
    }
}

/// Declared variables in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    declarations: Vec<(String, Domain)>,
    index: BTreeMap<String, usize>,
}

impl Bounds {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declarations(&self) -> &[(String, Domain)] {
        &self.declarations
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.index.get(name).map(|&i| &self.declarations[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Domain assertions of the integer variables.
    pub fn constraints(&self) -> Vec<Term> {
        self.declarations
            .iter()
            .map(|(name, domain)| domain.constraint(var(name.as_str())))
            .filter(|t| !t.is_true())
            .collect()
    }

    /// `declare-const` for every variable followed by the domain assertions.
    pub fn commands(&self) -> Vec<Command> {
        let declare = self
            .declarations
            .iter()
            .map(|(name, domain)| Command::DeclareConst(name.clone(), domain.sort()));
        let assert = self.constraints().into_iter().map(Command::Assert);
        declare.chain(assert).collect()
    }

    fn insert(&mut self, name: String, domain: Domain) {
        if self.index.contains_key(&name) {
            return;
        }
        self.index.insert(name.clone(), self.declarations.len());
        self.declarations.push((name, domain));
    }
}

/// Collects the variables of executions, commit sets and the SC order.
#[derive(Debug)]
pub struct BoundsBuilder<'p> {
    program: &'p Program,
    bounds: Bounds,
}

impl<'p> BoundsBuilder<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            bounds: Bounds::default(),
        }
    }

    /// Relation variables of one execution.
    pub fn execution(mut self, exec: &Execution<'_>) -> Self {
        let p = self.program;
        let sync_positions = p.sync_actions().len() as i64;
        for action in p.actions() {
            let a = action.id;
            self.bounds.insert(exec.act_name(a), Domain::Bool);
            if action.kind.is_read() {
                for &x in p.candidate_writes(a) {
                    self.bounds.insert(exec.w_name(a, x), Domain::Bool);
                }
            }
            if action.kind.is_write() && action.fixed_value().is_none() {
                self.bounds
                    .insert(exec.v_name(a), Domain::IntSet(action.values.clone()));
            }
            if action.kind.is_access() && action.fixed_location().is_none() {
                let ids = action.locations.iter().map(|l| l.0 as i64).collect();
                self.bounds.insert(exec.loc_name(a), Domain::IntSet(ids));
            }
            if action.kind.is_monitor_op() && action.fixed_monitor().is_none() {
                let ids = action.monitors.iter().map(|m| m.0 as i64).collect();
                self.bounds.insert(exec.mon_name(a), Domain::IntSet(ids));
            }
            if action.kind.is_sync() {
                self.bounds
                    .insert(exec.so_name(a), Domain::IntRange(0, sync_positions - 1));
            }
        }
        for (a, b) in p.hb_upper().pairs().filter(|(a, b)| a != b) {
            self.bounds
                .insert(exec.hb_name(ActionId(a), ActionId(b)), Domain::Bool);
        }
        self
    }

    pub fn executions<'e, 'q: 'e>(self, execs: impl IntoIterator<Item = &'e Execution<'q>>) -> Self {
        execs.into_iter().fold(self, |b, e| b.execution(e))
    }

    /// Commit variables of rounds `1 ..= N-1`.
    pub fn commit_chain(mut self, commits: &CommitChain) -> Self {
        for round in 1..commits.rounds() {
            for a in self.program.ids() {
                self.bounds.insert(CommitChain::name(round, a), Domain::Bool);
            }
        }
        self
    }

    /// Positions of the sequentially consistent total order.
    pub fn sc_order(mut self) -> Self {
        let last = self.program.len() as i64 - 1;
        for a in self.program.ids() {
            self.bounds
                .insert(sequential::order_name(a), Domain::IntRange(0, last));
        }
        self
    }

    pub fn variable(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.bounds.insert(name.into(), domain);
        self
    }

    pub fn build(self) -> Bounds {
        self.bounds
    }
}
