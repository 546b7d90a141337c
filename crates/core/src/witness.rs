//! Decoding a satisfying assignment back into executions and commit sets.

use std::collections::BTreeMap;
use std::fmt;

use jmmcheck_smtlib::Term;
use jmmcheck_solver::Model;
use serde::Serialize;

use crate::action::{ActionId, LocationId, MonitorId};
use crate::error::JustifyError;
use crate::execution::Execution;
use crate::justify::JustificationView;
use crate::memory_model::ModelKind;
use crate::sequential;

/// One execution as chosen by the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionWitness {
    /// Actions that take place, in id order.
    pub occurs: Vec<ActionId>,
    /// Read to the write it sees.
    pub write_seen: BTreeMap<ActionId, ActionId>,
    /// Value of every occurring write.
    pub values: BTreeMap<ActionId, i64>,
    /// Value returned by every occurring read.
    pub read_values: BTreeMap<ActionId, i64>,
    /// Occurring synchronization actions in synchronization order.
    pub sync_order: Vec<ActionId>,
    pub locations: BTreeMap<ActionId, LocationId>,
    pub monitors: BTreeMap<ActionId, MonitorId>,
}

impl ExecutionWitness {
    pub fn decode(model: &Model, exec: &Execution<'_>) -> Result<Self, JustifyError> {
        let p = exec.program();
        let mut out = ExecutionWitness::default();
        for action in p.actions() {
            let a = action.id;
            if !eval_bool(model, &exec.act(a)) {
                continue;
            }
            out.occurs.push(a);
            if action.kind.is_write() {
                out.values.insert(a, eval_int(model, &exec.v(a))?);
            }
            if action.kind.is_access() {
                let loc = eval_int(model, &exec.loc(a))?;
                out.locations.insert(a, LocationId(to_index(loc)?));
            }
            if action.kind.is_monitor_op() {
                let mon = eval_int(model, &exec.mon(a))?;
                out.monitors.insert(a, MonitorId(to_index(mon)?));
            }
        }
        for r in p.reads() {
            let seen = p
                .candidate_writes(r)
                .iter()
                .copied()
                .find(|&x| eval_bool(model, &exec.w(r, x)));
            if let Some(x) = seen {
                out.write_seen.insert(r, x);
                let value = match out.values.get(&x) {
                    Some(&v) => v,
                    None => eval_int(model, &exec.v(x))?,
                };
                out.read_values.insert(r, value);
            }
        }
        let mut sync = Vec::new();
        for &a in p.sync_actions() {
            if out.occurs.contains(&a) {
                sync.push((eval_int(model, &exec.so(a))?, a));
            }
        }
        sync.sort();
        out.sync_order = sync.into_iter().map(|(_, a)| a).collect();
        Ok(out)
    }

    pub fn occurs(&self, a: ActionId) -> bool {
        self.occurs.binary_search(&a).is_ok()
    }
}

/// Why the main execution is legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Justification {
    /// An interleaving that explains every read.
    SequentiallyConsistent { order: Vec<ActionId> },
    /// Commit sets `C_0 .. C_{N-1}` and speculative executions `E_1 .. E_{N-1}`.
    CommitChain {
        commits: Vec<Vec<ActionId>>,
        speculative: Vec<ExecutionWitness>,
    },
}

/// A legal execution exhibiting the outcome, with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Witness {
    pub model: ModelKind,
    pub rounds: usize,
    pub main: ExecutionWitness,
    pub justification: Justification,
}

impl Witness {
    pub fn decode(
        model: &Model,
        view: &JustificationView<'_>,
        kind: ModelKind,
    ) -> Result<Self, JustifyError> {
        let main = ExecutionWitness::decode(model, view.main())?;
        let via_sc = match view.commits() {
            None => true,
            Some(_) if view.has_sc_selector() => model.get_bool(sequential::SC_PATH).unwrap_or(false),
            Some(_) => false,
        };
        let justification = match view.commits() {
            Some(commits) if !via_sc => {
                let program = view.main().program();
                let mut sets = vec![Vec::new()];
                for round in 1..commits.rounds() {
                    sets.push(
                        program
                            .ids()
                            .filter(|&a| eval_bool(model, &commits.contains(round, a)))
                            .collect(),
                    );
                }
                let speculative = view
                    .speculative()
                    .iter()
                    .map(|e| ExecutionWitness::decode(model, e))
                    .collect::<Result<_, _>>()?;
                Justification::CommitChain {
                    commits: sets,
                    speculative,
                }
            }
            _ => {
                let mut order = Vec::with_capacity(main.occurs.len());
                for &a in &main.occurs {
                    order.push((eval_int(model, &sequential::order(a))?, a));
                }
                order.sort();
                Justification::SequentiallyConsistent {
                    order: order.into_iter().map(|(_, a)| a).collect(),
                }
            }
        };
        Ok(Witness {
            model: kind,
            rounds: view.rounds(),
            main,
            justification,
        })
    }

    pub fn is_sequentially_consistent(&self) -> bool {
        matches!(self.justification, Justification::SequentiallyConsistent { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks the model-independent shape of a commit-chain justification.
    ///
    /// `C_0` is empty, the sets grow monotonically, the last one is exactly
    /// the main execution, every committed action occurs in its round and
    /// committed writes keep their final values. Sequentially consistent
    /// justifications have no chain and always pass.
    pub fn check_commit_chain(&self) -> Result<(), JustifyError> {
        let Justification::CommitChain {
            commits,
            speculative,
        } = &self.justification
        else {
            return Ok(());
        };
        let fail = |msg: String| Err(JustifyError::MalformedWitness(msg));
        if commits.len() != self.rounds || speculative.len() + 1 != self.rounds {
            return fail(format!(
                "{} commit sets and {} speculative executions for {} rounds",
                commits.len(),
                speculative.len(),
                self.rounds
            ));
        }
        if commits.first().is_some_and(|c| !c.is_empty()) {
            return fail("C_0 is not empty".to_string());
        }
        for (i, pair) in commits.windows(2).enumerate() {
            if let Some(a) = pair[0].iter().find(|a| !pair[1].contains(a)) {
                return fail(format!("{a} is in C_{i} but not in C_{}", i + 1));
            }
        }
        if commits.last() != Some(&self.main.occurs) {
            return fail("the last commit set is not the main execution".to_string());
        }
        for (i, exec) in speculative.iter().enumerate() {
            let round = i + 1;
            for a in &commits[round] {
                if !exec.occurs(*a) {
                    return fail(format!("{a} is committed in round {round} but does not occur"));
                }
                if let Some(v) = self.main.values.get(a)
                    && exec.values.get(a) != Some(v)
                {
                    return fail(format!("{a} writes a different value in round {round}"));
                }
            }
            for r in &commits[round - 1] {
                if let Some(w) = self.main.write_seen.get(r)
                    && exec.write_seen.get(r) != Some(w)
                {
                    return fail(format!("{r} sees a different write in round {round}"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ExecutionWitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occurs: Vec<String> = self.occurs.iter().map(ToString::to_string).collect();
        writeln!(f, "  occurs: {}", occurs.join(" "))?;
        for (r, w) in &self.write_seen {
            let v = self.read_values.get(r).copied().unwrap_or_default();
            writeln!(f, "  {r} sees {w} (value {v})")?;
        }
        if !self.sync_order.is_empty() {
            let so: Vec<String> = self.sync_order.iter().map(ToString::to_string).collect();
            writeln!(f, "  so: {}", so.join(" < "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "legal under the {} model ({} rounds)", self.model, self.rounds)?;
        writeln!(f, "main execution:")?;
        write!(f, "{}", self.main)?;
        match &self.justification {
            Justification::SequentiallyConsistent { order } => {
                let order: Vec<String> = order.iter().map(ToString::to_string).collect();
                writeln!(f, "sequentially consistent: {}", order.join(" "))
            }
            Justification::CommitChain {
                commits,
                speculative,
            } => {
                for (i, exec) in speculative.iter().enumerate() {
                    let committed: Vec<String> =
                        commits[i + 1].iter().map(ToString::to_string).collect();
                    writeln!(f, "round {}: C = {{{}}}", i + 1, committed.join(", "))?;
                    write!(f, "{exec}")?;
                }
                Ok(())
            }
        }
    }
}

fn eval_bool(model: &Model, term: &Term) -> bool {
    match term {
        Term::BoolLit(b) => *b,
        Term::Const(name) => model.get_bool(name).unwrap_or(false),
        _ => false,
    }
}

fn eval_int(model: &Model, term: &Term) -> Result<i64, JustifyError> {
    match term {
        Term::IntLit(n) => Ok(*n),
        Term::Const(name) => model
            .get_int(name)
            .ok_or_else(|| JustifyError::MalformedWitness(format!("no value for `{name}`"))),
        other => Err(JustifyError::MalformedWitness(format!("cannot evaluate `{other}`"))),
    }
}

fn to_index(n: i64) -> Result<usize, JustifyError> {
    usize::try_from(n).map_err(|_| JustifyError::MalformedWitness(format!("negative id {n}")))
}
