//! Building and deciding the legality problem of an outcome.
//!
//! The driver assembles one formula out of the main execution's
//! well-formedness, the outcome, and either a sequentially consistent
//! explanation or a commit chain `C_0 ⊆ … ⊆ C_{N-1}` with speculative
//! executions `E_1 .. E_{N-1}` constrained by the selected memory model.
//! Solving is delegated to a [`SolverBackend`].

use jmmcheck_smtlib::builder::{and, bool_lit, iff, implies, not, or, var};
use jmmcheck_smtlib::{Command, Script, Term};
use jmmcheck_solver::{SolverBackend, SolverResult};

use crate::action::ActionId;
use crate::bounds::{Bounds, BoundsBuilder, Domain};
use crate::config::JustificationConfig;
use crate::error::JustifyError;
use crate::execution::{Conjunct, Execution};
use crate::memory_model::RoundContext;
use crate::outcome::Outcome;
use crate::program::Program;
use crate::semantics::SequentialSemantics;
use crate::sequential;
use crate::witness::Witness;

/// Boolean variables `c{i}_{a}` for `a ∈ C_i`.
///
/// `C_0` is always empty and is represented by the literal `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitChain {
    rounds: usize,
}

impl CommitChain {
    /// A chain `C_0 .. C_{rounds-1}`.
    pub fn new(rounds: usize) -> Self {
        Self { rounds }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn name(round: usize, a: ActionId) -> String {
        format!("c{round}_{}", a.0)
    }

    /// `a ∈ C_round`.
    pub fn contains(&self, round: usize, a: ActionId) -> Term {
        if round == 0 {
            bool_lit(false)
        } else {
            var(Self::name(round, a))
        }
    }

    /// Monotone growth, ending in exactly the actions of `main`.
    pub fn shape(&self, main: &Execution<'_>) -> Term {
        let p = main.program();
        let last = self.rounds - 1;
        let mut parts = Vec::new();
        for round in 2..=last {
            for a in p.ids() {
                parts.push(implies(self.contains(round - 1, a), self.contains(round, a)));
            }
        }
        for a in p.ids() {
            parts.push(iff(self.contains(last, a), main.act(a)));
        }
        and(parts)
    }
}

/// The executions and commit sets a legality problem is stated over.
#[derive(Debug, Clone)]
pub struct JustificationView<'p> {
    main: Execution<'p>,
    speculative: Vec<Execution<'p>>,
    commits: Option<CommitChain>,
    sc_selector: bool,
}

impl<'p> JustificationView<'p> {
    pub fn main(&self) -> &Execution<'p> {
        &self.main
    }

    /// `E_1 .. E_{N-1}`; empty when only sequential consistency is checked.
    pub fn speculative(&self) -> &[Execution<'p>] {
        &self.speculative
    }

    pub fn commits(&self) -> Option<&CommitChain> {
        self.commits.as_ref()
    }

    /// Number of commit sets, `1` when only sequential consistency is checked.
    pub fn rounds(&self) -> usize {
        self.commits.map_or(1, |c| c.rounds())
    }

    /// Whether [`sequential::SC_PATH`] chooses between the two explanations.
    pub fn has_sc_selector(&self) -> bool {
        self.sc_selector
    }

    /// `a ∈ C_round`, for pinning a justification with
    /// [`LegalityProblem::assume`].
    pub fn committed(&self, round: usize, a: ActionId) -> Option<Term> {
        let commits = self.commits?;
        (round < commits.rounds()).then(|| commits.contains(round, a))
    }
}

/// Outcome of a legality check.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Some justification with at most `N` commit sets exists.
    Legal(Box<Witness>),
    /// No justification with at most `N` commit sets exists.
    ///
    /// The outcome may still be legal with more rounds; the round count is
    /// never increased automatically.
    Illegal,
}

impl Verdict {
    pub fn is_legal(&self) -> bool {
        matches!(self, Verdict::Legal(_))
    }

    pub fn witness(&self) -> Option<&Witness> {
        match self {
            Verdict::Legal(w) => Some(w),
            Verdict::Illegal => None,
        }
    }
}

/// A fully built legality formula with its variable domains.
#[derive(Debug, Clone)]
pub struct LegalityProblem<'p> {
    conjuncts: Vec<Conjunct>,
    assumptions: Vec<Term>,
    bounds: Bounds,
    view: JustificationView<'p>,
    config: JustificationConfig,
}

impl<'p> LegalityProblem<'p> {
    /// Conjunction of every conjunct and assumption.
    pub fn formula(&self) -> Term {
        and(self
            .conjuncts
            .iter()
            .map(|(_, t)| t.clone())
            .chain(self.assumptions.iter().cloned()))
    }

    pub fn conjuncts(&self) -> &[Conjunct] {
        &self.conjuncts
    }

    pub fn assumptions(&self) -> &[Term] {
        &self.assumptions
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn view(&self) -> &JustificationView<'p> {
        &self.view
    }

    pub fn config(&self) -> &JustificationConfig {
        &self.config
    }

    /// Add a constraint, e.g. to pin a particular justification.
    pub fn assume(&mut self, term: Term) -> &mut Self {
        self.assumptions.push(term);
        self
    }

    /// The problem as an SMT-LIB script ending in `check-sat` and `get-model`.
    pub fn to_script(&self) -> Script {
        let mut script = Script::new();
        script.push(Command::SetOption("produce-models".into(), "true".into()));
        script.push(Command::SetLogic(self.config.logic.clone()));
        script.extend(self.bounds.commands());
        for (label, term) in &self.conjuncts {
            if term.is_true() {
                continue;
            }
            script.push(Command::Comment(label.clone()));
            script.push(Command::Assert(term.clone()));
        }
        for term in &self.assumptions {
            script.push(Command::Comment("assumption".into()));
            script.push(Command::Assert(term.clone()));
        }
        script.push(Command::CheckSat);
        script.push(Command::GetModel);
        script
    }

    /// Decide the problem with `backend`.
    pub fn check(&self, backend: &dyn SolverBackend) -> Result<Verdict, JustifyError> {
        let script = self.to_script();
        tracing::debug!(
            commands = script.len(),
            assertions = script.assertion_count(),
            "checking legality"
        );
        match backend.check_sat(&script)? {
            SolverResult::Sat(Some(model)) => {
                let witness = Witness::decode(&model, &self.view, self.config.model)?;
                tracing::info!(
                    model = %self.config.model,
                    rounds = self.config.rounds,
                    sequentially_consistent = witness.is_sequentially_consistent(),
                    "outcome is legal"
                );
                Ok(Verdict::Legal(Box::new(witness)))
            }
            SolverResult::Sat(None) => Err(JustifyError::MissingModel),
            SolverResult::Unsat => {
                tracing::info!(
                    model = %self.config.model,
                    rounds = self.config.rounds,
                    "outcome is illegal"
                );
                Ok(Verdict::Illegal)
            }
            SolverResult::Unknown(reason) => {
                tracing::warn!(%reason, "solver was inconclusive");
                Err(JustifyError::Inconclusive(reason))
            }
        }
    }
}

/// Builds legality problems for one program.
pub struct JustificationDriver<'p, 's> {
    program: &'p Program,
    semantics: &'s dyn SequentialSemantics,
    config: JustificationConfig,
}

impl<'p, 's> JustificationDriver<'p, 's> {
    pub fn new(
        program: &'p Program,
        semantics: &'s dyn SequentialSemantics,
        config: JustificationConfig,
    ) -> Self {
        Self {
            program,
            semantics,
            config,
        }
    }

    pub fn config(&self) -> &JustificationConfig {
        &self.config
    }

    /// Encode the legality of `outcome`.
    pub fn build(&self, outcome: &Outcome) -> Result<LegalityProblem<'p>, JustifyError> {
        self.config.validate()?;
        self.semantics.validate(self.program)?;

        let program = self.program;
        let config = &self.config;
        let main = Execution::main(program);

        let mut conjuncts = main.well_formedness(self.semantics);
        conjuncts.push((format!("outcome: {outcome}"), outcome.to_term(&main)?));

        let commits = config.uses_chain().then(|| CommitChain::new(config.rounds));
        let speculative: Vec<Execution<'p>> = match commits {
            Some(_) => (1..config.rounds)
                .map(|i| Execution::speculative(program, i))
                .collect(),
            None => Vec::new(),
        };

        let mut chain = Vec::new();
        if let Some(commits) = &commits {
            for exec in &speculative {
                chain.extend(exec.well_formedness(self.semantics));
            }
            chain.push(("commit chain".to_string(), commits.shape(&main)));
            let model = config.model.model();
            for round in 1..config.rounds {
                let ctx = RoundContext {
                    program,
                    main: &main,
                    speculative: &speculative,
                    commits,
                    round,
                };
                let rules = model.round_rules(&ctx);
                tracing::debug!(round, rules = rules.len(), "round constrained");
                chain.extend(rules);
            }
        }

        let sc_selector = config.uses_sc() && config.uses_chain();
        if config.uses_sc() {
            let sc = sequential::sequentially_consistent(&main);
            if sc_selector {
                let selector = var(sequential::SC_PATH);
                let chain_formula = and(chain.into_iter().map(|(_, t)| t));
                conjuncts.push((
                    "sequentially consistent or justified by a commit chain".to_string(),
                    or(vec![
                        and(vec![selector.clone(), sc]),
                        and(vec![not(selector), chain_formula]),
                    ]),
                ));
            } else {
                conjuncts.push(("sequentially consistent".to_string(), sc));
            }
        } else {
            conjuncts.extend(chain);
        }

        let mut bounds = BoundsBuilder::new(program)
            .execution(&main)
            .executions(&speculative);
        if let Some(commits) = &commits {
            bounds = bounds.commit_chain(commits);
        }
        if config.uses_sc() {
            bounds = bounds.sc_order();
        }
        if sc_selector {
            bounds = bounds.variable(sequential::SC_PATH, Domain::Bool);
        }
        let bounds = bounds.build();

        tracing::info!(
            model = %config.model,
            rounds = config.rounds,
            actions = program.len(),
            conjuncts = conjuncts.len(),
            terms = conjuncts.iter().map(|(_, t)| t.size()).sum::<usize>(),
            variables = bounds.len(),
            "legality problem built"
        );

        Ok(LegalityProblem {
            conjuncts,
            assumptions: Vec::new(),
            bounds,
            view: JustificationView {
                main,
                speculative,
                commits,
                sc_selector,
            },
            config: config.clone(),
        })
    }

    /// Build and decide in one step.
    pub fn check(
        &self,
        outcome: &Outcome,
        backend: &dyn SolverBackend,
    ) -> Result<Verdict, JustifyError> {
        self.build(outcome)?.check(backend)
    }
}
