//! The immutable program model consumed by the legality engine.
//!
//! A [`Program`] is a fixed set of actions split into threads, with program
//! order, thread ordering and per-read candidate writes precomputed. It is
//! produced by [`ProgramBuilder`], which stands in for the front end that
//! would extract these facts from real code.

use std::collections::BTreeSet;
use std::fmt;

use crate::action::{Action, ActionId, ActionKind, LocationId, MonitorId, ThreadId};
use crate::error::ProgramError;
use crate::graph::Relation;

/// A thread of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: ThreadId,
    pub name: String,
}

/// Actions, orders and candidate sets of one bounded program.
#[derive(Debug, Clone)]
pub struct Program {
    actions: Vec<Action>,
    threads: Vec<Thread>,
    po: Relation,
    ends_before: Relation,
    candidates: Vec<Vec<ActionId>>,
    sync: Vec<ActionId>,
    sw_candidates: Vec<(ActionId, ActionId)>,
    hb_upper: Relation,
    external_methods: BTreeSet<String>,
}

impl Program {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().map(|a| a.id)
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// The action with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this program's builder. Use
    /// [`Program::get`] or [`Program::check_action`] for ids of unknown
    /// origin; the driver validates every outcome and semantics id that way
    /// before building terms.
    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub fn kind(&self, id: ActionId) -> ActionKind {
        self.action(id).kind
    }

    /// Union of all actions of the given kinds.
    pub fn all_of(&self, kinds: &[ActionKind]) -> Vec<ActionId> {
        self.actions
            .iter()
            .filter(|a| kinds.contains(&a.kind))
            .map(|a| a.id)
            .collect()
    }

    pub fn reads(&self) -> Vec<ActionId> {
        self.all_of(&[ActionKind::NormalRead, ActionKind::VolatileRead])
    }

    pub fn writes(&self) -> Vec<ActionId> {
        self.all_of(&[ActionKind::NormalWrite, ActionKind::VolatileWrite])
    }

    pub fn actions_of(&self, thread: ThreadId) -> Vec<ActionId> {
        self.actions
            .iter()
            .filter(|a| a.thread == thread)
            .map(|a| a.id)
            .collect()
    }

    pub fn thread_of(&self, id: ActionId) -> ThreadId {
        self.action(id).thread
    }

    /// Whether every action of `t1` precedes every action of `t2`.
    pub fn ends_before(&self, t1: ThreadId, t2: ThreadId) -> bool {
        self.ends_before.contains(t1.0, t2.0)
    }

    /// Upper bound on the execution order: `a` may come before `b` in some execution.
    pub fn may_precede(&self, a: ActionId, b: ActionId) -> bool {
        a != b && !self.po(b, a) && !self.ends_before(self.thread_of(b), self.thread_of(a))
    }

    /// Program order (transitively closed, irreflexive).
    pub fn po(&self, a: ActionId, b: ActionId) -> bool {
        self.po.contains(a.0, b.0)
    }

    pub fn po_relation(&self) -> &Relation {
        &self.po
    }

    /// Writes the read could observe in some execution.
    pub fn candidate_writes(&self, read: ActionId) -> &[ActionId] {
        self.candidates.get(read.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_candidate(&self, read: ActionId, write: ActionId) -> bool {
        self.candidate_writes(read).contains(&write)
    }

    /// Synchronization actions, in id order.
    pub fn sync_actions(&self) -> &[ActionId] {
        &self.sync
    }

    /// Pairs that synchronize in some execution.
    pub fn sw_candidates(&self) -> &[(ActionId, ActionId)] {
        &self.sw_candidates
    }

    pub fn is_sw_candidate(&self, a: ActionId, b: ActionId) -> bool {
        self.sw_candidates.contains(&(a, b))
    }

    /// Whether `a` happens-before `b` in some execution.
    pub fn hb_possible(&self, a: ActionId, b: ActionId) -> bool {
        self.hb_upper.contains(a.0, b.0)
    }

    pub fn hb_upper(&self) -> &Relation {
        &self.hb_upper
    }

    pub fn is_external_method(&self, method: &str) -> bool {
        self.external_methods.contains(method)
    }

    /// Check that `id` names an action of this program.
    pub fn check_action(&self, id: ActionId) -> Result<&Action, ProgramError> {
        self.get(id).ok_or(ProgramError::UnknownAction(id))
    }

    pub fn check_read(&self, id: ActionId) -> Result<&Action, ProgramError> {
        let action = self.check_action(id)?;
        if action.kind.is_read() {
            Ok(action)
        } else {
            Err(ProgramError::NotARead(id))
        }
    }

    pub fn check_write(&self, id: ActionId) -> Result<&Action, ProgramError> {
        let action = self.check_action(id)?;
        if action.kind.is_write() {
            Ok(action)
        } else {
            Err(ProgramError::NotAWrite(id))
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for thread in &self.threads {
            writeln!(f, "{} ({}):", thread.id, thread.name)?;
            for id in self.actions_of(thread.id) {
                writeln!(f, "  {}", self.action(id))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ThreadDraft {
    name: String,
    tail: Option<ActionId>,
}

/// Incremental construction of a [`Program`].
///
/// Actions are appended to a thread in program order. Contract violations
/// are collected and reported by [`ProgramBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    threads: Vec<ThreadDraft>,
    actions: Vec<Action>,
    po_edges: Vec<(ActionId, ActionId)>,
    thread_edges: Vec<(ThreadId, ThreadId)>,
    init_thread: Option<ThreadId>,
    external_methods: BTreeSet<String>,
    errors: Vec<ProgramError>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Method names whose calls are external actions.
    pub fn with_external_methods<S: Into<String>>(
        mut self,
        methods: impl IntoIterator<Item = S>,
    ) -> Self {
        self.external_methods
            .extend(methods.into_iter().map(Into::into));
        self
    }

    pub fn thread(&mut self, name: impl Into<String>) -> ThreadId {
        self.threads.push(ThreadDraft {
            name: name.into(),
            tail: None,
        });
        ThreadId(self.threads.len() - 1)
    }

    /// Declare that `first` finishes before `second` starts.
    pub fn ends_before(&mut self, first: ThreadId, second: ThreadId) -> &mut Self {
        self.check_thread(first);
        self.check_thread(second);
        self.thread_edges.push((first, second));
        self
    }

    /// A write of the initial value, performed by a thread that ends before
    /// every other thread.
    pub fn initial_write(&mut self, location: LocationId, value: i64, volatile: bool) -> ActionId {
        let init = match self.init_thread {
            Some(t) => t,
            None => {
                let t = self.thread("init");
                self.init_thread = Some(t);
                t
            }
        };
        let kind = if volatile {
            ActionKind::VolatileWrite
        } else {
            ActionKind::NormalWrite
        };
        let id = self.append(init, kind);
        let action = &mut self.actions[id.0];
        action.locations = vec![location];
        action.values = vec![value];
        id
    }

    pub fn read(
        &mut self,
        thread: ThreadId,
        locations: impl IntoIterator<Item = LocationId>,
    ) -> ActionId {
        self.access(thread, ActionKind::NormalRead, locations, [])
    }

    pub fn volatile_read(
        &mut self,
        thread: ThreadId,
        locations: impl IntoIterator<Item = LocationId>,
    ) -> ActionId {
        self.access(thread, ActionKind::VolatileRead, locations, [])
    }

    pub fn write(
        &mut self,
        thread: ThreadId,
        locations: impl IntoIterator<Item = LocationId>,
        values: impl IntoIterator<Item = i64>,
    ) -> ActionId {
        self.access(thread, ActionKind::NormalWrite, locations, values)
    }

    pub fn volatile_write(
        &mut self,
        thread: ThreadId,
        locations: impl IntoIterator<Item = LocationId>,
        values: impl IntoIterator<Item = i64>,
    ) -> ActionId {
        self.access(thread, ActionKind::VolatileWrite, locations, values)
    }

    pub fn lock(
        &mut self,
        thread: ThreadId,
        monitors: impl IntoIterator<Item = MonitorId>,
    ) -> ActionId {
        self.monitor_op(thread, ActionKind::Lock, monitors)
    }

    pub fn unlock(
        &mut self,
        thread: ThreadId,
        monitors: impl IntoIterator<Item = MonitorId>,
    ) -> ActionId {
        self.monitor_op(thread, ActionKind::Unlock, monitors)
    }

    pub fn start(&mut self, thread: ThreadId) -> ActionId {
        self.append(thread, ActionKind::ThreadStart)
    }

    pub fn end(&mut self, thread: ThreadId) -> ActionId {
        self.append(thread, ActionKind::ThreadEnd)
    }

    /// A call to `method`; an action only if the method is external.
    pub fn call(&mut self, thread: ThreadId, method: &str) -> Option<ActionId> {
        if !self.external_methods.contains(method) {
            return None;
        }
        let id = self.append(thread, ActionKind::External);
        self.actions[id.0].method = Some(method.to_string());
        Some(id)
    }

    /// Continue `thread` after `action` instead of after its latest action.
    pub fn branch_from(&mut self, thread: ThreadId, action: ActionId) -> &mut Self {
        if action.0 >= self.actions.len() {
            self.errors.push(ProgramError::UnknownAction(action));
        } else if let Some(draft) = self.threads.get_mut(thread.0) {
            draft.tail = Some(action);
        } else {
            self.errors.push(ProgramError::UnknownThread(thread));
        }
        self
    }

    /// An extra program-order edge, e.g. where two branches join.
    pub fn po_edge(&mut self, from: ActionId, to: ActionId) -> &mut Self {
        self.po_edges.push((from, to));
        self
    }

    /// Attach a display label to an action.
    pub fn label(&mut self, action: ActionId, label: impl Into<String>) -> &mut Self {
        match self.actions.get_mut(action.0) {
            Some(a) => a.label = Some(label.into()),
            None => self.errors.push(ProgramError::UnknownAction(action)),
        }
        self
    }

    fn check_thread(&mut self, thread: ThreadId) -> bool {
        let ok = thread.0 < self.threads.len();
        if !ok {
            self.errors.push(ProgramError::UnknownThread(thread));
        }
        ok
    }

    fn append(&mut self, thread: ThreadId, kind: ActionKind) -> ActionId {
        let id = ActionId(self.actions.len());
        self.actions.push(Action::new(id, kind, thread));
        if self.check_thread(thread) {
            let draft = &mut self.threads[thread.0];
            if let Some(prev) = draft.tail {
                self.po_edges.push((prev, id));
            }
            draft.tail = Some(id);
        }
        id
    }

    fn access(
        &mut self,
        thread: ThreadId,
        kind: ActionKind,
        locations: impl IntoIterator<Item = LocationId>,
        values: impl IntoIterator<Item = i64>,
    ) -> ActionId {
        let id = self.append(thread, kind);
        let action = &mut self.actions[id.0];
        action.locations = dedup(locations);
        action.values = dedup(values);
        id
    }

    fn monitor_op(
        &mut self,
        thread: ThreadId,
        kind: ActionKind,
        monitors: impl IntoIterator<Item = MonitorId>,
    ) -> ActionId {
        let id = self.append(thread, kind);
        self.actions[id.0].monitors = dedup(monitors);
        id
    }

    /// Bracket the other threads with start actions and the initialising
    /// thread with an end action, so the initial writes happen-before
    /// everything else.
    fn close_init_thread(&mut self) {
        let Some(init) = self.init_thread else {
            return;
        };
        self.end(init);
        for t in 0..self.threads.len() {
            let thread = ThreadId(t);
            if thread == init {
                continue;
            }
            let roots: Vec<ActionId> = self
                .actions
                .iter()
                .filter(|a| a.thread == thread)
                .filter(|a| !self.po_edges.iter().any(|(_, to)| *to == a.id))
                .map(|a| a.id)
                .collect();
            let has_start = matches!(roots.as_slice(), [r] if self.actions[r.0].kind == ActionKind::ThreadStart);
            if !has_start {
                let start = ActionId(self.actions.len());
                self.actions
                    .push(Action::new(start, ActionKind::ThreadStart, thread));
                self.po_edges
                    .extend(roots.into_iter().map(|root| (start, root)));
            }
            self.thread_edges.push((init, thread));
        }
    }

    /// Validate and freeze the program.
    pub fn build(mut self) -> Result<Program, ProgramError> {
        if let Some(err) = self.errors.first() {
            return Err(err.clone());
        }
        self.close_init_thread();

        let n = self.actions.len();
        for action in &self.actions {
            check_domains(action)?;
        }

        for &(from, to) in &self.po_edges {
            let (Some(a), Some(b)) = (self.actions.get(from.0), self.actions.get(to.0)) else {
                let bad = if from.0 >= n { from } else { to };
                return Err(ProgramError::UnknownAction(bad));
            };
            if a.thread != b.thread {
                return Err(ProgramError::CrossThreadOrder(from, to));
            }
        }
        let po = Relation::from_edges(n, self.po_edges.iter().map(|(a, b)| (a.0, b.0)))
            .transitive_closure();
        if let Some(a) = (0..n).find(|&a| po.contains(a, a)) {
            return Err(ProgramError::CyclicProgramOrder(ActionId(a)));
        }

        let ends_before = Relation::from_edges(
            self.threads.len(),
            self.thread_edges.iter().map(|(a, b)| (a.0, b.0)),
        )
        .transitive_closure();
        if let Some(t) = (0..self.threads.len()).find(|&t| ends_before.contains(t, t)) {
            return Err(ProgramError::ThreadOrderCycle(ThreadId(t)));
        }

        check_volatility(&self.actions)?;

        let threads = self
            .threads
            .into_iter()
            .enumerate()
            .map(|(i, d)| Thread {
                id: ThreadId(i),
                name: d.name,
            })
            .collect();

        let mut program = Program {
            actions: self.actions,
            threads,
            po,
            ends_before,
            candidates: vec![Vec::new(); n],
            sync: Vec::new(),
            sw_candidates: Vec::new(),
            hb_upper: Relation::new(n),
            external_methods: self.external_methods,
        };
        program.candidates = compute_candidates(&program)?;
        program.sync = program
            .actions
            .iter()
            .filter(|a| a.kind.is_sync())
            .map(|a| a.id)
            .collect();
        program.sw_candidates = compute_sw_candidates(&program);
        let sw = Relation::from_edges(n, program.sw_candidates.iter().map(|(a, b)| (a.0, b.0)));
        program.hb_upper = program.po.union(&sw).transitive_closure();

        tracing::debug!(
            actions = n,
            threads = program.threads.len(),
            sync = program.sync.len(),
            sw_candidates = program.sw_candidates.len(),
            "program built"
        );
        Ok(program)
    }
}

fn dedup<T: Ord>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    items
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_domains(action: &Action) -> Result<(), ProgramError> {
    if action.kind.is_access() && action.locations.is_empty() {
        return Err(ProgramError::MissingLocation(action.id));
    }
    if action.kind.is_write() && action.values.is_empty() {
        return Err(ProgramError::MissingValues(action.id));
    }
    if action.kind.is_monitor_op() && action.monitors.is_empty() {
        return Err(ProgramError::MissingMonitor(action.id));
    }
    Ok(())
}

fn check_volatility(actions: &[Action]) -> Result<(), ProgramError> {
    let mut volatile = BTreeSet::new();
    let mut normal = BTreeSet::new();
    for action in actions.iter().filter(|a| a.kind.is_access()) {
        let set = if action.kind.is_volatile() {
            &mut volatile
        } else {
            &mut normal
        };
        set.extend(action.locations.iter().copied());
    }
    match volatile.intersection(&normal).next() {
        Some(loc) => Err(ProgramError::MixedVolatility(*loc)),
        None => Ok(()),
    }
}

fn compute_candidates(program: &Program) -> Result<Vec<Vec<ActionId>>, ProgramError> {
    let mut out = vec![Vec::new(); program.len()];
    for read in program.actions.iter().filter(|a| a.kind.is_read()) {
        let cands: Vec<ActionId> = program
            .actions
            .iter()
            .filter(|w| w.kind.is_write())
            .filter(|w| w.kind.is_volatile() == read.kind.is_volatile())
            .filter(|w| w.may_alias(read))
            .filter(|w| program.may_precede(w.id, read.id))
            .map(|w| w.id)
            .collect();
        if cands.is_empty() {
            return Err(ProgramError::EmptyCandidates(read.id));
        }
        out[read.id.0] = cands;
    }
    Ok(out)
}

fn compute_sw_candidates(program: &Program) -> Vec<(ActionId, ActionId)> {
    let mut out = Vec::new();
    for a in &program.actions {
        for b in &program.actions {
            if !program.may_precede(a.id, b.id) {
                continue;
            }
            let pairs = match (a.kind, b.kind) {
                (ActionKind::Unlock, ActionKind::Lock) => a.may_share_monitor(b),
                (ActionKind::VolatileWrite, ActionKind::VolatileRead) => {
                    program.is_candidate(b.id, a.id)
                }
                (ActionKind::ThreadEnd, ActionKind::ThreadStart) => {
                    program.ends_before(a.thread, b.thread)
                }
                _ => false,
            };
            if pairs {
                out.push((a.id, b.id));
            }
        }
    }
    out
}
