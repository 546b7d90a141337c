//! Memory-relevant events and their identities.

use std::fmt;

use serde::Serialize;

/// Index of an action in its program's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ActionId(pub usize);

/// Index of a thread in its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ThreadId(pub usize);

/// An abstract memory location (a field or array cell class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LocationId(pub usize);

/// An abstract monitor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonitorId(pub usize);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// What an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    NormalRead,
    VolatileRead,
    NormalWrite,
    VolatileWrite,
    Lock,
    Unlock,
    ThreadStart,
    ThreadEnd,
    /// A call observable outside the program (I/O and the like).
    External,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::NormalRead,
        ActionKind::VolatileRead,
        ActionKind::NormalWrite,
        ActionKind::VolatileWrite,
        ActionKind::Lock,
        ActionKind::Unlock,
        ActionKind::ThreadStart,
        ActionKind::ThreadEnd,
        ActionKind::External,
    ];

    pub fn is_read(self) -> bool {
        matches!(self, ActionKind::NormalRead | ActionKind::VolatileRead)
    }

    pub fn is_write(self) -> bool {
        matches!(self, ActionKind::NormalWrite | ActionKind::VolatileWrite)
    }

    pub fn is_access(self) -> bool {
        self.is_read() || self.is_write()
    }

    pub fn is_volatile(self) -> bool {
        matches!(self, ActionKind::VolatileRead | ActionKind::VolatileWrite)
    }

    pub fn is_monitor_op(self) -> bool {
        matches!(self, ActionKind::Lock | ActionKind::Unlock)
    }

    /// Synchronization actions are totally ordered by `so`.
    pub fn is_sync(self) -> bool {
        matches!(
            self,
            ActionKind::VolatileRead
                | ActionKind::VolatileWrite
                | ActionKind::Lock
                | ActionKind::Unlock
                | ActionKind::ThreadStart
                | ActionKind::ThreadEnd
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::NormalRead => "read",
            ActionKind::VolatileRead => "volatile read",
            ActionKind::NormalWrite => "write",
            ActionKind::VolatileWrite => "volatile write",
            ActionKind::Lock => "lock",
            ActionKind::Unlock => "unlock",
            ActionKind::ThreadStart => "start",
            ActionKind::ThreadEnd => "end",
            ActionKind::External => "external",
        };
        write!(f, "{s}")
    }
}

/// One memory-visible event of a program. Immutable once the program is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    pub thread: ThreadId,
    /// Locations the access may touch; resolved per execution.
    pub locations: Vec<LocationId>,
    /// Values a write may produce.
    pub values: Vec<i64>,
    /// Monitors a lock or unlock may operate on.
    pub monitors: Vec<MonitorId>,
    pub label: Option<String>,
    /// Called method of an external action.
    pub method: Option<String>,
}

impl Action {
    pub(crate) fn new(id: ActionId, kind: ActionKind, thread: ThreadId) -> Self {
        Self {
            id,
            kind,
            thread,
            locations: Vec::new(),
            values: Vec::new(),
            monitors: Vec::new(),
            label: None,
            method: None,
        }
    }

    /// The single location of the access, if its domain is a singleton.
    pub fn fixed_location(&self) -> Option<LocationId> {
        match self.locations.as_slice() {
            [l] => Some(*l),
            _ => None,
        }
    }

    pub fn fixed_monitor(&self) -> Option<MonitorId> {
        match self.monitors.as_slice() {
            [m] => Some(*m),
            _ => None,
        }
    }

    pub fn fixed_value(&self) -> Option<i64> {
        match self.values.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Whether the two accesses may touch a common location.
    pub fn may_alias(&self, other: &Action) -> bool {
        self.locations.iter().any(|l| other.locations.contains(l))
    }

    pub fn may_share_monitor(&self, other: &Action) -> bool {
        self.monitors.iter().any(|m| other.monitors.contains(m))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.kind)?;
        if let Some(label) = &self.label {
            write!(f, " `{label}`")?;
        }
        if let Some(method) = &self.method {
            write!(f, " {method}()")?;
        }
        write!(f, " in {}", self.thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_actions() {
        let sync: Vec<_> = ActionKind::ALL.iter().filter(|k| k.is_sync()).collect();
        assert_eq!(sync.len(), 6);
        assert!(!ActionKind::NormalWrite.is_sync());
        assert!(!ActionKind::External.is_sync());
    }

    #[test]
    fn kind_predicates() {
        assert!(ActionKind::VolatileRead.is_read());
        assert!(ActionKind::VolatileRead.is_volatile());
        assert!(ActionKind::NormalWrite.is_access());
        assert!(ActionKind::Unlock.is_monitor_op());
        assert!(!ActionKind::ThreadEnd.is_access());
    }

    #[test]
    fn aliasing() {
        let mut a = Action::new(ActionId(0), ActionKind::NormalRead, ThreadId(0));
        let mut b = Action::new(ActionId(1), ActionKind::NormalWrite, ThreadId(1));
        a.locations = vec![LocationId(0), LocationId(1)];
        b.locations = vec![LocationId(1)];
        assert!(a.may_alias(&b));
        assert_eq!(a.fixed_location(), None);
        assert_eq!(b.fixed_location(), Some(LocationId(1)));
        b.locations = vec![LocationId(2)];
        assert!(!a.may_alias(&b));
    }

    #[test]
    fn display() {
        let mut a = Action::new(ActionId(3), ActionKind::External, ThreadId(1));
        a.method = Some("println".to_string());
        assert_eq!(a.to_string(), "a3 external println() in t1");
    }
}
