use crate::command::Command;

/// A sequence of commands, rendered one per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = Command>) {
        self.commands.extend(cmds);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn assertion_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_assertion()).count()
    }

    pub fn has_check_sat(&self) -> bool {
        self.commands.contains(&Command::CheckSat)
    }

    pub fn has_get_model(&self) -> bool {
        self.commands.contains(&Command::GetModel)
    }
}
