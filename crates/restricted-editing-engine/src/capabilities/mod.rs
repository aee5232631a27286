//! Named, toggle-able editing capabilities.
//!
//! A [`Command`] is enabled only while no disable reason is registered on it.
//! Reasons are independent, so one source of disablement never clears
//! another's.

use std::collections::{BTreeMap, BTreeSet};

/// Built-in history commands
pub const UNDO_COMMAND: &str = "undo";
pub const REDO_COMMAND: &str = "redo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    force_disabled: BTreeSet<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            force_disabled: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block the command for `reason`. Adding the same reason twice is a no-op.
    pub fn force_disable(&mut self, reason: &str) {
        if self.force_disabled.insert(reason.to_string()) {
            log::trace!("command {} disabled by {reason}", self.name);
        }
    }

    /// Drop `reason`; other reasons stay in place
    pub fn clear_force_disabled(&mut self, reason: &str) {
        if self.force_disabled.remove(reason) {
            log::trace!("command {} no longer disabled by {reason}", self.name);
        }
    }

    pub fn is_disabled_by(&self, reason: &str) -> bool {
        self.force_disabled.contains(reason)
    }

    pub fn is_enabled(&self) -> bool {
        self.force_disabled.is_empty()
    }
}

/// Commands by name
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under `name`. Registering an existing name keeps
    /// the existing command and its disable reasons.
    pub fn register(&mut self, name: &str) -> &mut Command {
        self.commands
            .entry(name.to_string())
            .or_insert_with(|| Command::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.commands.get_mut(name)
    }

    /// False for unknown commands
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(Command::is_enabled)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Command> {
        self.commands.values_mut()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
