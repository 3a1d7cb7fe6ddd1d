//! Canonical command store and action dispatch.
//!
//! Commands live in commands.json as a JSON array. Handlers are registered
//! at startup under an action id; a command's `action` names the handler,
//! optionally followed by `:arg`.
//!
//! `execute` is fire-and-forget by contract: it returns `()` and never
//! panics. Unknown ids, empty actions, unregistered handlers and arity
//! mismatches are silent no-ops (logged), and handler panics are contained.
//! The hotstring engine and hotkey binder rely on this.

use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};

use super::types::{parse_action, ActionHandler, Command, CommandUpdate};
use crate::error::{Result, StratumError};

pub struct CommandRegistry {
    path: PathBuf,
    /// Commands in file order; ids are unique
    commands: RwLock<Vec<Command>>,
    /// Action id -> handler
    handlers: RwLock<HashMap<String, ActionHandler>>,
}

impl CommandRegistry {
    pub fn new(commands_path: impl Into<PathBuf>) -> Self {
        Self {
            path: commands_path.into(),
            commands: RwLock::new(Vec::new()),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---------- loading ----------

    /// Load commands from disk, replacing the in-memory set.
    ///
    /// A missing file is created containing `[]`; an empty file counts as `[]`.
    /// When the file repeats an id the later entry wins.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<usize> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).map_err(|e| StratumError::io(parent, e))?;
            }
            fs::write(&self.path, "[]").map_err(|e| StratumError::io(&self.path, e))?;
            info!("Created empty commands file");
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| StratumError::io(&self.path, e))?;
        let raw = raw.trim();
        let parsed: Vec<Command> = if raw.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(raw).map_err(|e| StratumError::json(&self.path, e))?
        };

        let mut commands: Vec<Command> = Vec::with_capacity(parsed.len());
        for mut cmd in parsed {
            if cmd.label.is_empty() {
                cmd.label = cmd.id.clone();
            }
            match commands.iter_mut().find(|c| c.id == cmd.id) {
                Some(existing) => {
                    warn!(id = %cmd.id, "Duplicate command id in file, keeping the later one");
                    *existing = cmd;
                }
                None => commands.push(cmd),
            }
        }

        let count = commands.len();
        *self.commands.write() = commands;
        info!(count, "Loaded commands");
        Ok(count)
    }

    /// Write the current command set back to disk as pretty JSON.
    pub fn save(&self) -> Result<()> {
        let content = {
            let commands = self.commands.read();
            serde_json::to_string_pretty(&*commands).map_err(|e| StratumError::json(&self.path, e))?
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StratumError::io(parent, e))?;
        }
        fs::write(&self.path, content).map_err(|e| StratumError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "Saved commands");
        Ok(())
    }

    // ---------- query ----------

    /// Snapshot of every command, in file order.
    pub fn all(&self) -> Vec<Command> {
        self.commands.read().clone()
    }

    pub fn get(&self, command_id: &str) -> Option<Command> {
        self.commands
            .read()
            .iter()
            .find(|c| c.id == command_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    // ---------- editing ----------

    /// Insert a command, replacing any existing command with the same id.
    pub fn upsert(&self, command: Command) {
        let mut commands = self.commands.write();
        match commands.iter_mut().find(|c| c.id == command.id) {
            Some(existing) => *existing = command,
            None => commands.push(command),
        }
    }

    /// Add a new command with an id derived from its label.
    ///
    /// The id is the lowercased label with spaces replaced by `_`, suffixed
    /// `_1`, `_2`, ... until it is unique. Returns the new id.
    pub fn add_command(
        &self,
        label: &str,
        action: &str,
        hotkey: &str,
        hotstring: &str,
        tags: Vec<String>,
    ) -> String {
        let mut commands = self.commands.write();

        let base_id = label.trim().to_lowercase().replace(' ', "_");
        let mut id = base_id.clone();
        let mut counter = 1;
        while commands.iter().any(|c| c.id == id) {
            id = format!("{}_{}", base_id, counter);
            counter += 1;
        }

        commands.push(Command {
            id: id.clone(),
            label: label.to_string(),
            action: action.to_string(),
            hotkey: hotkey.to_string(),
            hotstring: hotstring.to_string(),
            tags,
        });

        info!(id = %id, "Added command");
        id
    }

    /// Apply a partial update. Returns false if the id is unknown.
    pub fn update_command(&self, command_id: &str, update: CommandUpdate) -> bool {
        let mut commands = self.commands.write();
        match commands.iter_mut().find(|c| c.id == command_id) {
            Some(command) => {
                update.apply(command);
                debug!(id = %command_id, "Updated command");
                true
            }
            None => false,
        }
    }

    /// Remove a command. Returns false if the id is unknown.
    pub fn remove_command(&self, command_id: &str) -> bool {
        let mut commands = self.commands.write();
        let before = commands.len();
        commands.retain(|c| c.id != command_id);
        let removed = commands.len() != before;
        if removed {
            debug!(id = %command_id, "Removed command");
        }
        removed
    }

    // ---------- handlers / execution ----------

    /// Register a handler for an action id like `vault.insert`.
    ///
    /// A later registration under the same id replaces the earlier one.
    pub fn register_handler(&self, action_id: impl Into<String>, handler: ActionHandler) {
        let action_id = action_id.into();
        debug!(action = %action_id, kind = ?handler, "Registered action handler");
        self.handlers.write().insert(action_id, handler);
    }

    pub fn register_fn<F: Fn() + Send + Sync + 'static>(&self, action_id: &str, f: F) {
        self.register_handler(action_id, ActionHandler::no_arg(f));
    }

    pub fn register_fn_with_arg<F: Fn(&str) + Send + Sync + 'static>(&self, action_id: &str, f: F) {
        self.register_handler(action_id, ActionHandler::with_arg(f));
    }

    pub fn has_handler(&self, action_id: &str) -> bool {
        self.handlers.read().contains_key(action_id)
    }

    /// Run the command's action. Never fails and never panics.
    pub fn execute(&self, command_id: &str) {
        let Some(action) = self
            .commands
            .read()
            .iter()
            .find(|c| c.id == command_id)
            .map(|c| c.action.clone())
        else {
            debug!(id = %command_id, "Execute: unknown command id");
            return;
        };

        let Some((base, arg)) = parse_action(&action) else {
            debug!(id = %command_id, "Execute: command has no action");
            return;
        };

        // Clone out of the lock so handlers may call back into the registry
        let Some(handler) = self.handlers.read().get(base).cloned() else {
            debug!(id = %command_id, action = %base, "Execute: no handler registered");
            return;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match (&handler, arg) {
            (ActionHandler::NoArg(f), None) => {
                f();
                true
            }
            (ActionHandler::WithArg(f), Some(arg)) => {
                f(arg);
                true
            }
            _ => false,
        }));

        match outcome {
            Ok(true) => debug!(id = %command_id, action = %base, "Executed command"),
            Ok(false) => warn!(
                id = %command_id,
                action = %action,
                handler = ?handler,
                "Execute: handler arity does not match action argument, skipping"
            ),
            Err(_) => error!(id = %command_id, action = %base, "Command handler panicked"),
        }
    }
}
