//! Global hotkey binding for commands.
//!
//! Each command with a non-empty `hotkey` is registered with the OS through
//! `global-hotkey`. A listener thread maps pressed hotkey ids back to
//! command ids and runs `registry.execute`.

use global_hotkey::{hotkey::HotKey, Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::commands::{Command, CommandRegistry};
use crate::error::{Result, StratumError};
use crate::shortcuts::Shortcut;

/// Format a registration error with the chord the user wrote.
fn format_hotkey_error(e: &HotkeyError, shortcut: &str) -> String {
    match e {
        HotkeyError::AlreadyRegistered(hk) => format!(
            "Hotkey '{}' is already registered by another application (id {})",
            shortcut,
            hk.id()
        ),
        HotkeyError::FailedToRegister(msg) => {
            format!("System rejected hotkey '{}': {}", shortcut, msg)
        }
        HotkeyError::OsError(os_err) => {
            format!("OS error registering '{}': {}", shortcut, os_err)
        }
        other => format!("Failed to register hotkey '{}': {}", shortcut, other),
    }
}

/// A command's hotkey, parsed and ready to register.
#[derive(Debug, Clone)]
pub struct PlannedBinding {
    pub command_id: String,
    pub shortcut: Shortcut,
    pub hotkey: HotKey,
}

/// Parse every command's hotkey.
///
/// Returns the bindings to register and the commands that were rejected:
/// unparsable chords, and chords already claimed by an earlier command.
pub fn plan_bindings(commands: &[Command]) -> (Vec<PlannedBinding>, Vec<(String, StratumError)>) {
    let mut planned: Vec<PlannedBinding> = Vec::new();
    let mut failures = Vec::new();

    for command in commands.iter().filter(|c| !c.hotkey.trim().is_empty()) {
        let parsed = Shortcut::parse(&command.hotkey).and_then(|shortcut| {
            let hotkey = shortcut.to_hotkey()?;
            Ok((shortcut, hotkey))
        });

        match parsed {
            Ok((shortcut, hotkey)) => {
                if let Some(existing) = planned.iter().find(|p| p.hotkey.id() == hotkey.id()) {
                    failures.push((
                        command.id.clone(),
                        StratumError::Hotkey(format!(
                            "Hotkey '{}' is already bound to '{}'",
                            shortcut, existing.command_id
                        )),
                    ));
                    continue;
                }
                planned.push(PlannedBinding {
                    command_id: command.id.clone(),
                    shortcut,
                    hotkey,
                });
            }
            Err(e) => failures.push((
                command.id.clone(),
                StratumError::Hotkey(format!("Invalid hotkey '{}': {}", command.hotkey, e)),
            )),
        }
    }

    (planned, failures)
}

/// Registers command hotkeys with the OS and tracks id -> command.
pub struct HotkeyBinder {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
    /// Hotkey id -> command id, shared with the listener thread
    bindings: Arc<RwLock<HashMap<u32, String>>>,
}

impl HotkeyBinder {
    /// NOTE: on macOS and Windows this must run on the thread that pumps
    /// the platform event loop.
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| StratumError::Hotkey(format!("Failed to create hotkey manager: {}", e)))?;
        Ok(Self {
            manager,
            registered: Vec::new(),
            bindings: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Register every command hotkey, replacing the current set.
    ///
    /// Failures are returned per command and do not stop the rest.
    #[instrument(skip_all)]
    pub fn bind_all(&mut self, registry: &CommandRegistry) -> Vec<(String, StratumError)> {
        self.unbind_all();

        let (planned, mut failures) = plan_bindings(&registry.all());
        let mut bindings = HashMap::with_capacity(planned.len());

        for binding in planned {
            let shown = binding.shortcut.to_string();
            match self.manager.register(binding.hotkey) {
                Ok(()) => {
                    debug!(
                        command_id = %binding.command_id,
                        hotkey = %shown,
                        hotkey_id = binding.hotkey.id(),
                        "Registered hotkey"
                    );
                    bindings.insert(binding.hotkey.id(), binding.command_id);
                    self.registered.push(binding.hotkey);
                }
                Err(e) => failures.push((
                    binding.command_id,
                    StratumError::Hotkey(format_hotkey_error(&e, &shown)),
                )),
            }
        }

        for (command_id, error) in &failures {
            warn!(command_id = %command_id, error = %error, "Hotkey not bound");
        }
        info!(
            bound = bindings.len(),
            failed = failures.len(),
            "Command hotkeys bound"
        );

        *self.bindings.write() = bindings;
        failures
    }

    /// Unregister everything this binder registered.
    pub fn unbind_all(&mut self) {
        if self.registered.is_empty() {
            return;
        }
        if let Err(e) = self.manager.unregister_all(&self.registered) {
            warn!(error = %e, "Failed to unregister some hotkeys");
        }
        self.registered.clear();
        self.bindings.write().clear();
    }

    /// Currently bound `(hotkey id, command id)` pairs.
    pub fn bound(&self) -> Vec<(u32, String)> {
        self.bindings
            .read()
            .iter()
            .map(|(id, command)| (*id, command.clone()))
            .collect()
    }

    /// Forward hotkey presses to `registry.execute` on a background thread.
    pub fn spawn_listener(&self, registry: Arc<CommandRegistry>) -> Result<JoinHandle<()>> {
        let bindings = Arc::clone(&self.bindings);
        thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                let receiver = GlobalHotKeyEvent::receiver();
                while let Ok(event) = receiver.recv() {
                    if event.state != HotKeyState::Pressed {
                        continue;
                    }
                    let command_id = bindings.read().get(&event.id).cloned();
                    match command_id {
                        Some(command_id) => {
                            debug!(command_id = %command_id, "Hotkey pressed");
                            registry.execute(&command_id);
                        }
                        None => debug!(hotkey_id = event.id, "Hotkey pressed with no binding"),
                    }
                }
                info!("Hotkey listener stopped");
            })
            .map_err(|e| StratumError::Hotkey(format!("Failed to spawn hotkey listener: {}", e)))
    }
}

impl Drop for HotkeyBinder {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(id: &str, hotkey: &str) -> Command {
        Command::new(id, "noop").with_hotkey(hotkey)
    }

    #[test]
    fn plan_skips_commands_without_hotkeys() {
        let commands = vec![Command::new("plain", "noop"), command("blank", "   ")];
        let (planned, failures) = plan_bindings(&commands);
        assert!(planned.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn plan_parses_valid_hotkeys() {
        let commands = vec![command("a", "ctrl+alt+a"), command("b", "F9")];
        let (planned, failures) = plan_bindings(&commands);
        assert!(failures.is_empty());
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].command_id, "a");
        assert_eq!(planned[1].shortcut.key, "f9");
    }

    #[test]
    fn plan_reports_invalid_hotkeys_per_command() {
        let commands = vec![
            command("good", "ctrl+g"),
            command("bad", "ctrl+banana"),
            command("mods_only", "ctrl+shift"),
        ];
        let (planned, failures) = plan_bindings(&commands);
        assert_eq!(planned.len(), 1);
        let failed: Vec<&str> = failures.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["bad", "mods_only"]);
        assert!(failures
            .iter()
            .all(|(_, e)| matches!(e, StratumError::Hotkey(_))));
    }

    #[test]
    fn plan_rejects_duplicate_chords() {
        let commands = vec![command("first", "ctrl+k"), command("second", "Control+K")];
        let (planned, failures) = plan_bindings(&commands);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].command_id, "first");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "second");
        assert!(failures[0].1.to_string().contains("first"));
    }

    #[test]
    fn format_error_mentions_the_shortcut() {
        let msg = format_hotkey_error(&HotkeyError::FailedToRegister("busy".to_string()), "Ctrl+K");
        assert!(msg.contains("Ctrl+K"));
        assert!(msg.contains("busy"));
    }

    #[cfg(feature = "system-tests")]
    #[test]
    #[ignore = "Requires a desktop session"]
    fn binder_registers_and_unregisters() {
        let registry = CommandRegistry::new("/nonexistent/commands.json");
        registry.upsert(command("system_chord", "ctrl+alt+shift+f13"));
        let mut binder = HotkeyBinder::new().expect("hotkey manager");
        let failures = binder.bind_all(&registry);
        assert!(failures.is_empty(), "{:?}", failures);
        assert_eq!(binder.bound().len(), 1);
        binder.unbind_all();
        assert!(binder.bound().is_empty());
    }
}
