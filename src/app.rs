//! Application wiring.
//!
//! `App` owns the command registry, vault, snippet handler and hotstring
//! engine, registers the built-in actions and runs the reload loop.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::error::{Result, ResultExt, StratumError};
use crate::hotkeys::HotkeyBinder;
use crate::hotstrings::{EngineConfig, HotstringEngine};
use crate::keyboard_hook::{self, KeyboardHook};
use crate::snippet_handler::SnippetHandler;
use crate::text_injector::{self, TextInjector};
use crate::vault::VaultManager;
use crate::watcher::{CommandsReloadEvent, CommandsWatcher};

/// Action ids handled by the application itself
pub mod actions {
    pub const VAULT_INSERT: &str = "vault.insert";
    pub const TEXT_TYPE: &str = "text.type";
    pub const HOTSTRINGS_TOGGLE: &str = "hotstrings.toggle";
    pub const HOTSTRINGS_ENABLE: &str = "hotstrings.enable";
    pub const HOTSTRINGS_DISABLE: &str = "hotstrings.disable";
}

pub struct App {
    config: Config,
    registry: Arc<CommandRegistry>,
    vault: Arc<VaultManager>,
    snippets: Arc<SnippetHandler>,
    engine: HotstringEngine,
}

impl App {
    pub fn new(
        config: Config,
        hook: Box<dyn KeyboardHook>,
        injector: Arc<dyn TextInjector>,
    ) -> Self {
        let registry = Arc::new(CommandRegistry::new(config.get_commands_path()));
        let vault = Arc::new(VaultManager::new(config.get_vault_path()));
        let snippets = Arc::new(SnippetHandler::new(Arc::clone(&vault), Arc::clone(&injector)));
        let engine_config =
            EngineConfig::from_settings(&config.get_hotstrings(), &config.get_injector());
        let engine = HotstringEngine::new(Arc::clone(&registry), hook, injector, engine_config);

        let app = Self {
            config,
            registry,
            vault,
            snippets,
            engine,
        };
        app.register_builtin_actions();
        app
    }

    /// App backed by the real keyboard hook and injector for this build.
    pub fn with_system_input(config: Config) -> Self {
        let injector = text_injector::system_injector(config.get_injector().to_injector_config());
        Self::new(config, keyboard_hook::system_hook(), injector)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn vault(&self) -> &Arc<VaultManager> {
        &self.vault
    }

    pub fn engine(&self) -> &HotstringEngine {
        &self.engine
    }

    fn register_builtin_actions(&self) {
        // Injected text passes back through the keyboard hook
        let snippets = Arc::clone(&self.snippets);
        let control = self.engine.control();
        self.registry
            .register_fn_with_arg(actions::VAULT_INSERT, move |item_id| {
                control.suspended(|| snippets.insert_snippet(item_id));
            });

        let snippets = Arc::clone(&self.snippets);
        let control = self.engine.control();
        self.registry
            .register_fn_with_arg(actions::TEXT_TYPE, move |text| {
                control.suspended(|| snippets.type_text(text));
            });

        let control = self.engine.control();
        self.registry.register_fn(actions::HOTSTRINGS_TOGGLE, move || {
            control.toggle();
        });
        let control = self.engine.control();
        self.registry
            .register_fn(actions::HOTSTRINGS_ENABLE, move || control.enable());
        let control = self.engine.control();
        self.registry
            .register_fn(actions::HOTSTRINGS_DISABLE, move || control.disable());
    }

    /// Load commands and the vault from disk.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<()> {
        let commands = self.registry.load()?;
        let items = self.vault.load()?;
        info!(commands, vault_items = items, "Data loaded");
        Ok(())
    }

    /// Re-read commands.json and rebuild the hotstring index.
    pub fn reload_commands(&self) -> Result<usize> {
        let count = self.registry.load()?;
        self.engine.register_all();
        Ok(count)
    }

    /// Arm hotstrings, bind hotkeys, then block applying reloads of
    /// commands.json until the process is terminated.
    pub fn run(&self) -> Result<()> {
        let triggers = self.engine.register_all();

        let mut binder = HotkeyBinder::new().warn_on_err();
        if let Some(binder) = binder.as_mut() {
            binder.bind_all(&self.registry);
            binder.spawn_listener(Arc::clone(&self.registry)).log_err();
        }

        let (mut watcher, reloads) = CommandsWatcher::new(self.registry.path());
        if self.config.get_watch_commands() {
            watcher
                .start()
                .map_err(|e| StratumError::Config(format!("cannot watch commands file: {}", e)))
                .warn_on_err();
        }

        info!(
            triggers,
            engine_state = ?self.engine.state(),
            hotkeys = binder.as_ref().map(|b| b.bound().len()).unwrap_or(0),
            "Stratum running"
        );

        for event in reloads.iter() {
            match event {
                CommandsReloadEvent::Reload => {
                    if self.reload_commands().log_err().is_none() {
                        warn!("Keeping previous commands after failed reload");
                        continue;
                    }
                    if let Some(binder) = binder.as_mut() {
                        binder.bind_all(&self.registry);
                    }
                }
            }
        }

        Ok(())
    }
}
