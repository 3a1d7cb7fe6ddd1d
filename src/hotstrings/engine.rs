//! Hotstring engine - ties the keyboard hook, the matcher and command
//! dispatch together.
//!
//! # Flow
//!
//! 1. `register_all()` builds a trigger index from every command with a
//!    hotstring and installs the keyboard hook the first time one exists
//! 2. The hook feeds each key press to `on_key_event`, which runs the matcher
//!    under a short lock
//! 3. On a match the buffer is already clear; a dispatch thread waits for the
//!    triggering key to settle, erases the trigger with backspaces and then
//!    runs `registry.execute(command_id)`
//! 4. While a dispatch is in flight (and for `resume_delay` afterwards)
//!    matching is suspended so the engine never reacts to its own keystrokes

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, trace, warn};

use super::keys::KeyInput;
use super::matcher::{HotstringMatcher, TriggerIndex, TriggerMatch};
use crate::commands::CommandRegistry;
use crate::config::{HotstringSettings, InjectorSettings};
use crate::keyboard_hook::{KeySink, KeyboardHook};
use crate::text_injector::TextInjector;

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial value of the global enable flag
    pub enabled: bool,
    pub max_buffer_len: usize,
    /// Wait before sending the undo backspaces
    pub settle_delay: Duration,
    /// Matching stays suspended this long after a dispatch
    pub resume_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_settings(&HotstringSettings::default(), &InjectorSettings::default())
    }
}

impl EngineConfig {
    pub fn from_settings(hotstrings: &HotstringSettings, injector: &InjectorSettings) -> Self {
        Self {
            enabled: hotstrings.enabled,
            max_buffer_len: hotstrings.max_buffer_len,
            settle_delay: Duration::from_millis(injector.settle_delay_ms),
            resume_delay: Duration::from_millis(injector.resume_delay_ms),
        }
    }
}

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Hook not installed; nothing is observed
    Idle,
    /// Hook installed and matching
    Armed,
    /// Hook installed but matching suspended (user toggle or own dispatch)
    Disabled,
}

/// State reachable from the hook thread and dispatch threads.
struct EngineShared {
    matcher: Mutex<HotstringMatcher>,
    registry: Arc<CommandRegistry>,
    injector: Arc<dyn TextInjector>,
    enabled: AtomicBool,
    hook_installed: AtomicBool,
    in_flight: AtomicUsize,
    settle_delay: Duration,
    resume_delay: Duration,
}

/// Decrements the in-flight count when a dispatch ends, even by panic.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl EngineShared {
    fn matching_suspended(&self) -> bool {
        !self.enabled.load(Ordering::Acquire) || self.in_flight.load(Ordering::Acquire) > 0
    }

    fn on_key_event(self: &Arc<Self>, key: KeyInput) {
        if !self.hook_installed.load(Ordering::Acquire) {
            return;
        }
        if self.matching_suspended() {
            trace!(key = ?key, "Matching suspended, ignoring key");
            return;
        }

        let result = self.matcher.lock().process_key(&key);
        trace!(key = ?key, "Key processed");

        if let Some(result) = result {
            debug!(
                command_id = %result.command_id,
                chars_to_delete = result.chars_to_delete,
                "Hotstring matched"
            );
            self.spawn_dispatch(result);
        }
    }

    fn spawn_dispatch(self: &Arc<Self>, result: TriggerMatch) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let shared = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("hotstring-dispatch".to_string())
            .spawn(move || {
                let _guard = InFlightGuard(&shared.in_flight);
                shared.dispatch(result);
            });

        if let Err(e) = spawned {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            error!(error = %e, "Failed to spawn hotstring dispatch thread");
        }
    }

    /// Runs on the dispatch thread, never on the hook thread.
    fn dispatch(&self, result: TriggerMatch) {
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        match self.injector.delete_chars(result.chars_to_delete) {
            Ok(()) => {
                self.registry.execute(&result.command_id);
                info!(
                    command_id = %result.command_id,
                    chars_deleted = result.chars_to_delete,
                    "Hotstring dispatched"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    command_id = %result.command_id,
                    chars = result.chars_to_delete,
                    "Failed to delete trigger characters"
                );
            }
        }

        if !self.resume_delay.is_zero() {
            thread::sleep(self.resume_delay);
        }
    }
}

/// Cloneable handle for toggling the engine from command handlers.
#[derive(Clone)]
pub struct HotstringControl {
    shared: Arc<EngineShared>,
}

impl HotstringControl {
    pub fn enable(&self) {
        self.shared.enabled.store(true, Ordering::Release);
        info!("Hotstrings enabled");
    }

    /// Suspends matching. A dispatch that already started still completes.
    pub fn disable(&self) {
        self.shared.enabled.store(false, Ordering::Release);
        info!("Hotstrings disabled");
    }

    /// Flip the enable flag; returns the new value.
    pub fn toggle(&self) -> bool {
        let now_enabled = !self.shared.enabled.fetch_xor(true, Ordering::AcqRel);
        info!(enabled = now_enabled, "Hotstrings toggled");
        now_enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    pub fn clear_buffer(&self) {
        self.shared.matcher.lock().clear_buffer();
    }

    /// Run `f` with matching suspended, for actions outside a hotstring
    /// dispatch (hotkeys, CLI) that synthesize keys the hook will observe.
    /// Matching resumes after the resume delay, even if `f` panics.
    pub fn suspended<R>(&self, f: impl FnOnce() -> R) -> R {
        self.shared.in_flight.fetch_add(1, Ordering::AcqRel);
        let _guard = InFlightGuard(&self.shared.in_flight);
        let output = f();
        if !self.shared.resume_delay.is_zero() {
            thread::sleep(self.shared.resume_delay);
        }
        output
    }
}

/// System-wide hotstring detection over a [`CommandRegistry`].
pub struct HotstringEngine {
    shared: Arc<EngineShared>,
    hook: Mutex<Box<dyn KeyboardHook>>,
    /// Set after a failed install; the engine stays Idle and never retries
    hook_failed: AtomicBool,
}

impl HotstringEngine {
    pub fn new(
        registry: Arc<CommandRegistry>,
        hook: Box<dyn KeyboardHook>,
        injector: Arc<dyn TextInjector>,
        config: EngineConfig,
    ) -> Self {
        let shared = EngineShared {
            matcher: Mutex::new(HotstringMatcher::new(config.max_buffer_len)),
            registry,
            injector,
            enabled: AtomicBool::new(config.enabled),
            hook_installed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            settle_delay: config.settle_delay,
            resume_delay: config.resume_delay,
        };

        Self {
            shared: Arc::new(shared),
            hook: Mutex::new(hook),
            hook_failed: AtomicBool::new(false),
        }
    }

    /// Rebuild the trigger index from the registry's current commands.
    ///
    /// Installs the hook the first time at least one hotstring exists;
    /// later calls only swap the index. Returns the number of triggers.
    #[instrument(skip(self))]
    pub fn register_all(&self) -> usize {
        let mut index = TriggerIndex::new();
        for command in self.shared.registry.all() {
            if command.hotstring.is_empty() {
                continue;
            }
            if command.hotstring.chars().any(char::is_whitespace) {
                warn!(
                    command_id = %command.id,
                    "Hotstring contains whitespace and can never fire"
                );
            }
            if let Some(previous) = index.insert(&command.hotstring, &command.id) {
                warn!(
                    command_id = %command.id,
                    replaced = %previous,
                    "Duplicate hotstring, later command wins"
                );
            }
        }

        let count = index.len();
        self.shared.matcher.lock().set_index(index);
        info!(triggers = count, "Hotstrings registered");

        if count > 0 {
            self.ensure_hook();
        }
        count
    }

    /// Drop every trigger and the buffered text. The hook stays installed.
    #[instrument(skip(self))]
    pub fn unregister_all(&self) {
        let mut matcher = self.shared.matcher.lock();
        matcher.clear_index();
        matcher.clear_buffer();
        info!("Hotstrings unregistered");
    }

    fn ensure_hook(&self) {
        if self.shared.hook_installed.load(Ordering::Acquire)
            || self.hook_failed.load(Ordering::Acquire)
        {
            return;
        }

        let mut hook = self.hook.lock();
        // Re-check under the lock: two register_all calls may race here
        if self.shared.hook_installed.load(Ordering::Acquire) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let sink: KeySink = Arc::new(move |key: KeyInput| shared.on_key_event(key));

        match hook.install(sink) {
            Ok(()) => {
                self.shared.hook_installed.store(true, Ordering::Release);
                info!(backend = hook.name(), "Keyboard hook installed, hotstrings armed");
            }
            Err(e) => {
                self.hook_failed.store(true, Ordering::Release);
                error!(
                    backend = hook.name(),
                    error = %e,
                    "Keyboard hook installation failed; hotstrings will not fire"
                );
            }
        }
    }

    /// Entry point for the hook. Public so callers can drive the engine
    /// without a real hook.
    pub fn on_key_event(&self, key: KeyInput) {
        self.shared.on_key_event(key);
    }

    pub fn state(&self) -> EngineState {
        if !self.shared.hook_installed.load(Ordering::Acquire) {
            EngineState::Idle
        } else if self.shared.matching_suspended() {
            EngineState::Disabled
        } else {
            EngineState::Armed
        }
    }

    pub fn control(&self) -> HotstringControl {
        HotstringControl {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn enable(&self) {
        self.control().enable();
    }

    pub fn disable(&self) {
        self.control().disable();
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    pub fn clear_buffer(&self) {
        self.shared.matcher.lock().clear_buffer();
    }

    pub fn trigger_count(&self) -> usize {
        self.shared.matcher.lock().index().len()
    }

    /// Registered triggers as `(trigger, command_id)`, sorted by trigger.
    pub fn list_triggers(&self) -> Vec<(String, String)> {
        let matcher = self.shared.matcher.lock();
        let mut triggers: Vec<(String, String)> = matcher
            .index()
            .entries()
            .map(|entry| (entry.trigger.clone(), entry.command_id.clone()))
            .collect();
        triggers.sort();
        triggers
    }

    /// Current buffer contents (case-folded).
    pub fn buffer_contents(&self) -> String {
        self.shared.matcher.lock().buffer().as_string()
    }

    /// Dispatches currently running (including their resume delay).
    pub fn pending_dispatches(&self) -> usize {
        self.shared.in_flight.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for HotstringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotstringEngine")
            .field("state", &self.state())
            .field("triggers", &self.trigger_count())
            .finish()
    }
}
