//! Global keyboard hook.
//!
//! A [`KeyboardHook`] delivers every physical key press, already normalized
//! to a [`KeyInput`], to a sink closure. The sink runs on the hook's own
//! thread and must return quickly.

use std::sync::Arc;

use crate::error::{Result, StratumError};
use crate::hotstrings::KeyInput;

/// Receives normalized key presses from the hook thread.
pub type KeySink = Arc<dyn Fn(KeyInput) + Send + Sync>;

pub trait KeyboardHook: Send {
    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;

    /// Start delivering key presses to `sink`.
    ///
    /// Called at most once per hook. There is no uninstall: the hook lives
    /// until the process exits.
    fn install(&mut self, sink: KeySink) -> Result<()>;
}

/// Hook used when global input capture is not compiled in. Installation
/// always fails.
#[derive(Debug, Clone, Default)]
pub struct UnavailableHook;

impl KeyboardHook for UnavailableHook {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn install(&mut self, _sink: KeySink) -> Result<()> {
        Err(StratumError::HookInstall(
            "global keyboard capture is not available in this build".to_string(),
        ))
    }
}

/// The keyboard hook for this platform/build.
pub fn system_hook() -> Box<dyn KeyboardHook> {
    #[cfg(feature = "native-input")]
    {
        Box::new(native::RdevHook::new())
    }
    #[cfg(not(feature = "native-input"))]
    {
        Box::new(UnavailableHook)
    }
}

#[cfg(feature = "native-input")]
pub use native::RdevHook;

#[cfg(feature = "native-input")]
mod native {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use rdev::{listen, Event, EventType, Key};
    use tracing::{debug, error, info};

    use super::{KeyboardHook, KeySink};
    use crate::error::{Result, StratumError};
    use crate::hotstrings::KeyInput;

    /// How long `install` waits for `rdev::listen` to fail before assuming it
    /// is running
    const INSTALL_CHECK_MS: u64 = 250;

    #[derive(Debug, Default, Clone, Copy)]
    struct HeldModifiers {
        control: bool,
        alt: bool,
        meta: bool,
    }

    impl HeldModifiers {
        fn chord(&self) -> bool {
            self.control || self.alt || self.meta
        }

        /// Returns true if `key` is a tracked modifier.
        fn update(&mut self, key: Key, pressed: bool) -> bool {
            match key {
                Key::ControlLeft | Key::ControlRight => self.control = pressed,
                Key::Alt => self.alt = pressed,
                Key::MetaLeft | Key::MetaRight => self.meta = pressed,
                _ => return false,
            }
            true
        }
    }

    /// rdev-backed global hook (X11 on Linux, Accessibility on macOS).
    pub struct RdevHook {
        installed: bool,
    }

    impl RdevHook {
        pub fn new() -> Self {
            Self { installed: false }
        }
    }

    impl Default for RdevHook {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Normalize an rdev key press.
    pub(crate) fn key_input(key: Key, name: Option<&str>) -> KeyInput {
        match key {
            Key::Space => KeyInput::Space,
            Key::Return | Key::KpReturn => KeyInput::Enter,
            Key::Tab => KeyInput::Tab,
            Key::Escape => KeyInput::Escape,
            Key::Backspace => KeyInput::Backspace,
            _ => match name {
                Some(name) if !name.is_empty() => KeyInput::from_name(name),
                _ => KeyInput::Other(format!("{:?}", key)),
            },
        }
    }

    impl KeyboardHook for RdevHook {
        fn name(&self) -> &'static str {
            "rdev"
        }

        fn install(&mut self, sink: KeySink) -> Result<()> {
            if self.installed {
                debug!("rdev hook already installed");
                return Ok(());
            }

            let (err_tx, err_rx) = mpsc::channel::<String>();

            thread::Builder::new()
                .name("keyboard-hook".to_string())
                .spawn(move || {
                    let mut modifiers = HeldModifiers::default();

                    let callback = move |event: Event| match event.event_type {
                        EventType::KeyPress(key) => {
                            if modifiers.update(key, true) {
                                return;
                            }
                            // Chords are shortcuts, not typing
                            let input = if modifiers.chord() {
                                KeyInput::Other(format!("{:?}", key))
                            } else {
                                key_input(key, event.name.as_deref())
                            };
                            sink(input);
                        }
                        EventType::KeyRelease(key) => {
                            modifiers.update(key, false);
                        }
                        _ => {}
                    };

                    // Blocks for the life of the process unless the hook fails
                    if let Err(e) = listen(callback) {
                        let message = format!("{:?}", e);
                        error!(error = %message, "rdev listener stopped");
                        let _ = err_tx.send(message);
                    }
                })
                .map_err(|e| StratumError::HookInstall(format!("failed to spawn hook thread: {}", e)))?;

            match err_rx.recv_timeout(Duration::from_millis(INSTALL_CHECK_MS)) {
                Ok(message) => Err(StratumError::HookInstall(message)),
                Err(_) => {
                    self.installed = true;
                    info!("rdev keyboard hook installed");
                    Ok(())
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_hook_fails_to_install() {
        let mut hook = UnavailableHook;
        let sink: KeySink = Arc::new(|_: KeyInput| {});
        assert!(matches!(
            hook.install(sink),
            Err(StratumError::HookInstall(_))
        ));
    }
}
