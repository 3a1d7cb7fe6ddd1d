//! Keystroke synthesis into the focused application.
//!
//! The hotstring engine only needs backspaces; commands that produce text
//! use `type_text`, with `paste_text` (clipboard + Cmd/Ctrl+V) as the
//! fallback for characters the platform cannot synthesize directly.

use crate::error::{Result, StratumError};

/// Timing for synthesized input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInjectorConfig {
    /// Delay between synthesized key presses (ms)
    pub key_delay_ms: u64,
    /// Delay after writing the clipboard and after sending paste (ms)
    pub paste_delay_ms: u64,
}

impl Default for TextInjectorConfig {
    fn default() -> Self {
        Self {
            key_delay_ms: 2,
            paste_delay_ms: 50,
        }
    }
}

/// Sends synthetic input to whatever window has focus.
pub trait TextInjector: Send + Sync {
    /// Press backspace `count` times.
    fn delete_chars(&self, count: usize) -> Result<()>;

    /// Type `text` as keystrokes.
    fn type_text(&self, text: &str) -> Result<()>;

    /// Put `text` on the clipboard and send the platform paste shortcut.
    fn paste_text(&self, text: &str) -> Result<()>;
}

/// Injector used when input synthesis is not compiled in.
#[derive(Debug, Clone, Default)]
pub struct UnavailableInjector;

impl UnavailableInjector {
    fn unavailable() -> StratumError {
        StratumError::Inject("input synthesis is not available in this build".to_string())
    }
}

impl TextInjector for UnavailableInjector {
    fn delete_chars(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        Err(Self::unavailable())
    }

    fn type_text(&self, _text: &str) -> Result<()> {
        Err(Self::unavailable())
    }

    fn paste_text(&self, _text: &str) -> Result<()> {
        Err(Self::unavailable())
    }
}

/// The injector for this platform/build.
pub fn system_injector(config: TextInjectorConfig) -> std::sync::Arc<dyn TextInjector> {
    #[cfg(feature = "native-input")]
    {
        std::sync::Arc::new(native::EnigoInjector::new(config))
    }
    #[cfg(not(feature = "native-input"))]
    {
        tracing::warn!(
            key_delay_ms = config.key_delay_ms,
            "Built without native-input; synthesized keystrokes are unavailable"
        );
        std::sync::Arc::new(UnavailableInjector)
    }
}

#[cfg(feature = "native-input")]
pub use native::EnigoInjector;

#[cfg(feature = "native-input")]
mod native {
    use std::thread;
    use std::time::Duration;

    use arboard::Clipboard;
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};
    use tracing::debug;

    use super::{TextInjector, TextInjectorConfig};
    use crate::error::{Result, StratumError};

    /// enigo-backed injector.
    ///
    /// A fresh `Enigo` is opened per call: the handle is not `Send` on every
    /// platform and dispatches run on short-lived threads.
    pub struct EnigoInjector {
        config: TextInjectorConfig,
    }

    impl EnigoInjector {
        pub fn new(config: TextInjectorConfig) -> Self {
            Self { config }
        }

        fn enigo() -> Result<Enigo> {
            Enigo::new(&Settings::default())
                .map_err(|e| StratumError::Inject(format!("failed to initialize enigo: {}", e)))
        }

        fn paste_modifier() -> Key {
            #[cfg(target_os = "macos")]
            {
                Key::Meta
            }
            #[cfg(not(target_os = "macos"))]
            {
                Key::Control
            }
        }

        fn key_delay(&self) {
            if self.config.key_delay_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.key_delay_ms));
            }
        }
    }

    fn inject_err(what: &str, e: impl std::fmt::Display) -> StratumError {
        StratumError::Inject(format!("{}: {}", what, e))
    }

    impl TextInjector for EnigoInjector {
        fn delete_chars(&self, count: usize) -> Result<()> {
            if count == 0 {
                return Ok(());
            }
            let mut enigo = Self::enigo()?;
            for _ in 0..count {
                enigo
                    .key(Key::Backspace, Direction::Click)
                    .map_err(|e| inject_err("failed to send backspace", e))?;
                self.key_delay();
            }
            debug!(count, "Sent backspaces");
            Ok(())
        }

        fn type_text(&self, text: &str) -> Result<()> {
            if text.is_empty() {
                return Ok(());
            }
            let mut enigo = Self::enigo()?;
            enigo
                .text(text)
                .map_err(|e| inject_err("failed to type text", e))?;
            debug!(len = text.chars().count(), "Typed text");
            Ok(())
        }

        fn paste_text(&self, text: &str) -> Result<()> {
            let paste_delay = Duration::from_millis(self.config.paste_delay_ms);

            let mut clipboard =
                Clipboard::new().map_err(|e| inject_err("failed to open clipboard", e))?;
            clipboard
                .set_text(text)
                .map_err(|e| inject_err("failed to set clipboard", e))?;
            thread::sleep(paste_delay);

            let mut enigo = Self::enigo()?;
            let modifier = Self::paste_modifier();
            enigo
                .key(modifier, Direction::Press)
                .map_err(|e| inject_err("failed to press modifier", e))?;
            let clicked = enigo.key(Key::Unicode('v'), Direction::Click);
            // Always release the modifier, even if the click failed
            let released = enigo.key(modifier, Direction::Release);
            clicked.map_err(|e| inject_err("failed to send paste", e))?;
            released.map_err(|e| inject_err("failed to release modifier", e))?;

            thread::sleep(paste_delay);
            debug!(len = text.chars().count(), "Pasted text");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_settings_defaults() {
        let config = TextInjectorConfig::default();
        assert_eq!(config, crate::config::InjectorSettings::default().to_injector_config());
    }

    #[test]
    fn unavailable_injector_reports_inject_errors() {
        let injector = UnavailableInjector;
        assert!(matches!(
            injector.delete_chars(3),
            Err(StratumError::Inject(_))
        ));
        assert!(matches!(injector.type_text("x"), Err(StratumError::Inject(_))));
        assert!(matches!(injector.paste_text("x"), Err(StratumError::Inject(_))));
    }

    #[test]
    fn deleting_nothing_always_succeeds() {
        assert!(UnavailableInjector.delete_chars(0).is_ok());
    }

    #[cfg(feature = "system-tests")]
    #[test]
    #[ignore = "Types into the focused window"]
    fn enigo_injector_types_text() {
        let injector = system_injector(TextInjectorConfig::default());
        injector.type_text("stratum").expect("type_text");
        injector.delete_chars(7).expect("delete_chars");
    }
}
