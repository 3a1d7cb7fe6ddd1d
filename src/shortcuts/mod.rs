//! Keyboard shortcut parsing for global hotkeys.
//!
//! ```ignore
//! use stratum::shortcuts::Shortcut;
//!
//! let shortcut = Shortcut::parse("ctrl+alt+s")?;
//! println!("{}", shortcut); // Ctrl+Alt+S
//! let hotkey = shortcut.to_hotkey()?;
//! ```

mod hotkey_compat;
mod types;


pub use hotkey_compat::{key_code, parse_hotkey};
pub use types::{canonicalize_key, is_known_key, Modifiers, Shortcut, ShortcutParseError};
