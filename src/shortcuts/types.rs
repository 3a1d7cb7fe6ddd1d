//! Shortcut types: parsing, canonical key names and display.
//!
//! - `Shortcut` - modifiers plus one key, parsed from strings like `"ctrl+alt+s"`
//! - `Modifiers` - modifier flags
//! - `ShortcutParseError` - why a chord string was rejected

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
    #[error("unexpected second key '{0}' in shortcut")]
    UnknownToken(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

/// Modifier flags. `cmd` is Command on macOS and the Super/Windows key
/// elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.cmd || self.ctrl || self.alt || self.shift
    }
}

/// A global shortcut: modifier keys plus exactly one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortcut {
    /// Canonical key name, see [`canonicalize_key`]
    pub key: String,
    pub modifiers: Modifiers,
}

impl Shortcut {
    /// Parse `+`- or space-separated tokens, e.g. `"Ctrl+Shift+K"` or
    /// `"alt space"`. Modifier aliases: ctrl/control, alt/option,
    /// shift, cmd/command/meta/super/win.
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let normalized = s.replace('+', " ");
        let mut modifiers = Modifiers::default();
        let mut key: Option<&str> = None;

        for token in normalized.split_whitespace() {
            match token.to_lowercase().as_str() {
                "cmd" | "command" | "meta" | "super" | "win" => modifiers.cmd = true,
                "ctrl" | "control" | "ctl" => modifiers.ctrl = true,
                "alt" | "opt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                _ if key.is_some() => {
                    return Err(ShortcutParseError::UnknownToken(token.to_string()))
                }
                _ => key = Some(token),
            }
        }

        let key = key.ok_or(ShortcutParseError::MissingKey)?;
        let canonical = canonicalize_key(key);
        if !is_known_key(&canonical) {
            return Err(ShortcutParseError::UnknownKey(key.to_string()));
        }

        Ok(Self {
            key: canonical,
            modifiers,
        })
    }

    /// Stable lowercase form, modifiers in a fixed order: `ctrl+alt+shift+cmd+key`.
    pub fn to_canonical_string(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        if self.modifiers.ctrl {
            parts.push("ctrl");
        }
        if self.modifiers.alt {
            parts.push("alt");
        }
        if self.modifiers.shift {
            parts.push("shift");
        }
        if self.modifiers.cmd {
            parts.push("cmd");
        }
        parts.push(&self.key);
        parts.join("+")
    }

    fn key_label(&self) -> String {
        match self.key.as_str() {
            "enter" => "Enter",
            "escape" => "Esc",
            "tab" => "Tab",
            "space" => "Space",
            "backspace" => "Backspace",
            "delete" => "Delete",
            "up" => "Up",
            "down" => "Down",
            "left" => "Left",
            "right" => "Right",
            "home" => "Home",
            "end" => "End",
            "pageup" => "PageUp",
            "pagedown" => "PageDown",
            k => return k.to_uppercase(),
        }
        .to_string()
    }
}

/// `Ctrl+Alt+S` style, for listings and log lines.
impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd_label = if cfg!(target_os = "macos") { "Cmd" } else { "Super" };
        let mods = [
            (self.modifiers.ctrl, "Ctrl"),
            (self.modifiers.alt, "Alt"),
            (self.modifiers.shift, "Shift"),
            (self.modifiers.cmd, cmd_label),
        ];
        for (_, label) in mods.iter().filter(|(held, _)| *held) {
            write!(f, "{}+", label)?;
        }
        write!(f, "{}", self.key_label())
    }
}

/// Map key aliases and punctuation to one canonical lowercase name.
pub fn canonicalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    match lower.as_str() {
        "arrowup" | "uparrow" => "up",
        "arrowdown" | "downarrow" => "down",
        "arrowleft" | "leftarrow" => "left",
        "arrowright" | "rightarrow" => "right",
        "return" => "enter",
        "esc" => "escape",
        "back" => "backspace",
        "del" => "delete",
        "pgup" => "pageup",
        "pgdn" | "pgdown" => "pagedown",
        "/" => "slash",
        "\\" => "backslash",
        ";" => "semicolon",
        "'" => "quote",
        "," => "comma",
        "." => "period",
        "[" => "bracketleft",
        "]" => "bracketright",
        "-" => "minus",
        "=" => "equal",
        "`" => "backquote",
        _ => return lower,
    }
    .to_string()
}

const NAMED_KEYS: &[&str] = &[
    "space", "enter", "tab", "escape", "backspace", "delete", "up", "down", "left", "right",
    "home", "end", "pageup", "pagedown", "semicolon", "quote", "comma", "period", "slash",
    "backslash", "bracketleft", "bracketright", "minus", "equal", "backquote",
];

/// Whether `key` (already canonical) can be bound.
pub fn is_known_key(key: &str) -> bool {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n);
    }
    NAMED_KEYS.contains(&key)
}
