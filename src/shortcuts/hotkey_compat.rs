//! Conversion from [`Shortcut`] to `global_hotkey` types.

use global_hotkey::hotkey::{Code, HotKey, Modifiers as HotkeyModifiers};

use super::types::{Shortcut, ShortcutParseError};

fn letter_code(c: char) -> Option<Code> {
    Some(match c {
        'a' => Code::KeyA,
        'b' => Code::KeyB,
        'c' => Code::KeyC,
        'd' => Code::KeyD,
        'e' => Code::KeyE,
        'f' => Code::KeyF,
        'g' => Code::KeyG,
        'h' => Code::KeyH,
        'i' => Code::KeyI,
        'j' => Code::KeyJ,
        'k' => Code::KeyK,
        'l' => Code::KeyL,
        'm' => Code::KeyM,
        'n' => Code::KeyN,
        'o' => Code::KeyO,
        'p' => Code::KeyP,
        'q' => Code::KeyQ,
        'r' => Code::KeyR,
        's' => Code::KeyS,
        't' => Code::KeyT,
        'u' => Code::KeyU,
        'v' => Code::KeyV,
        'w' => Code::KeyW,
        'x' => Code::KeyX,
        'y' => Code::KeyY,
        'z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        _ => return None,
    })
}

const FUNCTION_KEYS: [Code; 24] = [
    Code::F1,
    Code::F2,
    Code::F3,
    Code::F4,
    Code::F5,
    Code::F6,
    Code::F7,
    Code::F8,
    Code::F9,
    Code::F10,
    Code::F11,
    Code::F12,
    Code::F13,
    Code::F14,
    Code::F15,
    Code::F16,
    Code::F17,
    Code::F18,
    Code::F19,
    Code::F20,
    Code::F21,
    Code::F22,
    Code::F23,
    Code::F24,
];

/// Physical key code for a canonical key name.
pub fn key_code(key: &str) -> Option<Code> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return letter_code(c);
    }
    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        return n.checked_sub(1).and_then(|i| FUNCTION_KEYS.get(i).copied());
    }

    Some(match key {
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "semicolon" => Code::Semicolon,
        "quote" => Code::Quote,
        "comma" => Code::Comma,
        "period" => Code::Period,
        "slash" => Code::Slash,
        "backslash" => Code::Backslash,
        "bracketleft" => Code::BracketLeft,
        "bracketright" => Code::BracketRight,
        "minus" => Code::Minus,
        "equal" => Code::Equal,
        "backquote" => Code::Backquote,
        _ => return None,
    })
}

impl Shortcut {
    /// Build the `global_hotkey` registration for this shortcut.
    pub fn to_hotkey(&self) -> Result<HotKey, ShortcutParseError> {
        let code =
            key_code(&self.key).ok_or_else(|| ShortcutParseError::UnknownKey(self.key.clone()))?;

        let mut mods = HotkeyModifiers::empty();
        if self.modifiers.cmd {
            mods |= HotkeyModifiers::META;
        }
        if self.modifiers.ctrl {
            mods |= HotkeyModifiers::CONTROL;
        }
        if self.modifiers.alt {
            mods |= HotkeyModifiers::ALT;
        }
        if self.modifiers.shift {
            mods |= HotkeyModifiers::SHIFT;
        }

        let mods = if mods.is_empty() { None } else { Some(mods) };
        Ok(HotKey::new(mods, code))
    }
}

/// Parse a chord string straight into a `global_hotkey` registration.
pub fn parse_hotkey(s: &str) -> Result<HotKey, ShortcutParseError> {
    Shortcut::parse(s)?.to_hotkey()
}
