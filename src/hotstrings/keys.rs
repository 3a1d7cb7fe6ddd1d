//! Key-event normalization.
//!
//! Whatever the event source reports is reduced to a [`KeyInput`] before it
//! reaches the matcher: printable characters, the five keys that reset or
//! edit the buffer, and everything else.

/// A single key press as seen by the hotstring matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// A printable character
    Char(char),
    Space,
    Enter,
    Tab,
    Escape,
    Backspace,
    /// Named or non-printable keys (arrows, function keys, modifiers, chords).
    /// Ignored: the buffer is left untouched.
    Other(String),
}

impl KeyInput {
    /// Normalize a key name as reported by keyboard libraries
    /// (`"a"`, `"space"`, `"enter"`, `"left"`, `"f5"`, ...).
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from(c);
        }

        match name.to_lowercase().as_str() {
            "space" | "spacebar" => Self::Space,
            "enter" | "return" | "kpreturn" => Self::Enter,
            "tab" => Self::Tab,
            "esc" | "escape" => Self::Escape,
            "backspace" | "back" => Self::Backspace,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Space, enter, tab and escape end the current word.
    pub fn is_delimiter(&self) -> bool {
        matches!(self, Self::Space | Self::Enter | Self::Tab | Self::Escape)
    }

    /// Characters the key leaves in the focused text field.
    ///
    /// A delimiter that completes a match has already been typed after the
    /// trigger, so the deletion is the trigger length plus this width. That
    /// removes the whole typed trigger from the screen, not one char short.
    pub fn typed_width(&self) -> usize {
        match self {
            Self::Char(_) | Self::Space | Self::Enter | Self::Tab => 1,
            Self::Escape | Self::Backspace | Self::Other(_) => 0,
        }
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        match c {
            ' ' => Self::Space,
            '\r' | '\n' => Self::Enter,
            '\t' => Self::Tab,
            '\u{1b}' => Self::Escape,
            '\u{8}' | '\u{7f}' => Self::Backspace,
            c if c.is_control() => Self::Other(format!("{:?}", c)),
            c => Self::Char(c),
        }
    }
}

/// Uppercase `c` when that maps to exactly one character, else keep `c`.
///
/// One keystroke must stay one buffer slot so a backspace undoes it
/// (`ß` would otherwise become `SS`).
pub fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(folded), None) => folded,
        _ => c,
    }
}

/// Case-fold a trigger for the index. Matching is case-insensitive.
pub fn normalize_trigger(trigger: &str) -> String {
    trigger.chars().map(fold_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chars_are_printable() {
        assert_eq!(KeyInput::from_name("a"), KeyInput::Char('a'));
        assert_eq!(KeyInput::from_name(";"), KeyInput::Char(';'));
        assert_eq!(KeyInput::from_name("é"), KeyInput::Char('é'));
    }

    #[test]
    fn named_delimiters() {
        assert_eq!(KeyInput::from_name("space"), KeyInput::Space);
        assert_eq!(KeyInput::from_name("Enter"), KeyInput::Enter);
        assert_eq!(KeyInput::from_name("return"), KeyInput::Enter);
        assert_eq!(KeyInput::from_name("tab"), KeyInput::Tab);
        assert_eq!(KeyInput::from_name("esc"), KeyInput::Escape);
        assert_eq!(KeyInput::from_name("backspace"), KeyInput::Backspace);
    }

    #[test]
    fn control_characters_map_to_keys() {
        assert_eq!(KeyInput::from(' '), KeyInput::Space);
        assert_eq!(KeyInput::from('\r'), KeyInput::Enter);
        assert_eq!(KeyInput::from('\t'), KeyInput::Tab);
        assert_eq!(KeyInput::from('\u{1b}'), KeyInput::Escape);
        assert_eq!(KeyInput::from('\u{8}'), KeyInput::Backspace);
        assert!(matches!(KeyInput::from('\u{0}'), KeyInput::Other(_)));
    }

    #[test]
    fn multi_char_names_are_ignored_keys() {
        assert_eq!(KeyInput::from_name("left"), KeyInput::Other("left".to_string()));
        assert_eq!(KeyInput::from_name("f5"), KeyInput::Other("f5".to_string()));
        assert_eq!(KeyInput::from_name(""), KeyInput::Other(String::new()));
    }

    #[test]
    fn delimiters_and_widths() {
        assert!(KeyInput::Space.is_delimiter());
        assert!(KeyInput::Escape.is_delimiter());
        assert!(!KeyInput::Backspace.is_delimiter());
        assert!(!KeyInput::Char('x').is_delimiter());

        assert_eq!(KeyInput::Space.typed_width(), 1);
        assert_eq!(KeyInput::Enter.typed_width(), 1);
        assert_eq!(KeyInput::Escape.typed_width(), 0);
    }

    #[test]
    fn triggers_fold_to_uppercase() {
        assert_eq!(normalize_trigger("btw"), "BTW");
        assert_eq!(normalize_trigger(";Sig"), ";SIG");
    }

    #[test]
    fn folding_keeps_one_char_per_keystroke() {
        assert_eq!(fold_char('a'), 'A');
        assert_eq!(fold_char('é'), 'É');
        assert_eq!(fold_char('ß'), 'ß');
        assert_eq!(fold_char('ﬁ'), 'ﬁ');
        assert_eq!(normalize_trigger("straße"), "STRAßE");
    }
}
