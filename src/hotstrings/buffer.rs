//! Rolling buffer of recently typed characters.

use std::collections::VecDeque;

use super::keys::fold_char;

/// Bounded, case-folded record of the characters typed since the last
/// delimiter or match. The oldest characters fall off the front once
/// `max_len` is exceeded.
#[derive(Debug, Clone)]
pub struct KeystrokeBuffer {
    chars: VecDeque<char>,
    max_len: usize,
}

impl KeystrokeBuffer {
    /// `max_len` is clamped to at least 1.
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            chars: VecDeque::with_capacity(max_len + 1),
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Append the folded form of `c`, then trim from the front.
    ///
    /// Each keystroke occupies exactly one slot; see [`fold_char`].
    pub fn push(&mut self, c: char) {
        self.chars.push_back(fold_char(c));
        if self.chars.len() > self.max_len {
            self.chars.pop_front();
        }
    }

    /// Remove the last character, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop_back()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The last `len` characters as a string (all of them if `len` is larger).
    pub fn suffix(&self, len: usize) -> String {
        let start = self.chars.len().saturating_sub(len);
        self.chars.range(start..).collect()
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_folds_case() {
        let mut buffer = KeystrokeBuffer::new(10);
        buffer.push('b');
        buffer.push('T');
        buffer.push('w');
        assert_eq!(buffer.as_string(), "BTW");
    }

    #[test]
    fn cap_keeps_most_recent_chars() {
        let mut buffer = KeystrokeBuffer::new(5);
        for c in "abcdefghij".chars() {
            buffer.push(c);
        }
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.as_string(), "FGHIJ");
    }

    #[test]
    fn one_slot_per_keystroke() {
        let mut buffer = KeystrokeBuffer::new(3);
        buffer.push('a');
        buffer.push('ß');
        assert_eq!(buffer.as_string(), "Aß");
        assert_eq!(buffer.pop(), Some('ß'));
        assert_eq!(buffer.as_string(), "A");
        buffer.pop();
        buffer.push('ß');
        buffer.pop();
        assert!(buffer.is_empty());
    }

    #[test]
    fn pop_and_clear() {
        let mut buffer = KeystrokeBuffer::new(5);
        assert_eq!(buffer.pop(), None);
        buffer.push('x');
        buffer.push('y');
        assert_eq!(buffer.pop(), Some('Y'));
        assert_eq!(buffer.as_string(), "X");
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn suffix_clamps_to_length() {
        let mut buffer = KeystrokeBuffer::new(10);
        for c in "hello".chars() {
            buffer.push(c);
        }
        assert_eq!(buffer.suffix(2), "LO");
        assert_eq!(buffer.suffix(99), "HELLO");
        assert_eq!(buffer.suffix(0), "");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = KeystrokeBuffer::new(0);
        assert_eq!(buffer.max_len(), 1);
        buffer.push('a');
        buffer.push('b');
        assert_eq!(buffer.as_string(), "B");
    }
}
