//! Trigger index and suffix matching.
//!
//! [`HotstringMatcher`] owns the rolling buffer and the trigger index and
//! turns a stream of [`KeyInput`]s into [`TriggerMatch`]es. It is pure state:
//! no threads, no I/O, which is what the engine tests lean on.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::buffer::KeystrokeBuffer;
use super::keys::{normalize_trigger, KeyInput};

/// A registered trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEntry {
    /// Command executed when the trigger fires
    pub command_id: String,
    /// Trigger exactly as written in the command
    pub trigger: String,
    /// Characters the trigger occupies in the focused field
    pub trigger_chars: usize,
}

/// A trigger that just fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub command_id: String,
    pub trigger: String,
    /// Backspaces needed to erase the trigger (plus the delimiter, if one was typed)
    pub chars_to_delete: usize,
}

/// Case-folded trigger -> command lookup.
#[derive(Debug, Clone, Default)]
pub struct TriggerIndex {
    triggers: HashMap<String, TriggerEntry>,
    /// Length (in folded chars) of the longest key, bounds the suffix scan
    longest: usize,
}

impl TriggerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `trigger` for `command_id`.
    ///
    /// Empty triggers are ignored. A trigger that folds to an existing key
    /// replaces it; the previous command id is returned.
    pub fn insert(&mut self, trigger: &str, command_id: &str) -> Option<String> {
        if trigger.is_empty() {
            debug!(command_id, "Ignoring empty hotstring");
            return None;
        }

        let key = normalize_trigger(trigger);
        self.longest = self.longest.max(key.chars().count());

        let entry = TriggerEntry {
            command_id: command_id.to_string(),
            trigger: trigger.to_string(),
            trigger_chars: trigger.chars().count(),
        };

        self.triggers.insert(key, entry).map(|old| old.command_id)
    }

    pub fn get(&self, trigger: &str) -> Option<&TriggerEntry> {
        self.triggers.get(&normalize_trigger(trigger))
    }

    pub fn entries(&self) -> impl Iterator<Item = &TriggerEntry> {
        self.triggers.values()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Length of the longest folded trigger.
    pub fn longest(&self) -> usize {
        self.longest
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
        self.longest = 0;
    }

    /// The longest registered trigger the buffer currently ends with.
    pub fn longest_suffix_match(&self, buffer: &KeystrokeBuffer) -> Option<&TriggerEntry> {
        let max = self.longest.min(buffer.len());
        (1..=max)
            .rev()
            .find_map(|len| self.triggers.get(&buffer.suffix(len)))
    }
}

/// Rolling buffer plus trigger index.
#[derive(Debug, Clone)]
pub struct HotstringMatcher {
    buffer: KeystrokeBuffer,
    index: TriggerIndex,
}

impl HotstringMatcher {
    pub fn new(max_buffer_len: usize) -> Self {
        Self {
            buffer: KeystrokeBuffer::new(max_buffer_len),
            index: TriggerIndex::new(),
        }
    }

    /// Swap in a freshly built index. The buffer is kept.
    pub fn set_index(&mut self, index: TriggerIndex) {
        if index.longest() > self.buffer.max_len() {
            warn!(
                longest = index.longest(),
                max_buffer_len = self.buffer.max_len(),
                "Some hotstrings are longer than the keystroke buffer and can never fire"
            );
        }
        self.index = index;
    }

    pub fn index(&self) -> &TriggerIndex {
        &self.index
    }

    pub fn clear_index(&mut self) {
        self.index.clear();
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    pub fn buffer(&self) -> &KeystrokeBuffer {
        &self.buffer
    }

    /// Feed one key. Returns the match it completed, if any.
    ///
    /// The buffer is cleared on every match and on every delimiter.
    pub fn process_key(&mut self, key: &KeyInput) -> Option<TriggerMatch> {
        match key {
            KeyInput::Char(c) => {
                self.buffer.push(*c);
                self.take_match(0)
            }
            KeyInput::Backspace => {
                self.buffer.pop();
                None
            }
            KeyInput::Space | KeyInput::Enter | KeyInput::Tab | KeyInput::Escape => {
                let result = self.take_match(key.typed_width());
                self.buffer.clear();
                result
            }
            KeyInput::Other(_) => None,
        }
    }

    fn take_match(&mut self, extra_chars: usize) -> Option<TriggerMatch> {
        let entry = self.index.longest_suffix_match(&self.buffer)?;
        let result = TriggerMatch {
            command_id: entry.command_id.clone(),
            trigger: entry.trigger.clone(),
            chars_to_delete: entry.trigger_chars + extra_chars,
        };
        self.buffer.clear();
        Some(result)
    }
}
