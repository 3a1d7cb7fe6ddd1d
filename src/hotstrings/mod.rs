//! System-wide hotstring detection.
//!
//! - `keys` - key-event normalization
//! - `buffer` - rolling keystroke buffer
//! - `matcher` - trigger index and suffix matching
//! - `engine` - hook wiring and asynchronous dispatch

mod buffer;
mod engine;
mod keys;
mod matcher;

pub use buffer::KeystrokeBuffer;
pub use engine::{EngineConfig, EngineState, HotstringControl, HotstringEngine};
pub use keys::{fold_char, normalize_trigger, KeyInput};
pub use matcher::{HotstringMatcher, TriggerEntry, TriggerIndex, TriggerMatch};
