//! Stratum - a desktop productivity assistant.
//!
//! The core is a system-wide hotstring engine: it watches typed keys, and when
//! the recent keystrokes end with a registered trigger it erases the trigger
//! and runs the bound command. Commands also bind to global hotkeys and can
//! insert values from the vault.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod hotkeys;
pub mod hotstrings;
pub mod keyboard_hook;
pub mod logging;
pub mod shortcuts;
pub mod snippet_handler;
pub mod text_injector;
pub mod vault;
pub mod watcher;
