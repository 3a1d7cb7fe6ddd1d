//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Hotstrings are on unless settings.json turns them off
pub const DEFAULT_HOTSTRINGS_ENABLED: bool = true;

/// Keystroke buffer capacity (characters)
pub const DEFAULT_MAX_BUFFER_LEN: usize = 50;

/// Delay before the undo keystrokes of a dispatch are sent (ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 30;

/// Delay between synthesized key presses (ms)
pub const DEFAULT_KEY_DELAY_MS: u64 = 2;

/// Delay around clipboard writes when pasting (ms)
pub const DEFAULT_PASTE_DELAY_MS: u64 = 50;

/// Delay after a dispatch before matching resumes (ms)
pub const DEFAULT_RESUME_DELAY_MS: u64 = 100;

/// Reload commands.json when it changes on disk
pub const DEFAULT_WATCH_COMMANDS: bool = true;

/// Application data directory, relative to $HOME
pub const APP_DIR_NAME: &str = ".stratum";

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const COMMANDS_FILE_NAME: &str = "commands.json";
pub const VAULT_FILE_NAME: &str = "vault.json";
