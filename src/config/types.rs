//! Configuration type definitions
//!
//! Every field is optional on disk; getters fall back to `defaults`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::text_injector::TextInjectorConfig;

// ============================================
// HOTSTRINGS
// ============================================

/// Settings for the hotstring engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotstringSettings {
    /// Global enable flag (default: true)
    #[serde(default = "default_hotstrings_enabled")]
    pub enabled: bool,
    /// Keystroke buffer capacity in characters (default: 50)
    #[serde(default = "default_max_buffer_len")]
    pub max_buffer_len: usize,
}

fn default_hotstrings_enabled() -> bool {
    DEFAULT_HOTSTRINGS_ENABLED
}
fn default_max_buffer_len() -> usize {
    DEFAULT_MAX_BUFFER_LEN
}

impl Default for HotstringSettings {
    fn default() -> Self {
        HotstringSettings {
            enabled: DEFAULT_HOTSTRINGS_ENABLED,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
        }
    }
}

// ============================================
// INJECTOR TIMING
// ============================================

/// Timing knobs for synthesized keystrokes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectorSettings {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_key_delay_ms")]
    pub key_delay_ms: u64,
    #[serde(default = "default_paste_delay_ms")]
    pub paste_delay_ms: u64,
    /// Matching stays suspended this long after a dispatch finishes
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}
fn default_key_delay_ms() -> u64 {
    DEFAULT_KEY_DELAY_MS
}
fn default_paste_delay_ms() -> u64 {
    DEFAULT_PASTE_DELAY_MS
}
fn default_resume_delay_ms() -> u64 {
    DEFAULT_RESUME_DELAY_MS
}

impl Default for InjectorSettings {
    fn default() -> Self {
        InjectorSettings {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            key_delay_ms: DEFAULT_KEY_DELAY_MS,
            paste_delay_ms: DEFAULT_PASTE_DELAY_MS,
            resume_delay_ms: DEFAULT_RESUME_DELAY_MS,
        }
    }
}

impl InjectorSettings {
    pub fn to_injector_config(&self) -> TextInjectorConfig {
        TextInjectorConfig {
            key_delay_ms: self.key_delay_ms,
            paste_delay_ms: self.paste_delay_ms,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotstrings: Option<HotstringSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injector: Option<InjectorSettings>,
    /// Path to commands.json (tilde is expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands_path: Option<String>,
    /// Path to vault.json (tilde is expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<String>,
    /// Reload commands.json when it changes (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_commands: Option<bool>,
    /// tracing filter directive, e.g. "debug" or "info,stratum::hotstrings=trace"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn get_hotstrings(&self) -> HotstringSettings {
        self.hotstrings.clone().unwrap_or_default()
    }

    pub fn get_injector(&self) -> InjectorSettings {
        self.injector.clone().unwrap_or_default()
    }

    pub fn get_commands_path(&self) -> PathBuf {
        self.commands_path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| app_dir().join(COMMANDS_FILE_NAME))
    }

    pub fn get_vault_path(&self) -> PathBuf {
        self.vault_path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| app_dir().join(VAULT_FILE_NAME))
    }

    pub fn get_watch_commands(&self) -> bool {
        self.watch_commands.unwrap_or(DEFAULT_WATCH_COMMANDS)
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// ~/.stratum, or a temp dir when there is no home directory
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("stratum"))
}

/// Default location of settings.json
pub fn default_config_path() -> PathBuf {
    app_dir().join(SETTINGS_FILE_NAME)
}
