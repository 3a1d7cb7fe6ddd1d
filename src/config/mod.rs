//! Configuration module - Application settings
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and saving

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_MAX_BUFFER_LEN, SETTINGS_FILE_NAME};
pub use loader::{load_config, save_config};
pub use types::{
    app_dir, default_config_path, Config, HotstringSettings, InjectorSettings,
};

#[cfg(test)]
pub use defaults::{
    DEFAULT_HOTSTRINGS_ENABLED, DEFAULT_KEY_DELAY_MS, DEFAULT_PASTE_DELAY_MS,
    DEFAULT_RESUME_DELAY_MS, DEFAULT_SETTLE_DELAY_MS,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
