use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for Stratum
#[derive(Error, Debug)]
pub enum StratumError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keyboard hook installation failed: {0}")]
    HookInstall(String),

    #[error("Keystroke injection failed: {0}")]
    Inject(String),

    #[error("Hotkey error: {0}")]
    Hotkey(String),

    #[error("Vault error: {0}")]
    Vault(String),
}

impl StratumError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn json(path: impl AsRef<std::path::Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Short message suitable for a status line or CLI output.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { path, .. } => format!("Could not access {}", path),
            Self::Json { path, .. } => format!("{} is not valid JSON", path),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::HookInstall(_) => {
                "Hotstrings are unavailable: global keyboard input could not be observed"
                    .to_string()
            }
            Self::Inject(msg) => format!("Could not type into the focused window: {}", msg),
            Self::Hotkey(msg) => msg.clone(),
            Self::Vault(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StratumError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use stratum::error::ResultExt;
///
/// // Log and continue if the vault fails to save
/// vault.save().log_err();
///
/// // Log as warning for expected failures
/// let config = read_settings().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_err_passes_ok_through() {
        let result: std::result::Result<u32, String> = Ok(7);
        assert_eq!(result.log_err(), Some(7));
    }

    #[test]
    fn warn_on_err_swallows_error() {
        let result: std::result::Result<u32, String> = Err("nope".to_string());
        assert_eq!(result.warn_on_err(), None);
    }

    #[test]
    fn user_message_names_the_path() {
        let err = StratumError::io(
            "/tmp/commands.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.user_message().contains("/tmp/commands.json"));
        assert!(err.to_string().contains("missing"));
    }
}
