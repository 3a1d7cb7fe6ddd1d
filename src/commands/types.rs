//! Command records and action handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A registered, executable unit of behavior.
///
/// `action` is an action id optionally suffixed with `:arg`
/// (e.g. `vault.insert:openai_main`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub hotkey: String,
    #[serde(default)]
    pub hotstring: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Command {
    pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            action: action.into(),
            hotkey: String::new(),
            hotstring: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_hotkey(mut self, hotkey: impl Into<String>) -> Self {
        self.hotkey = hotkey.into();
        self
    }

    pub fn with_hotstring(mut self, hotstring: impl Into<String>) -> Self {
        self.hotstring = hotstring.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Split `action` into `(base, arg)` at the first `:`.
    ///
    /// Returns `None` for an empty action.
    pub fn parsed_action(&self) -> Option<(&str, Option<&str>)> {
        parse_action(&self.action)
    }
}

/// Split an action string into its handler id and optional argument.
pub fn parse_action(action: &str) -> Option<(&str, Option<&str>)> {
    if action.is_empty() {
        return None;
    }
    match action.split_once(':') {
        Some((base, arg)) => Some((base, Some(arg))),
        None => Some((action, None)),
    }
}

/// Partial update for an existing command; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandUpdate {
    pub label: Option<String>,
    pub action: Option<String>,
    pub hotkey: Option<String>,
    pub hotstring: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CommandUpdate {
    pub(crate) fn apply(self, command: &mut Command) {
        if let Some(label) = self.label {
            command.label = label;
        }
        if let Some(action) = self.action {
            command.action = action;
        }
        if let Some(hotkey) = self.hotkey {
            command.hotkey = hotkey;
        }
        if let Some(hotstring) = self.hotstring {
            command.hotstring = hotstring;
        }
        if let Some(tags) = self.tags {
            command.tags = tags;
        }
    }
}

/// Runtime behavior bound to an action id, resolved at execution time.
#[derive(Clone)]
pub enum ActionHandler {
    /// Called for actions without a `:arg` suffix
    NoArg(Arc<dyn Fn() + Send + Sync>),
    /// Called with the text after the first `:`
    WithArg(Arc<dyn Fn(&str) + Send + Sync>),
}

impl ActionHandler {
    pub fn no_arg<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        Self::NoArg(Arc::new(f))
    }

    pub fn with_arg<F: Fn(&str) + Send + Sync + 'static>(f: F) -> Self {
        Self::WithArg(Arc::new(f))
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArg(_) => f.write_str("ActionHandler::NoArg"),
            Self::WithArg(_) => f.write_str("ActionHandler::WithArg"),
        }
    }
}
