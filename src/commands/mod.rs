//! Command registry: command records, action handlers and execution.

mod registry;
mod types;

pub use registry::CommandRegistry;
pub use types::{parse_action, ActionHandler, Command, CommandUpdate};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
