//! Plugin system: trait-based command providers with explicit registration.
//!
//! Each plugin implements the [`Plugin`] trait, declares its commands and the
//! keywords that reach them, and is registered in a
//! [`CommandRegistry`](registry::CommandRegistry).

pub mod builtin;
pub mod registry;

use crate::error::PluginResult;

pub use registry::{CommandRegistry, CommandRoute, DispatchOutcome, KeywordMatching, ResolvedCommand};

/// A command a plugin offers and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command identifier, unique within the plugin.
    pub id: String,
    /// Trigger keywords, matched case-insensitively against utterances.
    pub keywords: Vec<String>,
}

impl CommandSpec {
    /// Create a spec from string slices.
    pub fn new(id: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            id: id.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// A provider of user-invocable commands.
pub trait Plugin: Send + Sync {
    /// Display name; doubles as the registry key.
    fn id(&self) -> &str;

    /// What this plugin does.
    fn description(&self) -> &str;

    /// Declared commands in registration order.
    fn commands(&self) -> Vec<CommandSpec>;

    /// Run `command` for the utterance `text`.
    fn execute(&self, command: &str, text: &str) -> PluginResult<String>;

    /// Whether dispatching `command` ends the assistant loop.
    fn is_stop_command(&self, _command: &str) -> bool {
        false
    }
}
