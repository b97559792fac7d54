//! Rich diagnostic error types for voxroute.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. The routing core contains most of these
//! failures itself; they surface to the user only through the CLI driver.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for voxroute.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum VoxError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

// ---------------------------------------------------------------------------
// Pattern store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("failed to read pattern file \"{path}\"")]
    #[diagnostic(
        code(voxroute::pattern::read),
        help(
            "The pattern file could not be read. The default intent table is used instead \
             and written back to this path."
        )
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern file \"{path}\": {message}")]
    #[diagnostic(
        code(voxroute::pattern::parse),
        help(
            "The file must be a JSON object with an `intents` key mapping each intent name \
             to its `patterns` and `response_templates` lists. Delete it to regenerate defaults."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write pattern file \"{path}\"")]
    #[diagnostic(
        code(voxroute::pattern::write),
        help(
            "Check that the data directory exists and is writable. \
             The in-memory intent table remains in use."
        )
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize intent table: {message}")]
    #[diagnostic(
        code(voxroute::pattern::serialize),
        help("This indicates a bug in the intent table serializer. Please file a report.")
    )]
    Serialize { message: String },

    #[error("invalid pattern for intent \"{intent}\": {pattern}")]
    #[diagnostic(
        code(voxroute::pattern::invalid_regex),
        help("The pattern is not a valid regular expression: {message}")
    )]
    InvalidRegex {
        intent: String,
        pattern: String,
        message: String,
    },

    #[error("intent name must not be empty")]
    #[diagnostic(
        code(voxroute::pattern::empty_intent),
        help("Pass a non-empty intent name, e.g. `voxroute learn refactor \"tidy up\"`.")
    )]
    EmptyIntent,
}

/// Convenience alias for pattern store operations.
pub type PatternResult<T> = std::result::Result<T, PatternError>;

// ---------------------------------------------------------------------------
// Plugin errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum PluginError {
    #[error("plugin \"{plugin}\" has no command \"{command}\"")]
    #[diagnostic(
        code(voxroute::plugin::unknown_command),
        help("The registry routed to a command the plugin does not declare in `commands()`.")
    )]
    UnknownCommand { plugin: String, command: String },

    #[error("{message}")]
    #[diagnostic(
        code(voxroute::plugin::execution),
        help("The plugin command \"{plugin}/{command}\" failed while running.")
    )]
    Execution {
        plugin: String,
        command: String,
        message: String,
    },
}

impl PluginError {
    /// Build an execution failure for `plugin/command`.
    pub fn execution(
        plugin: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Execution {
            plugin: plugin.into(),
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Result type returned by plugin commands.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(voxroute::config::read),
        help("Check that the file exists and is readable, or run `voxroute init`.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file \"{path}\": {message}")]
    #[diagnostic(
        code(voxroute::config::parse),
        help("The config file must be valid TOML. Remove unknown keys or fix the syntax.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config file: {path}")]
    #[diagnostic(
        code(voxroute::config::write),
        help("Check that the config directory exists and you have write permissions.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(
        code(voxroute::config::serialize),
        help("Every value must be representable in TOML; paths such as `project_root` must be valid UTF-8.")
    )]
    Serialize { message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(voxroute::config::invalid), help("{message}"))]
    Invalid { message: String },
}

/// Convenience alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Orchestrator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    #[error("the assistant has stopped and no longer accepts utterances")]
    #[diagnostic(
        code(voxroute::orchestrator::stopped),
        help(
            "A stop command was dispatched on an earlier turn. \
             Check `Turn::keep_running` and end the input loop when it is false."
        )
    )]
    Stopped,
}

/// Convenience alias for voxroute results.
pub type VoxResult<T> = std::result::Result<T, VoxError>;
