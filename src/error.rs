//! Error types for settings loading and editor commands.
//!
//! Editing operations are total and never fail; only reading configuration and
//! decoding client command arguments can.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// File could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// settings.toml is malformed
    #[error("failed to parse '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Custom function export is malformed
    #[error("failed to parse function export '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Client-supplied configuration has the wrong shape
    #[error("invalid configuration: {0}")]
    Configuration(#[from] serde_json::Error),

    /// A custom function record cannot be used
    #[error("invalid custom function #{id}: {reason}")]
    InvalidFunction { id: u64, reason: String },
}

/// Failures of `workspace/executeCommand` requests.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command '{command}' expects {expected} arguments")]
    MissingArguments {
        command: &'static str,
        expected: usize,
    },

    #[error("invalid argument for '{command}': {source}")]
    InvalidArgument {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}
