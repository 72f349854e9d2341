//! Error types for migration script and configuration handling.
//!
//! Provides a unified error type covering script source access, script
//! parsing, and configuration (de)serialization failures.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed marker syntax found while parsing a migration script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `-- +migrate` line without a command.
    #[error("line {line}: incomplete migration command")]
    IncompleteCommand {
        /// 1-based line number.
        line: usize,
    },

    /// A `-- +migrate` line with a command other than Up, Down,
    /// StatementBegin or StatementEnd.
    #[error("line {line}: unknown migration command '{command}'")]
    UnknownCommand {
        /// 1-based line number.
        line: usize,
        /// The unrecognized command word.
        command: String,
    },

    /// An option other than `notransaction` on an Up/Down marker.
    #[error("line {line}: unknown option '{option}'")]
    UnknownOption {
        /// 1-based line number.
        line: usize,
        /// The unrecognized option word.
        option: String,
    },

    /// `StatementEnd` without a preceding `StatementBegin`.
    #[error("line {line}: '-- +migrate StatementEnd' without a matching StatementBegin")]
    UnexpectedStatementEnd {
        /// 1-based line number.
        line: usize,
    },

    /// The script ended inside a `StatementBegin` block.
    #[error("saw '-- +migrate StatementBegin' with no matching '-- +migrate StatementEnd'")]
    UnterminatedBlock,

    /// A statement was left open when a direction marker or the end of the
    /// file was reached.
    #[error(
        "the last statement must be ended by a semicolon or a '-- +migrate StatementEnd' marker"
    )]
    MissingTerminator,

    /// The script has neither an Up nor a Down marker.
    #[error("no Up/Down annotations found, so no statements would be executed")]
    NoDirection,
}

/// Errors that can occur while loading migration scripts or configuration.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// No script source was configured.
    #[error("migration script source is not set")]
    SourceUnset,

    /// A source entry could not be listed or read.
    #[error("failed to read migration source '{}': {source}", path.display())]
    Io {
        /// Directory or file that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Requested script is not part of the source.
    #[error("migration script not found: {0}")]
    NotFound(String),

    /// A script's marker syntax is malformed.
    #[error("failed to parse migration script '{script}': {source}")]
    Parse {
        /// Name of the offending script.
        script: String,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScriptError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`ScriptError`].
pub type Result<T> = std::result::Result<T, ScriptError>;
