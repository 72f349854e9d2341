//! Error type for the migration CLI adapter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toolbox_db::ScriptError;
use toolbox_sqlite::MigrateError;

/// Errors returned by migration sub command tasks.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine failed; `action` names the sub command's goal.
    #[error("{action}: {source}")]
    Migrate {
        /// e.g. "Failed to migrate Up".
        action: &'static str,
        /// Engine error.
        #[source]
        source: MigrateError,
    },

    /// `generate` was called without a name.
    #[error("generate needs at least one script-name as an argument")]
    MissingScriptName,

    /// A script name cannot be used inside a file name.
    #[error("invalid script name '{0}': must be non-empty and contain no path separators")]
    InvalidScriptName(String),

    /// A generated script file could not be written.
    #[error("Failed to generate new migration script: {}: {source}", path.display())]
    Generate {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Writing to the output stream failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// Migration info could not be serialized.
    #[error("failed to render migration info as JSON: {0}")]
    Json(#[source] ScriptError),
}

impl CliError {
    pub(crate) fn migrate(action: &'static str) -> impl FnOnce(MigrateError) -> Self {
        move |source| Self::Migrate { action, source }
    }
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
