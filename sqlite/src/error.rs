//! Error types for migration engine operations.
//!
//! Provides a unified error type covering connection, script loading,
//! ledger access, and statement execution failures.

use thiserror::Error;
use toolbox_db::{Direction, ScriptError};

/// Errors that can occur while migrating a database.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// No connection string was configured.
    #[error("connection string is empty")]
    EmptyConnectionString,

    /// The configured driver is not available in this build.
    #[error("unsupported database driver '{0}'")]
    UnsupportedDriver(String),

    /// The configured dialect does not match the driver.
    #[error("unsupported database dialect '{0}'")]
    UnsupportedDialect(String),

    /// The database could not be opened or did not answer a ping.
    #[error("database is unreachable: {0}")]
    Connection(#[source] rusqlite::Error),

    /// Schema or ledger table name contains invalid characters.
    #[error("invalid identifier '{0}': must contain only alphanumeric characters and underscores")]
    InvalidIdentifier(String),

    /// The ledger schema is SQLite's per-connection temporary database.
    #[error("schema '{0}' is temporary: the ledger would be dropped when the connection closes")]
    TemporarySchema(String),

    /// Scripts could not be loaded or parsed.
    #[error("migration scripts unavailable: {0}")]
    Script(#[from] ScriptError),

    /// A script's statements failed; everything before it stays applied.
    #[error("error in migration {script} ({direction}): {source}")]
    Execution {
        /// Name of the failing script.
        script: String,
        /// Direction being applied.
        direction: Direction,
        /// Scripts completed before the failure.
        applied: usize,
        /// The SQL error.
        #[source]
        source: rusqlite::Error,
    },

    /// The ledger references a script the source does not provide.
    #[error("unknown migration in database: {0}")]
    UnknownMigration(String),

    /// A single named script is not available to run in the direction:
    /// missing from the source, or already in the target state.
    #[error("migration {script} cannot be migrated {direction}")]
    NotPending {
        /// Requested script name.
        script: String,
        /// Requested direction.
        direction: Direction,
    },

    /// A ledger row carries an unreadable timestamp.
    #[error("invalid applied_at value '{value}' for migration {name}")]
    InvalidTimestamp {
        /// Ledger row name.
        name: String,
        /// Raw column value.
        value: String,
    },

    /// SQLite operation failure outside of script execution.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A lower-level error with the operation that hit it.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted.
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Wraps the error with a line describing the failed operation.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Number of scripts that were applied before the failure.
    ///
    /// Zero for every error raised before the first script ran.
    pub fn applied_steps(&self) -> usize {
        match self {
            Self::Execution { applied, .. } => *applied,
            Self::Context { source, .. } => source.applied_steps(),
            _ => 0,
        }
    }

    /// Returns the innermost error, skipping context wrappers.
    pub fn root(&self) -> &MigrateError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convenience alias for results with [`MigrateError`].
pub type Result<T> = std::result::Result<T, MigrateError>;
