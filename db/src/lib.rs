//! Migration scripts, their sources, and migrator configuration.
//!
//! This crate holds everything about migrations that does not need a
//! database connection:
//!
//! - [`MigrationScript`] — a parsed `.sql` file with Up and Down statements.
//! - [`ScriptSource`] — a directory-like view scripts are loaded from, with
//!   [`DirSource`] and [`MemorySource`] implementations.
//! - [`MigrationRow`] / [`MigrationInfo`] — ledger rows and the combined
//!   report of scripts vs. applied rows.
//! - [`MigratorConfig`] — YAML-backed settings for the migrator.
//! - Script file naming and templates for generated scripts.
//!
//! # Quick start
//!
//! ```no_run
//! use toolbox_db::{DirSource, load_scripts};
//!
//! let scripts = load_scripts(&DirSource::new("sql-migration-scripts")).unwrap();
//! for script in &scripts {
//!     println!("{}: {} up / {} down statements",
//!         script.name, script.up_statements.len(), script.down_statements.len());
//! }
//! ```

mod config;
mod error;
mod models;
mod script;
mod source;
mod template;

pub use config::{
    DEFAULT_DATABASE_DIALECT, DEFAULT_DATABASE_DRIVER, DEFAULT_DATABASE_SCHEMA,
    DEFAULT_LEDGER_TABLE, DEFAULT_SCRIPT_DIR, DatabaseSettings, MigratorConfig,
};
pub use error::{ParseError, Result, ScriptError};
pub use models::{Direction, MigrationInfo, MigrationRow, ScriptStatus};
pub use script::MigrationScript;
pub use source::{DirSource, MemorySource, SCRIPT_EXTENSION, ScriptSource, load_scripts};
pub use template::{
    TIMESTAMP_FORMAT, next_script_timestamp, parse_timestamp_prefix, sanitize_script_name,
    script_file_name, script_template,
};
