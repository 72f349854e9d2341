//! Migrator configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable SQLite configuration that only lacks a connection string.
//!
//! # Example YAML
//!
//! ```yaml
//! database:
//!   driver: sqlite3
//!   dialect: sqlite
//!   schema: main
//!   connection_string: app.db
//!   table: gorp_migrations
//!   ignore_unknown: false
//! script_dir: sql-migration-scripts
//! ```

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};

/// Default database driver.
pub const DEFAULT_DATABASE_DRIVER: &str = "sqlite3";

/// Default SQL dialect.
pub const DEFAULT_DATABASE_DIALECT: &str = "sqlite";

/// Default schema holding the ledger table.
pub const DEFAULT_DATABASE_SCHEMA: &str = "main";

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "gorp_migrations";

/// Default directory new scripts are generated into.
pub const DEFAULT_SCRIPT_DIR: &str = "sql-migration-scripts";

/// How to reach the database and where to keep the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database driver name.
    pub driver: String,
    /// SQL dialect name.
    pub dialect: String,
    /// Schema the ledger table lives in.
    pub schema: String,
    /// Driver-specific connection string (a file path for SQLite).
    pub connection_string: String,
    /// Ledger table name.
    pub table: String,
    /// Tolerate ledger rows whose script is no longer in the source.
    pub ignore_unknown: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: DEFAULT_DATABASE_DRIVER.to_string(),
            dialect: DEFAULT_DATABASE_DIALECT.to_string(),
            schema: DEFAULT_DATABASE_SCHEMA.to_string(),
            connection_string: String::new(),
            table: DEFAULT_LEDGER_TABLE.to_string(),
            ignore_unknown: false,
        }
    }
}

impl DatabaseSettings {
    /// Default settings pointing at `connection_string`.
    pub fn with_connection_string(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Self::default()
        }
    }
}

/// Top-level migrator configuration.
///
/// # Examples
///
/// ```
/// use toolbox_db::MigratorConfig;
///
/// let config: MigratorConfig = serde_yaml::from_str("database:\n  connection_string: app.db\n").unwrap();
/// assert_eq!(config.database.connection_string, "app.db");
/// assert_eq!(config.database.table, "gorp_migrations");
/// assert_eq!(config.script_dir.to_str(), Some("sql-migration-scripts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Database connection and ledger settings.
    pub database: DatabaseSettings,
    /// Directory scripts are read from and generated into.
    pub script_dir: PathBuf,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            script_dir: PathBuf::from(DEFAULT_SCRIPT_DIR),
        }
    }
}

impl MigratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] if the file cannot be read, or
    /// [`ScriptError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| ScriptError::io(path, e))?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] if the file cannot be created or the
    /// buffered contents cannot be flushed to it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| ScriptError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_yaml::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| ScriptError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: MigratorConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, MigratorConfig::default());
        assert_eq!(config.database.driver, "sqlite3");
        assert_eq!(config.database.dialect, "sqlite");
        assert_eq!(config.database.schema, "main");
        assert!(config.database.connection_string.is_empty());
        assert!(!config.database.ignore_unknown);
    }

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
database:
  driver: sqlite
  dialect: sqlite
  schema: main
  connection_string: /var/lib/app/app.db
  table: schema_ledger
  ignore_unknown: true
script_dir: db/migrations
"#;
        let config: MigratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database.driver, "sqlite");
        assert_eq!(config.database.connection_string, "/var/lib/app/app.db");
        assert_eq!(config.database.table, "schema_ledger");
        assert!(config.database.ignore_unknown);
        assert_eq!(config.script_dir, PathBuf::from("db/migrations"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrator.yml");

        let mut original = MigratorConfig::default();
        original.database = DatabaseSettings::with_connection_string("app.db");
        original.save(&path).unwrap();

        assert_eq!(MigratorConfig::load(&path).unwrap(), original);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_reports_flush_failure() {
        // /dev/full accepts the open but fails every write with ENOSPC.
        let err = MigratorConfig::default().save("/dev/full").unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. } | ScriptError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MigratorConfig::load(dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }
}
