//! Ledger table SQL.
//!
//! The ledger records one row per applied script:
//!
//! - `name` — script file name, primary key
//! - `applied_at` — RFC3339 UTC timestamp of the commit
//!
//! The table lives in a configurable schema: `main`, or the name of a
//! database attached to the connection. `temp` is rejected because SQLite
//! discards it with every connection. Schema and table names are
//! interpolated into SQL, so both must contain only alphanumeric characters
//! and underscores.

use crate::error::{MigrateError, Result};

/// Validates that an identifier contains only alphanumeric characters and underscores.
pub(crate) fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(MigrateError::InvalidIdentifier(identifier.to_string()));
    }
    if !identifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(MigrateError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

/// Fully qualified, validated ledger table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTable {
    schema: String,
    table: String,
}

impl LedgerTable {
    /// Creates the ledger name for `table` inside `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidIdentifier`] if either name is empty or
    /// contains characters other than alphanumerics and underscores, and
    /// [`MigrateError::TemporarySchema`] for SQLite's `temp` schema. A schema
    /// that is not attached is reported by SQLite when the ledger is first
    /// touched.
    pub fn new(schema: &str, table: &str) -> Result<Self> {
        validate_identifier(schema)?;
        validate_identifier(table)?;
        if schema.eq_ignore_ascii_case("temp") {
            return Err(MigrateError::TemporarySchema(schema.to_string()));
        }
        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    /// Returns `schema.table`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub(crate) fn create_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    name TEXT NOT NULL PRIMARY KEY,\n    applied_at TEXT NOT NULL\n)",
            self.qualified_name()
        )
    }

    pub(crate) fn select_sql(&self) -> String {
        format!(
            "SELECT name, applied_at FROM {} ORDER BY name",
            self.qualified_name()
        )
    }

    pub(crate) fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (name, applied_at) VALUES (?1, ?2)",
            self.qualified_name()
        )
    }

    pub(crate) fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE name = ?1", self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("main").is_ok());
        assert!(validate_identifier("gorp_migrations").is_ok());
        assert!(validate_identifier("Ledger2").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("drop;--").is_err());
        assert!(validate_identifier("my table").is_err());
        assert!(validate_identifier("a.b").is_err());
    }

    #[test]
    fn test_ledger_sql_uses_qualified_name() {
        let ledger = LedgerTable::new("main", "gorp_migrations").unwrap();
        assert_eq!(ledger.qualified_name(), "main.gorp_migrations");
        assert!(ledger
            .create_sql()
            .starts_with("CREATE TABLE IF NOT EXISTS main.gorp_migrations"));
        assert!(ledger.select_sql().contains("FROM main.gorp_migrations ORDER BY name"));
        assert!(ledger.insert_sql().starts_with("INSERT INTO main.gorp_migrations"));
        assert!(ledger.delete_sql().starts_with("DELETE FROM main.gorp_migrations"));
    }

    #[test]
    fn test_ledger_rejects_bad_schema() {
        assert!(matches!(
            LedgerTable::new("public;", "gorp_migrations"),
            Err(MigrateError::InvalidIdentifier(name)) if name == "public;"
        ));
    }

    #[test]
    fn test_ledger_rejects_temp_schema() {
        for schema in ["temp", "TEMP"] {
            assert!(matches!(
                LedgerTable::new(schema, "gorp_migrations"),
                Err(MigrateError::TemporarySchema(name)) if name == schema
            ));
        }
    }

    #[test]
    fn test_create_sql_is_idempotent() {
        let ledger = LedgerTable::new("main", "gorp_migrations").unwrap();
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(&ledger.create_sql()).unwrap();
        conn.execute_batch(&ledger.create_sql()).unwrap();
        conn.execute(&ledger.insert_sql(), ["a.sql", "2024-01-01T00:00:00Z"])
            .unwrap();
        assert!(conn
            .execute(&ledger.insert_sql(), ["a.sql", "2024-01-01T00:00:01Z"])
            .is_err());
    }
}
