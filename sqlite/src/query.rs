//! Runtime access to ledger rows.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use toolbox_db::MigrationRow;

use crate::error::{MigrateError, Result};
use crate::schema::LedgerTable;

impl LedgerTable {
    /// Creates the ledger table if it does not exist yet.
    pub(crate) fn ensure(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(&self.create_sql())?;
        Ok(())
    }

    /// Reads every ledger row, ordered by name.
    pub(crate) fn rows(&self, conn: &Connection) -> Result<Vec<MigrationRow>> {
        let mut stmt = conn.prepare(&self.select_sql())?;
        let raw = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(name, value)| match DateTime::parse_from_rfc3339(&value) {
                Ok(applied_at) => Ok(MigrationRow {
                    name,
                    applied_at: applied_at.with_timezone(&Utc),
                }),
                Err(_) => Err(MigrateError::InvalidTimestamp { name, value }),
            })
            .collect()
    }

    /// Marks `name` as applied at `applied_at`.
    pub(crate) fn record(
        &self,
        conn: &Connection,
        name: &str,
        applied_at: DateTime<Utc>,
    ) -> rusqlite::Result<()> {
        conn.execute(
            &self.insert_sql(),
            params![name, applied_at.to_rfc3339_opts(SecondsFormat::Micros, true)],
        )?;
        Ok(())
    }

    /// Removes the ledger row of `name`.
    pub(crate) fn forget(&self, conn: &Connection, name: &str) -> rusqlite::Result<()> {
        conn.execute(&self.delete_sql(), params![name])?;
        Ok(())
    }
}
