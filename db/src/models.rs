//! Migration ledger and reporting types.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::script::MigrationScript;

/// Which statement set of a script to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Apply scripts forward and record them in the ledger.
    Up,
    /// Revert applied scripts and remove them from the ledger.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
        }
    }
}

/// One applied script as recorded in the ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRow {
    /// Name of the applied script.
    pub name: String,
    /// When the script's Up statements were committed.
    pub applied_at: DateTime<Utc>,
}

/// Status of a single script inside a [`MigrationInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStatus<'a> {
    /// Script name.
    pub name: &'a str,
    /// Time the script was applied, `None` when still pending.
    pub applied_at: Option<DateTime<Utc>>,
}

/// Snapshot of available scripts and applied ledger rows.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use toolbox_db::{MigrationInfo, MigrationRow, MigrationScript};
///
/// let script = |name: &str| MigrationScript::parse(name, "-- +migrate Up\n").unwrap();
/// let info = MigrationInfo {
///     migration_scripts: vec![script("01-a.sql"), script("02-b.sql")],
///     migration_rows: vec![MigrationRow { name: "01-a.sql".into(), applied_at: Utc::now() }],
/// };
///
/// assert_eq!(info.pending_count(), 1);
/// assert!(info.statuses()[0].applied_at.is_some());
/// assert!(info.statuses()[1].applied_at.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationInfo {
    /// Every script found in the source, ordered by name.
    pub migration_scripts: Vec<MigrationScript>,
    /// Every row found in the ledger table.
    pub migration_rows: Vec<MigrationRow>,
}

impl MigrationInfo {
    /// Pairs each script with its ledger timestamp, in script order.
    pub fn statuses(&self) -> Vec<ScriptStatus<'_>> {
        let applied: HashMap<&str, DateTime<Utc>> = self
            .migration_rows
            .iter()
            .map(|row| (row.name.as_str(), row.applied_at))
            .collect();

        self.migration_scripts
            .iter()
            .map(|script| ScriptStatus {
                name: &script.name,
                applied_at: applied.get(script.name.as_str()).copied(),
            })
            .collect()
    }

    /// Number of scripts not yet recorded in the ledger.
    pub fn pending_count(&self) -> usize {
        self.statuses()
            .iter()
            .filter(|status| status.applied_at.is_none())
            .count()
    }

    /// Ledger rows whose script is missing from the source.
    pub fn unknown_rows(&self) -> Vec<&MigrationRow> {
        self.migration_rows
            .iter()
            .filter(|row| !self.migration_scripts.iter().any(|s| s.name == row.name))
            .collect()
    }

    /// Serializes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
