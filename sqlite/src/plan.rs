//! Choosing which scripts a migration run touches.
//!
//! Planning is a pure function of the available scripts and the ledger:
//! migrating up selects unapplied scripts in name order, migrating down
//! selects applied scripts newest first. A non-zero step limit truncates the
//! selection.

use std::collections::HashSet;

use toolbox_db::{Direction, MigrationRow, MigrationScript};

use crate::error::{MigrateError, Result};

/// Scripts selected for one migration run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Direction the scripts will be run in.
    pub direction: Direction,
    /// Scripts to run, in order.
    pub scripts: Vec<MigrationScript>,
}

impl MigrationPlan {
    /// Returns `true` if there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Number of scripts to run.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Names of the planned scripts, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.scripts.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Plans up to `max_steps` scripts (0 = all) in `direction`.
///
/// # Errors
///
/// Returns [`MigrateError::UnknownMigration`] for the first ledger row with
/// no matching script, unless `ignore_unknown` is set.
///
/// # Examples
///
/// ```
/// use toolbox_db::{Direction, MigrationScript};
/// use toolbox_sqlite::plan_migrations;
///
/// let scripts: Vec<_> = ["03-add-users.sql", "04-add-username.sql"]
///     .into_iter()
///     .map(|name| MigrationScript::parse(name, "-- +migrate Up\n").unwrap())
///     .collect();
///
/// let plan = plan_migrations(&scripts, &[], Direction::Up, 1, false).unwrap();
/// assert_eq!(plan.names(), ["03-add-users.sql"]);
///
/// let plan = plan_migrations(&scripts, &[], Direction::Down, 0, false).unwrap();
/// assert!(plan.is_empty());
/// ```
pub fn plan_migrations(
    scripts: &[MigrationScript],
    rows: &[MigrationRow],
    direction: Direction,
    max_steps: usize,
    ignore_unknown: bool,
) -> Result<MigrationPlan> {
    let applied: HashSet<&str> = rows.iter().map(|row| row.name.as_str()).collect();

    if !ignore_unknown {
        let known: HashSet<&str> = scripts.iter().map(|s| s.name.as_str()).collect();
        if let Some(row) = rows.iter().find(|row| !known.contains(row.name.as_str())) {
            return Err(MigrateError::UnknownMigration(row.name.clone()));
        }
    }

    let mut selected: Vec<MigrationScript> = match direction {
        Direction::Up => scripts
            .iter()
            .filter(|s| !applied.contains(s.name.as_str()))
            .cloned()
            .collect(),
        Direction::Down => scripts
            .iter()
            .rev()
            .filter(|s| applied.contains(s.name.as_str()))
            .cloned()
            .collect(),
    };

    if max_steps > 0 {
        selected.truncate(max_steps);
    }

    Ok(MigrationPlan {
        direction,
        scripts: selected,
    })
}
