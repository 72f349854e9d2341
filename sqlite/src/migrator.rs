//! The migration engine.
//!
//! [`Migrator`] is the seam the CLI talks to; [`DatabaseMigrator`] is the
//! SQLite implementation. Every call opens its own connection and closes it
//! before returning.
//!
//! # Example
//!
//! ```no_run
//! use toolbox_db::{DatabaseSettings, Direction, DirSource};
//! use toolbox_sqlite::{DatabaseMigrator, Migrator};
//!
//! let migrator = DatabaseMigrator::new(DatabaseSettings::with_connection_string("app.db"))
//!     .with_source(DirSource::new("sql-migration-scripts"));
//!
//! let applied = migrator.migrate(Direction::Up, 0).unwrap();
//! println!("applied {applied} scripts");
//!
//! let info = migrator.get_migration_info().unwrap();
//! println!("{} pending", info.pending_count());
//! ```

use chrono::Utc;
use rusqlite::Connection;
use toolbox_db::{
    DatabaseSettings, Direction, MigrationInfo, MigrationRow, MigrationScript, ScriptError,
    ScriptSource, load_scripts,
};
use tracing::{debug, info, warn};

use crate::error::{MigrateError, Result};
use crate::plan::{MigrationPlan, plan_migrations};
use crate::schema::LedgerTable;

const SUPPORTED_DRIVERS: [&str; 2] = ["sqlite3", "sqlite"];
const SUPPORTED_DIALECT: &str = "sqlite";

/// Which scripts a run picks from the plan.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// Up to this many scripts, 0 meaning all.
    Steps(usize),
    /// Exactly the named script.
    Script(&'a str),
}

/// Operations the CLI needs from a migration engine.
pub trait Migrator {
    /// Applies up to `max_steps` scripts (0 = all) in `direction`.
    ///
    /// Returns the number of scripts applied. On failure the error's
    /// [`MigrateError::applied_steps`] tells how many completed first.
    fn migrate(&self, direction: Direction, max_steps: usize) -> Result<usize>;

    /// Applies the single script `name` in `direction`.
    ///
    /// Up requires the script to be unapplied, Down requires it to be
    /// applied. Anything else fails with [`MigrateError::NotPending`].
    fn migrate_script(&self, direction: Direction, name: &str) -> Result<()>;

    /// Loads every available script, sorted by name.
    fn get_migration_scripts(&self) -> Result<Vec<MigrationScript>>;

    /// Reads the ledger, creating the table if needed.
    fn get_migration_rows(&self) -> Result<Vec<MigrationRow>>;

    /// Combines scripts and ledger rows into one report.
    fn get_migration_info(&self) -> Result<MigrationInfo> {
        let migration_scripts = self
            .get_migration_scripts()
            .map_err(|e| e.context("failed to look up available migration scripts"))?;
        let migration_rows = self
            .get_migration_rows()
            .map_err(|e| e.context("failed to look up migration rows in the database"))?;
        Ok(MigrationInfo {
            migration_scripts,
            migration_rows,
        })
    }

    /// Computes what [`migrate`](Self::migrate) would run, without running it.
    fn plan(&self, direction: Direction, max_steps: usize) -> Result<MigrationPlan> {
        let info = self.get_migration_info()?;
        plan_migrations(
            &info.migration_scripts,
            &info.migration_rows,
            direction,
            max_steps,
            false,
        )
    }
}

/// SQLite-backed [`Migrator`].
#[derive(Debug)]
pub struct DatabaseMigrator {
    settings: DatabaseSettings,
    source: Option<Box<dyn ScriptSource>>,
}

impl DatabaseMigrator {
    /// Creates a migrator without a script source.
    ///
    /// Settings are checked lazily, so a migrator built from empty settings
    /// only fails once an operation needs the database or the scripts.
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            settings,
            source: None,
        }
    }

    /// Sets the source scripts are loaded from.
    pub fn with_source(mut self, source: impl ScriptSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Settings this migrator was built with.
    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    fn ledger(&self) -> Result<LedgerTable> {
        LedgerTable::new(&self.settings.schema, &self.settings.table)
    }

    fn connect(&self) -> Result<Connection> {
        let settings = &self.settings;
        if !SUPPORTED_DRIVERS.contains(&settings.driver.as_str()) {
            return Err(MigrateError::UnsupportedDriver(settings.driver.clone()));
        }
        if settings.dialect != SUPPORTED_DIALECT {
            return Err(MigrateError::UnsupportedDialect(settings.dialect.clone()));
        }
        if settings.connection_string.trim().is_empty() {
            return Err(MigrateError::EmptyConnectionString);
        }

        let conn = Connection::open(&settings.connection_string).map_err(MigrateError::Connection)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(MigrateError::Connection)?;
        debug!(database = %settings.connection_string, "opened database connection");
        Ok(conn)
    }

    /// Runs `f` on a fresh connection and closes it afterwards, whatever the
    /// outcome of `f`.
    fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.connect()?;
        let result = f(&mut conn);
        if let Err((_, err)) = conn.close() {
            warn!(error = %err, "failed to close database connection");
        }
        result
    }

    /// Connects, loads the scripts, then applies the planned ones.
    fn run(&self, direction: Direction, target: Target<'_>) -> Result<usize> {
        let ledger = self.ledger()?;

        self.with_connection(|conn| {
            let scripts = self.get_migration_scripts()?;
            ledger.ensure(conn)?;
            let rows = ledger.rows(conn)?;
            let max_steps = match target {
                Target::Steps(max_steps) => max_steps,
                Target::Script(_) => 0,
            };
            let mut plan = plan_migrations(
                &scripts,
                &rows,
                direction,
                max_steps,
                self.settings.ignore_unknown,
            )?;
            if let Target::Script(name) = target {
                plan.scripts.retain(|script| script.name == name);
                if plan.is_empty() {
                    return Err(MigrateError::NotPending {
                        script: name.to_string(),
                        direction,
                    });
                }
            }
            debug!(%direction, planned = plan.len(), "planned migration");

            for (applied, script) in plan.scripts.iter().enumerate() {
                apply_script(conn, &ledger, script, direction).map_err(|source| {
                    MigrateError::Execution {
                        script: script.name.clone(),
                        direction,
                        applied,
                        source,
                    }
                })?;
                info!(script = %script.name, %direction, "applied migration");
            }
            Ok(plan.len())
        })
    }
}

impl Migrator for DatabaseMigrator {
    fn migrate(&self, direction: Direction, max_steps: usize) -> Result<usize> {
        self.run(direction, Target::Steps(max_steps))
            .map_err(with_run_context)
    }

    fn migrate_script(&self, direction: Direction, name: &str) -> Result<()> {
        self.run(direction, Target::Script(name))
            .map(|_| ())
            .map_err(with_run_context)
    }

    fn get_migration_scripts(&self) -> Result<Vec<MigrationScript>> {
        let source = self.source.as_deref().ok_or(ScriptError::SourceUnset)?;
        let scripts = load_scripts(source)?;
        debug!(count = scripts.len(), "loaded migration scripts");
        Ok(scripts)
    }

    fn get_migration_rows(&self) -> Result<Vec<MigrationRow>> {
        let ledger = self.ledger()?;
        self.with_connection(|conn| {
            ledger.ensure(conn)?;
            ledger.rows(conn)
        })
    }

    fn plan(&self, direction: Direction, max_steps: usize) -> Result<MigrationPlan> {
        let info = self.get_migration_info()?;
        plan_migrations(
            &info.migration_scripts,
            &info.migration_rows,
            direction,
            max_steps,
            self.settings.ignore_unknown,
        )
    }
}

fn with_run_context(err: MigrateError) -> MigrateError {
    match err {
        MigrateError::Execution { .. } => err.context("failed to execute migration"),
        other => other.context("failed to set up migration"),
    }
}

/// Runs one script's statements and its ledger update, inside a transaction
/// unless the direction is marked `notransaction`.
fn apply_script(
    conn: &mut Connection,
    ledger: &LedgerTable,
    script: &MigrationScript,
    direction: Direction,
) -> rusqlite::Result<()> {
    if script.runs_in_transaction(direction) {
        let tx = conn.transaction()?;
        run_statements(&tx, ledger, script, direction)?;
        tx.commit()
    } else {
        run_statements(conn, ledger, script, direction)
    }
}

fn run_statements(
    conn: &Connection,
    ledger: &LedgerTable,
    script: &MigrationScript,
    direction: Direction,
) -> rusqlite::Result<()> {
    for statement in script.statements(direction) {
        conn.execute_batch(statement)?;
    }
    match direction {
        Direction::Up => ledger.record(conn, &script.name, Utc::now()),
        Direction::Down => ledger.forget(conn, &script.name),
    }
}
