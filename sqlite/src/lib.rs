//! Versioned SQL migrations on SQLite.
//!
//! This crate applies the scripts described by [`toolbox_db`] to a SQLite
//! database and tracks which of them ran in a ledger table. Scripts are
//! applied in file-name order; each one runs in a transaction together with
//! its ledger update.
//!
//! # Architecture
//!
//! - **`schema`** — ledger table naming and SQL generation
//! - **`query`** — ledger reads and writes
//! - **`plan`** — choosing the scripts a run touches
//! - **`migrator`** — the [`Migrator`] trait and [`DatabaseMigrator`]
//!
//! # Quick start
//!
//! ```no_run
//! use toolbox_db::{DatabaseSettings, Direction, DirSource};
//! use toolbox_sqlite::{DatabaseMigrator, Migrator};
//!
//! let migrator = DatabaseMigrator::new(DatabaseSettings::with_connection_string("app.db"))
//!     .with_source(DirSource::new("sql-migration-scripts"));
//!
//! migrator.migrate(Direction::Up, 0).unwrap();
//! for status in migrator.get_migration_info().unwrap().statuses() {
//!     println!("{} {:?}", status.name, status.applied_at);
//! }
//! ```
//!
//! # Ledger naming
//!
//! The ledger defaults to `main.gorp_migrations`. Schema and table names must
//! contain only alphanumeric characters and underscores.

mod error;
mod migrator;
mod plan;
mod query;
mod schema;

pub use error::{MigrateError, Result};
pub use migrator::{DatabaseMigrator, Migrator};
pub use plan::{MigrationPlan, plan_migrations};
pub use schema::LedgerTable;
