//! Command-line adapter for the migration engine.
//!
//! [`MigratorCli`] exposes a [`Migrator`](toolbox_sqlite::Migrator) as a
//! `migration` branch of a [`toolbox_core::Command`] tree. The
//! `toolbox-migrate` binary mounts that branch under a small root command.
//!
//! # Example
//!
//! ```no_run
//! use toolbox_cli::{MigratorCli, MigratorCliOptions};
//! use toolbox_core::Command;
//! use toolbox_db::{DatabaseSettings, DirSource};
//! use toolbox_sqlite::DatabaseMigrator;
//!
//! let migrator = DatabaseMigrator::new(DatabaseSettings::with_connection_string("app.db"))
//!     .with_source(DirSource::new("sql-migration-scripts"));
//!
//! let root = Command::new("app").with_sub_commands([MigratorCli::new(MigratorCliOptions {
//!     migrator: Box::new(migrator),
//!     script_dir: "sql-migration-scripts".into(),
//!     output: Box::new(std::io::stdout()),
//! })
//! .build_migration_command()]);
//!
//! root.execute(&["migrate", "info"]).unwrap();
//! ```

mod error;
mod generate;
mod migrator_cli;
mod render;

pub use error::{CliError, Result};
pub use generate::ScriptGenerator;
pub use migrator_cli::{MigratorCli, MigratorCliOptions};
pub use render::{NOT_APPLIED, render_migration_info, render_plan};
