//! Mounting the migration branch under an application's own command tree.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p toolbox-demos --example migrator_cli -- migrate info
//! cargo run -p toolbox-demos --example migrator_cli -- migrate generate add_users
//! cargo run -p toolbox-demos --example migrator_cli -- migrate upall
//! ```

use toolbox_cli::{MigratorCli, MigratorCliOptions};
use toolbox_core::{Command, end_with_message};
use toolbox_db::{DatabaseSettings, DirSource};
use toolbox_sqlite::DatabaseMigrator;

fn main() {
    let base = std::env::temp_dir().join("toolbox_migrator_cli_demo");
    let script_dir = base.join("sql-migration-scripts");
    std::fs::create_dir_all(&script_dir).unwrap();
    let db_path = base.join("app.db");

    let migrator = DatabaseMigrator::new(DatabaseSettings::with_connection_string(
        db_path.to_str().unwrap(),
    ))
    .with_source(DirSource::new(&script_dir));

    let app = Command::new("app")
        .with_task(end_with_message("Usage: app <serve|migrate> [args...]"))
        .with_sub_commands([
            Command::new("serve").with_task(|_: &[String]| {
                println!("serving... (not really)");
                Ok(())
            }),
            MigratorCli::new(MigratorCliOptions {
                migrator: Box::new(migrator),
                script_dir,
                output: Box::new(std::io::stdout()),
            })
            .build_migration_command(),
        ]);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = app.execute(args.as_slice()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
