use std::path::PathBuf;

use clap::Parser;
use toolbox_cli::{MigratorCli, MigratorCliOptions};
use toolbox_core::{Command, TaskError, end_with_message};
use toolbox_db::{DirSource, MigratorConfig};
use toolbox_sqlite::DatabaseMigrator;
use tracing::debug;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN_NAME: &str = "toolbox-migrate";

#[derive(Debug, Parser)]
#[command(name = "toolbox-migrate")]
#[command(about = "Apply versioned SQL migration scripts to a SQLite database")]
struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Database connection string (a file path for SQLite).
    #[arg(long, env = "DATABASE_URL")]
    database: Option<String>,
    /// Schema holding the ledger table.
    #[arg(long)]
    schema: Option<String>,
    /// Directory migration scripts are read from and generated into.
    #[arg(long)]
    scripts: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "APP_LOG_LEVEL", default_value = "info")]
    log_level: String,
    /// Command tokens, e.g. `migrate info`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), TaskError> {
    let config = load_config(&cli)?;
    debug!(?config, "resolved configuration");

    let migrator = DatabaseMigrator::new(config.database)
        .with_source(DirSource::new(config.script_dir.clone()));
    let migration = MigratorCli::new(MigratorCliOptions {
        migrator: Box::new(migrator),
        script_dir: config.script_dir,
        output: Box::new(std::io::stdout()),
    })
    .build_migration_command();

    let root = build_root_command(migration);
    root.validate().map_err(|errors| {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    })?;

    root.execute(cli.args.as_slice())
}

/// Reads the configuration file, if any, and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<MigratorConfig, TaskError> {
    let mut config = match &cli.config {
        Some(path) => MigratorConfig::load(path)?,
        None => MigratorConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database.connection_string = database.clone();
    }
    if let Some(schema) = &cli.schema {
        config.database.schema = schema.clone();
    }
    if let Some(scripts) = &cli.scripts {
        config.script_dir = scripts.clone();
    }
    Ok(config)
}

fn build_root_command(migration: Command) -> Command {
    Command::new(BIN_NAME)
        .with_task(end_with_message(usage()))
        .with_sub_commands([
            Command::new("version")
                .with_aliases(["ver", "--version"])
                .with_task(|_: &[String]| {
                    println!("{BIN_NAME} {PACKAGE_VERSION}");
                    Ok(())
                }),
            migration,
        ])
}

fn usage() -> String {
    format!(
        r#"
Usage: {BIN_NAME} [OPTIONS] <command> [args...]

Commands:
	version   - Prints the version
	migration - Manages SQL migrations (aliases: migrate, migrator)

Run '{BIN_NAME} migrate' to list the migration subcommands.
"#
    )
}
