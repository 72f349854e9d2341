//! The `migration` command branch.
//!
//! [`MigratorCli`] wraps a [`Migrator`] and turns it into a
//! [`Command`] tree that can be mounted under any application root:
//!
//! ```text
//! migration|migrate|migrator
//!   info|status [json]
//!   generate|gen|new <script-name>...
//!   upall | up | down | reset | redo
//!   plan [up|down]
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use toolbox_core::{Command, TaskResult, UsageError, end_with_message};
use toolbox_db::Direction;
use toolbox_sqlite::Migrator;
use tracing::info;

use crate::error::{CliError, Result};
use crate::generate::ScriptGenerator;
use crate::render::{render_migration_info, render_plan};

/// Inputs for [`MigratorCli::new`].
pub struct MigratorCliOptions {
    /// Engine the sub commands drive.
    pub migrator: Box<dyn Migrator>,
    /// Directory shown in reports and used by `generate`.
    pub script_dir: PathBuf,
    /// Where reports are written.
    pub output: Box<dyn Write>,
}

/// A migration step sub command: name, direction, step limit, messages.
struct StepCommand {
    name: &'static str,
    direction: Direction,
    max_steps: usize,
    failure: &'static str,
    success: &'static str,
}

static STEP_COMMANDS: [StepCommand; 4] = [
    StepCommand {
        name: "upall",
        direction: Direction::Up,
        max_steps: 0,
        failure: "Failed to migrate Up all",
        success: "Migrate upall succeeded",
    },
    StepCommand {
        name: "up",
        direction: Direction::Up,
        max_steps: 1,
        failure: "Failed to migrate Up",
        success: "Migrate up succeeded",
    },
    StepCommand {
        name: "down",
        direction: Direction::Down,
        max_steps: 1,
        failure: "Failed to migrate Down",
        success: "Migrate down succeeded",
    },
    StepCommand {
        name: "reset",
        direction: Direction::Down,
        max_steps: 0,
        failure: "Failed to reset migrations",
        success: "Migrate reset succeeded",
    },
];

/// Command-line front end for a [`Migrator`].
pub struct MigratorCli {
    migrator: Box<dyn Migrator>,
    generator: ScriptGenerator,
    output: RefCell<Box<dyn Write>>,
}

impl MigratorCli {
    /// Creates the adapter.
    pub fn new(options: MigratorCliOptions) -> Self {
        Self {
            migrator: options.migrator,
            generator: ScriptGenerator::new(options.script_dir),
            output: RefCell::new(options.output),
        }
    }

    /// Builds the `migration` branch; its own task prints the usage text.
    pub fn build_migration_command(self) -> Command {
        let usage = self.usage();
        let cli = Rc::new(self);

        let mut sub_commands = vec![
            cli.task_command("info", &["status"], |cli, args| cli.info(args)),
            cli.task_command("generate", &["gen", "new"], |cli, args| cli.generate(args)),
        ];
        for step in STEP_COMMANDS.iter() {
            sub_commands.push(cli.task_command(step.name, &[], move |cli, _| cli.step(step)));
        }
        sub_commands.push(cli.task_command("redo", &[], |cli, _| cli.redo()));
        sub_commands.push(cli.task_command("plan", &[], |cli, args| cli.plan(args)));

        Command::new("migration")
            .with_aliases(["migrate", "migrator"])
            .with_task(end_with_message(usage))
            .with_sub_commands(sub_commands)
    }

    fn task_command<F>(self: &Rc<Self>, name: &str, aliases: &[&str], f: F) -> Command
    where
        F: Fn(&MigratorCli, &[String]) -> TaskResult + 'static,
    {
        let cli = Rc::clone(self);
        Command::new(name)
            .with_aliases(aliases.iter().copied())
            .with_task(move |args: &[String]| f(&cli, args))
    }

    fn info(&self, args: &[String]) -> TaskResult {
        let info = self
            .migrator
            .get_migration_info()
            .map_err(CliError::migrate("Cannot get migration info"))?;

        let rendered = match args.first().map(String::as_str) {
            Some("json") => {
                let mut json = info.to_json().map_err(CliError::Json)?;
                json.push('\n');
                json
            }
            _ => render_migration_info(&info, self.generator.dir()),
        };
        self.write(&rendered)?;
        Ok(())
    }

    fn generate(&self, args: &[String]) -> TaskResult {
        if args.is_empty() {
            return Err(CliError::MissingScriptName.into());
        }
        for arg in args {
            let path = self.generator.generate(arg)?;
            info!(path = %path.display(), "New migration script file generated");
            self.write(&format!("{}\n", path.display()))?;
        }
        Ok(())
    }

    fn step(&self, step: &StepCommand) -> TaskResult {
        let steps_taken = self
            .migrator
            .migrate(step.direction, step.max_steps)
            .map_err(CliError::migrate(step.failure))?;
        info!(steps_taken, "{}", step.success);
        self.write(&format!("{}, steps taken: {steps_taken}\n", step.success))?;
        Ok(())
    }

    /// Reverts the newest applied script and re-applies that same script.
    fn redo(&self) -> TaskResult {
        const FAILURE: &str = "Failed to redo the last migration";
        let plan = self
            .migrator
            .plan(Direction::Down, 1)
            .map_err(CliError::migrate(FAILURE))?;
        let steps_taken = match plan.names().first() {
            Some(name) => {
                for direction in [Direction::Down, Direction::Up] {
                    self.migrator
                        .migrate_script(direction, name)
                        .map_err(CliError::migrate(FAILURE))?;
                }
                1
            }
            None => 0,
        };
        info!(steps_taken, "Migrate redo succeeded");
        self.write(&format!("Migrate redo succeeded, steps taken: {steps_taken}\n"))?;
        Ok(())
    }

    fn plan(&self, args: &[String]) -> TaskResult {
        let direction = match args.first().map(String::as_str) {
            None | Some("up") => Direction::Up,
            Some("down") => Direction::Down,
            Some(other) => return Err(UsageError::InvalidCommand(other.to_string()).into()),
        };
        let plan = self
            .migrator
            .plan(direction, 0)
            .map_err(CliError::migrate("Failed to plan migration"))?;
        self.write(&render_plan(&plan))?;
        Ok(())
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut output = self.output.borrow_mut();
        output.write_all(text.as_bytes())?;
        output.flush()?;
        Ok(())
    }

    fn usage(&self) -> String {
        format!(
            r#"
This utility command is used to execute SQL migration scripts against the database. A separate table
called gorp_migrations is created in the database, to keep track of the already applied migrations.

Migration script directory: {}

Usage: app migrate <subcommand>

Example:

$ ./app migrate info

Available subcommands:
	info     - Prints the available migration scripts and the time they were applied
	upall    - Migrate database all the way up
	up       - Migrate database one step up
	down     - Migrate database one step down
	reset    - Migrate database all the way down
	redo     - Revert the newest applied script and apply it again
	plan     - Prints the scripts the next upall (or reset, with 'down') would run
	generate - Generate one or more new migration script files
"#,
            self.generator.dir().display()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use toolbox_db::{MigrationRow, MigrationScript};
    use toolbox_sqlite::{MigrateError, MigrationPlan, Result as MigrateResult};

    use super::*;

    /// Records migrate calls and answers with canned step counts.
    #[derive(Default)]
    struct RecordingMigrator {
        calls: Arc<Mutex<Vec<(Direction, usize)>>>,
        scripts: Arc<Mutex<Vec<(Direction, String)>>>,
    }

    impl Migrator for RecordingMigrator {
        fn migrate(&self, direction: Direction, max_steps: usize) -> MigrateResult<usize> {
            self.calls.lock().unwrap().push((direction, max_steps));
            Ok(1)
        }

        fn migrate_script(&self, direction: Direction, name: &str) -> MigrateResult<()> {
            self.scripts.lock().unwrap().push((direction, name.to_string()));
            Ok(())
        }

        fn get_migration_scripts(&self) -> MigrateResult<Vec<MigrationScript>> {
            Ok(vec![])
        }

        fn get_migration_rows(&self) -> MigrateResult<Vec<MigrationRow>> {
            Err(MigrateError::EmptyConnectionString)
        }

        fn plan(&self, direction: Direction, _max_steps: usize) -> MigrateResult<MigrationPlan> {
            let script = MigrationScript::parse("02-latest.sql", "-- +migrate Up\n")?;
            Ok(MigrationPlan {
                direction,
                scripts: vec![script],
            })
        }
    }

    fn command(migrator: RecordingMigrator) -> Command {
        MigratorCli::new(MigratorCliOptions {
            migrator: Box::new(migrator),
            script_dir: PathBuf::from("scripts"),
            output: Box::new(std::io::sink()),
        })
        .build_migration_command()
    }

    #[test]
    fn test_branch_names() {
        let cmd = command(RecordingMigrator::default());
        assert_eq!(cmd.name(), "migration");
        assert!(cmd.matches("migrate"));
        assert!(cmd.matches("migrator"));
        assert!(cmd.find_sub_command("status").is_some());
        assert!(cmd.find_sub_command("gen").is_some());
        assert!(cmd.find_sub_command("new").is_some());
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_step_commands_call_migrate() {
        let migrator = RecordingMigrator::default();
        let calls = Arc::clone(&migrator.calls);
        let cmd = command(migrator);

        for token in ["upall", "up", "down", "reset"] {
            cmd.execute(&[token]).unwrap();
        }
        assert_eq!(
            *calls.lock().unwrap(),
            [
                (Direction::Up, 0),
                (Direction::Up, 1),
                (Direction::Down, 1),
                (Direction::Down, 0),
            ]
        );
    }

    #[test]
    fn test_redo_targets_the_reverted_script() {
        let migrator = RecordingMigrator::default();
        let calls = Arc::clone(&migrator.calls);
        let scripts = Arc::clone(&migrator.scripts);
        let cmd = command(migrator);

        cmd.execute(&["redo"]).unwrap();
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(
            *scripts.lock().unwrap(),
            [
                (Direction::Down, "02-latest.sql".to_string()),
                (Direction::Up, "02-latest.sql".to_string()),
            ]
        );
    }

    #[test]
    fn test_info_failure_is_wrapped() {
        let cmd = command(RecordingMigrator::default());
        let err = cmd.execute(&["info"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot get migration info: failed to look up migration rows in the database: connection string is empty"
        );
    }

    #[test]
    fn test_generate_without_names() {
        let cmd = command(RecordingMigrator::default());
        let err = cmd.execute(&["generate"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingScriptName)
        ));
    }

    #[test]
    fn test_plan_rejects_unknown_direction() {
        let cmd = command(RecordingMigrator::default());
        let err = cmd.execute(&["plan", "sideways"]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<UsageError>(),
            Some(&UsageError::InvalidCommand("sideways".into()))
        );
    }
}
