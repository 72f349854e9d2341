use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use toolbox_db::{
    DirSource, Direction, MigrationInfo, MigrationRow, MigratorConfig, ParseError, ScriptError,
    load_scripts, next_script_timestamp, script_file_name, script_template,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

const USERS: &str = "\
-- +migrate Up
-- add users

CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL -- display name
);
CREATE INDEX users_name ON users (name);

-- +migrate Down
-- add users

DROP INDEX users_name;
DROP TABLE users;
";

const TRIGGER: &str = "\
-- +migrate Up notransaction
-- +migrate StatementBegin
CREATE TRIGGER users_touch AFTER UPDATE ON users
BEGIN
    UPDATE users SET name = new.name WHERE id = new.id;
END;
-- +migrate StatementEnd

-- +migrate Down
DROP TRIGGER users_touch;
";

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn dir_source_loads_scripts_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "20240102000000-trigger.sql", TRIGGER);
    write(dir.path(), "20240101000000-users.sql", USERS);
    write(dir.path(), "README.md", "not a script");
    fs::create_dir(dir.path().join("archive.sql")).unwrap();

    let scripts = load_scripts(&DirSource::new(dir.path())).unwrap();
    let names: Vec<_> = scripts.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["20240101000000-users.sql", "20240102000000-trigger.sql"]);

    let users = &scripts[0];
    assert_eq!(users.up_statements.len(), 2);
    assert!(users.up_statements[0].starts_with("CREATE TABLE users ("));
    assert!(users.up_statements[0].ends_with(");"));
    assert_eq!(users.down_statements, ["DROP INDEX users_name;", "DROP TABLE users;"]);
    assert!(users.runs_in_transaction(Direction::Up));

    let trigger = &scripts[1];
    assert_eq!(trigger.up_statements.len(), 1);
    assert!(trigger.up_statements[0].contains("UPDATE users SET name"));
    assert!(!trigger.runs_in_transaction(Direction::Up));
    assert!(trigger.runs_in_transaction(Direction::Down));
}

#[test]
fn dir_source_reports_malformed_script_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "01-good.sql", USERS);
    write(
        dir.path(),
        "02-add_testing_table.sql",
        "-- +migrate Up\nInvalid migration script\n",
    );

    let err = load_scripts(&DirSource::new(dir.path())).unwrap_err();
    match err {
        ScriptError::Parse { script, source } => {
            assert_eq!(script, "02-add_testing_table.sql");
            assert_eq!(source, ParseError::MissingTerminator);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn dir_source_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_scripts(&DirSource::new(dir.path().join("missing"))).unwrap_err();
    assert!(matches!(err, ScriptError::Io { .. }));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn empty_directory_yields_no_scripts() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_scripts(&DirSource::new(dir.path())).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Generated scripts
// ---------------------------------------------------------------------------

#[test]
fn generated_scripts_load_and_sort_in_creation_order() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    let mut latest = None;
    for name in ["zeta", "alpha", "mid"] {
        let at = next_script_timestamp(now, latest);
        write(dir.path(), &script_file_name(at, name), &script_template(name));
        latest = Some(at);
    }

    let scripts = load_scripts(&DirSource::new(dir.path())).unwrap();
    let names: Vec<_> = scripts.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "20240601090000-zeta.sql",
            "20240601090001-alpha.sql",
            "20240601090002-mid.sql"
        ]
    );
    assert!(scripts.iter().all(|s| s.up_statements.is_empty()));
}

// ---------------------------------------------------------------------------
// Info snapshot
// ---------------------------------------------------------------------------

#[test]
fn info_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "01-users.sql", USERS);
    write(dir.path(), "02-trigger.sql", TRIGGER);

    let info = MigrationInfo {
        migration_scripts: load_scripts(&DirSource::new(dir.path())).unwrap(),
        migration_rows: vec![
            MigrationRow {
                name: "01-users.sql".into(),
                applied_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            },
            MigrationRow {
                name: "00-removed.sql".into(),
                applied_at: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
            },
        ],
    };
    assert_eq!(info.pending_count(), 1);
    assert_eq!(info.unknown_rows().len(), 1);

    let json = info.to_json().unwrap();
    let back: MigrationInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back.migration_scripts, info.migration_scripts);
    assert_eq!(back.migration_rows, info.migration_rows);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_file_points_at_script_directory() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("migrations");
    fs::create_dir(&scripts).unwrap();
    write(&scripts, "01-users.sql", USERS);

    let config_path = dir.path().join("migrator.yml");
    fs::write(
        &config_path,
        format!(
            "database:\n  connection_string: app.db\nscript_dir: {}\n",
            scripts.display()
        ),
    )
    .unwrap();

    let config = MigratorConfig::load(&config_path).unwrap();
    assert_eq!(config.database.connection_string, "app.db");
    assert_eq!(config.database.schema, "main");

    let loaded = load_scripts(&DirSource::new(&config.script_dir)).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn config_rejects_malformed_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("migrator.yml");
    fs::write(&path, "database: [not, a, map]\n").unwrap();
    assert!(matches!(
        MigratorConfig::load(&path),
        Err(ScriptError::Yaml(_))
    ));
}
