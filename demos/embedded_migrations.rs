//! Engine example with scripts compiled into the program.
//!
//! Uses an in-memory script source against a temporary SQLite file:
//! migrates up one step, then all the way, prints the ledger, and resets.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p toolbox-demos --example embedded_migrations
//! ```

use rusqlite::Connection;
use toolbox_db::{DatabaseSettings, Direction, MemorySource};
use toolbox_sqlite::{DatabaseMigrator, Migrator};

const USERS: &str = "\
-- +migrate Up
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

-- +migrate Down
DROP TABLE users;
";

const USERS_EMAIL: &str = "\
-- +migrate Up
ALTER TABLE users ADD COLUMN email TEXT;

-- +migrate Down
ALTER TABLE users DROP COLUMN email;
";

const TOUCH_TRIGGER: &str = "\
-- +migrate Up
CREATE TABLE audit (user_id INTEGER, at TEXT);

-- +migrate StatementBegin
CREATE TRIGGER users_audit AFTER INSERT ON users
BEGIN
    INSERT INTO audit VALUES (new.id, datetime('now'));
END;
-- +migrate StatementEnd

-- +migrate Down
DROP TRIGGER users_audit;
DROP TABLE audit;
";

fn main() {
    let db_path = std::env::temp_dir().join("toolbox_embedded_migrations.db");
    let _ = std::fs::remove_file(&db_path);

    let source = MemorySource::new()
        .with_script("001-create-users.sql", USERS)
        .with_script("002-add-email.sql", USERS_EMAIL)
        .with_script("003-audit-trigger.sql", TOUCH_TRIGGER);

    let migrator = DatabaseMigrator::new(DatabaseSettings::with_connection_string(
        db_path.to_str().unwrap(),
    ))
    .with_source(source);

    println!("=== Plan ===");
    for name in migrator.plan(Direction::Up, 0).unwrap().names() {
        println!("  {name}");
    }

    println!("\n=== Migrate ===");
    println!("up 1: {} step(s)", migrator.migrate(Direction::Up, 1).unwrap());
    println!("up all: {} step(s)", migrator.migrate(Direction::Up, 0).unwrap());

    let conn = Connection::open(&db_path).unwrap();
    conn.execute("INSERT INTO users (name, email) VALUES ('ada', 'ada@example.com')", [])
        .unwrap();
    let audited: i64 = conn
        .query_row("SELECT COUNT(*) FROM audit", [], |row| row.get(0))
        .unwrap();
    println!("audit rows after insert: {audited}");
    drop(conn);

    println!("\n=== Ledger ===");
    let info = migrator.get_migration_info().unwrap();
    for status in info.statuses() {
        match status.applied_at {
            Some(at) => println!("  {} applied at {}", status.name, at.to_rfc3339()),
            None => println!("  {} pending", status.name),
        }
    }

    println!("\n=== Reset ===");
    println!("down all: {} step(s)", migrator.migrate(Direction::Down, 0).unwrap());
    println!("pending: {}", migrator.get_migration_info().unwrap().pending_count());

    let _ = std::fs::remove_file(&db_path);
}
