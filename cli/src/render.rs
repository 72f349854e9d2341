//! Text rendering of migration reports.

use std::fmt::Write;
use std::path::Path;

use chrono::SecondsFormat;
use toolbox_db::MigrationInfo;
use toolbox_sqlite::MigrationPlan;

/// Cell text for scripts missing from the ledger.
pub const NOT_APPLIED: &str = "Not Applied!";

const INFO_HEADER: [&str; 2] = ["MIGRATION SCRIPT", "APPLIED AT"];

/// Renders the script vs. ledger table shown by `migration info`.
///
/// ```text
/// Migration script directory: sql-migration-scripts
///
/// +------------------+----------------------+
/// | MIGRATION SCRIPT | APPLIED AT           |
/// +------------------+----------------------+
/// | 01-users.sql     | 2024-01-15T10:30:00Z |
/// +------------------+----------------------+
/// | 02-todos.sql     | Not Applied!         |
/// +------------------+----------------------+
/// ```
pub fn render_migration_info(info: &MigrationInfo, script_dir: &Path) -> String {
    let rows: Vec<[String; 2]> = info
        .statuses()
        .into_iter()
        .map(|status| {
            let applied_at = match status.applied_at {
                Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
                None => NOT_APPLIED.to_string(),
            };
            [status.name.to_string(), applied_at]
        })
        .collect();

    let mut out = format!("\nMigration script directory: {}\n\n", script_dir.display());
    out.push_str(&render_table(INFO_HEADER, &rows));
    out.push('\n');
    out
}

/// Renders the scripts a migration run would touch.
pub fn render_plan(plan: &MigrationPlan) -> String {
    if plan.is_empty() {
        return format!("Nothing to migrate {}.\n", plan.direction);
    }
    let mut out = format!(
        "Migrate {} would run {} script(s):\n",
        plan.direction,
        plan.len()
    );
    for name in plan.names() {
        let _ = writeln!(out, "  {name}");
    }
    out
}

/// Bordered table with a separator line after every row.
fn render_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = separator.clone();
    out.push_str(&format_row(header.iter().copied(), &widths));
    out.push_str(&separator);
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str), &widths));
        out.push_str(&separator);
    }
    out
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, &width) in cells.zip(widths) {
        let _ = write!(line, " {cell:<width$} |");
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use toolbox_db::{Direction, MigrationRow, MigrationScript};

    use super::*;

    fn script(name: &str) -> MigrationScript {
        MigrationScript::parse(name, "-- +migrate Up\nSELECT 1;\n").unwrap()
    }

    #[test]
    fn test_render_info_table() {
        let info = MigrationInfo {
            migration_scripts: vec![script("01-users.sql"), script("02-todos.sql")],
            migration_rows: vec![MigrationRow {
                name: "01-users.sql".into(),
                applied_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            }],
        };

        let out = render_migration_info(&info, Path::new("sql-migration-scripts"));
        let expected = "
Migration script directory: sql-migration-scripts

+------------------+----------------------+
| MIGRATION SCRIPT | APPLIED AT           |
+------------------+----------------------+
| 01-users.sql     | 2024-01-15T10:30:00Z |
+------------------+----------------------+
| 02-todos.sql     | Not Applied!         |
+------------------+----------------------+

";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_info_without_scripts() {
        let out = render_migration_info(&MigrationInfo::default(), Path::new("db"));
        assert!(out.contains("Migration script directory: db"));
        assert!(out.contains("| MIGRATION SCRIPT | APPLIED AT |"));
        assert!(!out.contains(NOT_APPLIED));
    }

    #[test]
    fn test_columns_grow_with_long_names() {
        let info = MigrationInfo {
            migration_scripts: vec![script("20240115103000-add_table_users_and_more.sql")],
            migration_rows: vec![],
        };
        let out = render_migration_info(&info, Path::new("."));
        let lines: Vec<&str> = out.lines().filter(|l| l.starts_with(['|', '+'])).collect();
        assert!(lines.windows(2).all(|w| w[0].len() == w[1].len()));
    }

    #[test]
    fn test_render_plan() {
        let plan = MigrationPlan {
            direction: Direction::Down,
            scripts: vec![script("02-todos.sql"), script("01-users.sql")],
        };
        assert_eq!(
            render_plan(&plan),
            "Migrate Down would run 2 script(s):\n  02-todos.sql\n  01-users.sql\n"
        );

        let empty = MigrationPlan {
            direction: Direction::Up,
            scripts: vec![],
        };
        assert_eq!(render_plan(&empty), "Nothing to migrate Up.\n");
    }
}
