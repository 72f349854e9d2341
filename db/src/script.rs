//! Migration script parsing.
//!
//! A script is plain SQL split into two sections by marker comments:
//!
//! ```sql
//! -- +migrate Up
//! CREATE TABLE users (id INTEGER PRIMARY KEY);
//!
//! -- +migrate Down
//! DROP TABLE users;
//! ```
//!
//! Statements end on a line whose code ends with `;`. Bodies that contain
//! semicolons of their own (triggers, procedures) are wrapped in
//! `-- +migrate StatementBegin` / `-- +migrate StatementEnd`. Appending
//! `notransaction` to an Up or Down marker runs that direction outside of a
//! transaction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result, ScriptError};
use crate::models::Direction;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--\s*\+migrate(?:\s+(.*))?$").expect("static regex must compile")
});

const NO_TRANSACTION: &str = "notransaction";

/// A parsed, named unit of schema change.
///
/// # Examples
///
/// ```
/// use toolbox_db::{Direction, MigrationScript};
///
/// let script = MigrationScript::parse(
///     "20240101000000-add-users.sql",
///     "-- +migrate Up\nCREATE TABLE users (id INTEGER);\n-- +migrate Down\nDROP TABLE users;\n",
/// )
/// .unwrap();
///
/// assert_eq!(script.statements(Direction::Up), ["CREATE TABLE users (id INTEGER);"]);
/// assert_eq!(script.statements(Direction::Down), ["DROP TABLE users;"]);
/// assert!(script.runs_in_transaction(Direction::Up));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationScript {
    /// Script file name, extension included.
    pub name: String,
    /// Statements run when migrating up, in file order.
    pub up_statements: Vec<String>,
    /// Statements run when migrating down, in file order.
    pub down_statements: Vec<String>,
    /// Up section was marked `notransaction`.
    #[serde(default)]
    pub disable_transaction_up: bool,
    /// Down section was marked `notransaction`.
    #[serde(default)]
    pub disable_transaction_down: bool,
}

impl MigrationScript {
    /// Parses the content of the script called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] naming the script when the marker
    /// syntax is malformed.
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self> {
        let name = name.into();
        match parse_sections(content) {
            Ok(sections) => Ok(Self {
                name,
                up_statements: sections.up,
                down_statements: sections.down,
                disable_transaction_up: sections.disable_transaction_up,
                disable_transaction_down: sections.disable_transaction_down,
            }),
            Err(source) => Err(ScriptError::Parse {
                script: name,
                source,
            }),
        }
    }

    /// Returns the statements for `direction`.
    pub fn statements(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Up => &self.up_statements,
            Direction::Down => &self.down_statements,
        }
    }

    /// Returns `false` if the `direction` section was marked `notransaction`.
    pub fn runs_in_transaction(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => !self.disable_transaction_up,
            Direction::Down => !self.disable_transaction_down,
        }
    }
}

#[derive(Debug, Default)]
struct Sections {
    up: Vec<String>,
    down: Vec<String>,
    disable_transaction_up: bool,
    disable_transaction_down: bool,
}

impl Sections {
    fn push(&mut self, direction: Direction, buf: &mut String) {
        let statement = buf.trim();
        if !statement.is_empty() {
            let target = match direction {
                Direction::Up => &mut self.up,
                Direction::Down => &mut self.down,
            };
            target.push(statement.to_string());
        }
        buf.clear();
    }
}

fn parse_sections(content: &str) -> std::result::Result<Sections, ParseError> {
    let mut sections = Sections::default();
    let mut direction: Option<Direction> = None;
    let mut in_block = false;
    let mut buf = String::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;

        if let Some(caps) = MARKER_RE.captures(line.trim_end()) {
            let mut fields = caps
                .get(1)
                .map(|m| m.as_str().split_whitespace())
                .into_iter()
                .flatten();
            let Some(command) = fields.next() else {
                return Err(ParseError::IncompleteCommand { line: line_no });
            };

            match command {
                "Up" | "Down" => {
                    if !buf.trim().is_empty() || in_block {
                        return Err(ParseError::MissingTerminator);
                    }
                    let dir = if command == "Up" {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                    for option in fields {
                        if option != NO_TRANSACTION {
                            return Err(ParseError::UnknownOption {
                                line: line_no,
                                option: option.to_string(),
                            });
                        }
                        match dir {
                            Direction::Up => sections.disable_transaction_up = true,
                            Direction::Down => sections.disable_transaction_down = true,
                        }
                    }
                    direction = Some(dir);
                }
                "StatementBegin" => {
                    if direction.is_some() {
                        in_block = true;
                    }
                }
                "StatementEnd" => {
                    if let Some(dir) = direction {
                        if !in_block {
                            return Err(ParseError::UnexpectedStatementEnd { line: line_no });
                        }
                        in_block = false;
                        sections.push(dir, &mut buf);
                    }
                }
                other => {
                    return Err(ParseError::UnknownCommand {
                        line: line_no,
                        command: other.to_string(),
                    });
                }
            }
            continue;
        }

        // Anything before the first direction marker is ignored.
        let Some(dir) = direction else {
            continue;
        };

        if !in_block && line.trim_start().starts_with("--") {
            continue;
        }

        buf.push_str(line);
        buf.push('\n');

        if !in_block && ends_with_semicolon(line) {
            sections.push(dir, &mut buf);
        }
    }

    if in_block {
        return Err(ParseError::UnterminatedBlock);
    }
    if direction.is_none() {
        return Err(ParseError::NoDirection);
    }
    if !buf.trim().is_empty() {
        return Err(ParseError::MissingTerminator);
    }

    Ok(sections)
}

/// Returns `true` if the code part of `line` ends with a semicolon.
///
/// Only a whitespace-separated word starting with `--` opens a trailing
/// comment, so `--` inside a literal such as `'a--b'` is code.
fn ends_with_semicolon(line: &str) -> bool {
    line.split_whitespace()
        .take_while(|word| !word.starts_with("--"))
        .last()
        .is_some_and(|word| word.ends_with(';'))
}
