//! Recursive positional command tree dispatcher.
//!
//! This crate routes a process's argument vector to a single task by walking
//! a tree of named, aliasable [`Command`]s:
//!
//! - [`Command`] — a node with a name, aliases, a [`Task`] and children.
//! - [`end_with_message`] — fallback task for branches that need a sub
//!   command, failing with a [`UsageError`].
//! - [`validate_command`] — reports sibling name/alias collisions.
//!
//! There is no flag parsing and no type coercion: every token is either
//! consumed by the tree as a command name or handed verbatim to a task.
//!
//! # Example
//!
//! ```
//! use toolbox_core::{Command, end_with_message};
//!
//! let root = Command::new("app")
//!     .with_task(end_with_message("Usage: app <command>"))
//!     .with_sub_commands([Command::new("hello").with_task(|args| {
//!         println!("hello {}", args.join(" "));
//!         Ok(())
//!     })]);
//!
//! assert!(root.validate().is_ok());
//! assert!(root.execute(&["hello", "world"]).is_ok());
//! assert!(root.execute::<&str>(&[]).is_err());
//! ```

mod command;
mod usage;
mod validate;

pub use command::{Command, Task, TaskError, TaskResult};
pub use usage::{UsageError, end_with_message};
pub use validate::{ValidationError, validate_command};
