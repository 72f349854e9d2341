//! Fallback task for branch commands that require a sub command.

use thiserror::Error;

use crate::command::TaskResult;

/// Errors produced by [`end_with_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// No token was left for the branch to dispatch on.
    #[error("command is missing")]
    MissingCommand,
    /// The first remaining token did not select any sub command.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Returns a task that prints `message` and then fails.
///
/// The failure is [`UsageError::InvalidCommand`] carrying the first
/// unmatched token, or [`UsageError::MissingCommand`] when no tokens remain.
///
/// # Examples
///
/// ```
/// use toolbox_core::{Command, UsageError, end_with_message};
///
/// let branch = Command::new("migration")
///     .with_task(end_with_message("Usage: app migration <subcommand>"));
///
/// let err = branch.execute(&["bogus"]).unwrap_err();
/// assert_eq!(
///     err.downcast_ref::<UsageError>(),
///     Some(&UsageError::InvalidCommand("bogus".into()))
/// );
/// ```
pub fn end_with_message(message: impl Into<String>) -> impl Fn(&[String]) -> TaskResult + 'static {
    let message = message.into();
    move |args: &[String]| {
        println!("{message}");
        Err(Box::new(usage_error(args)))
    }
}

fn usage_error(args: &[String]) -> UsageError {
    match args.first() {
        Some(token) => UsageError::InvalidCommand(token.clone()),
        None => UsageError::MissingCommand,
    }
}
