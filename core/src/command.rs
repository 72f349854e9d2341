//! Command tree nodes and the recursive dispatch algorithm.
//!
//! A [`Command`] is a named, aliasable node holding a [`Task`] and an ordered
//! list of child commands. Trees are assembled once with the builder methods
//! and then driven by [`Command::execute`], which walks down the tree one
//! positional token at a time.

use std::fmt;

use tracing::{debug, trace};

/// Error type returned by tasks.
///
/// The dispatcher never inspects or wraps it, so callers can downcast to the
/// concrete error their task produced.
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running a task.
pub type TaskResult = std::result::Result<(), TaskError>;

/// Work attached to a [`Command`], called with the unconsumed argument tail.
pub type Task = Box<dyn Fn(&[String]) -> TaskResult>;

/// A node of the command tree.
///
/// # Examples
///
/// ```
/// use toolbox_core::Command;
///
/// let root = Command::new("app").with_sub_commands([
///     Command::new("version")
///         .with_aliases(["ver", "--version"])
///         .with_task(|_args| {
///             println!("v0.0.1");
///             Ok(())
///         }),
/// ]);
///
/// assert!(root.execute(&["ver"]).is_ok());
/// assert_eq!(root.find_sub_command("--version").unwrap().name(), "version");
/// ```
pub struct Command {
    name: String,
    aliases: Vec<String>,
    task: Task,
    sub_commands: Vec<Command>,
}

impl Command {
    /// Creates a leaf command whose task succeeds without doing anything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            task: Box::new(|_: &[String]| Ok(())),
            sub_commands: Vec::new(),
        }
    }

    /// Appends alternate tokens that also select this command.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Replaces the task run when no child matches.
    pub fn with_task<F>(mut self, task: F) -> Self
    where
        F: Fn(&[String]) -> TaskResult + 'static,
    {
        self.task = Box::new(task);
        self
    }

    /// Appends child commands, keeping insertion order for matching.
    pub fn with_sub_commands<I>(mut self, sub_commands: I) -> Self
    where
        I: IntoIterator<Item = Command>,
    {
        self.sub_commands.extend(sub_commands);
        self
    }

    /// Returns the command's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the command's aliases in the order they were added.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the child commands in insertion order.
    pub fn sub_commands(&self) -> &[Command] {
        &self.sub_commands
    }

    /// Returns `true` if `token` is this command's name or one of its aliases.
    ///
    /// Matching is exact and case-sensitive.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// Returns the first child selected by `token`, if any.
    pub fn find_sub_command(&self, token: &str) -> Option<&Command> {
        self.sub_commands.iter().find(|sub| sub.matches(token))
    }

    /// Dispatches `args` through the tree.
    ///
    /// When the first token selects a child, the child receives the remaining
    /// tokens. Otherwise this command's own task runs with all of `args`.
    /// Whatever the selected task returns is handed back unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolbox_core::Command;
    ///
    /// let root = Command::new("root")
    ///     .with_task(|args| Err(format!("root got {args:?}").into()))
    ///     .with_sub_commands([Command::new("sub")]);
    ///
    /// assert!(root.execute(&["sub", "extra"]).is_ok());
    /// assert!(root.execute(&["Sub"]).is_err());
    /// ```
    pub fn execute<S: AsRef<str>>(&self, args: &[S]) -> TaskResult {
        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_owned()).collect();
        self.dispatch(&args)
    }

    fn dispatch(&self, args: &[String]) -> TaskResult {
        if let Some((first, rest)) = args.split_first() {
            if let Some(sub) = self.find_sub_command(first) {
                trace!(parent = %self.name, command = %sub.name, "descending into sub command");
                return sub.dispatch(rest);
            }
        }
        debug!(command = %self.name, args = ?args, "running task");
        (self.task)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("sub_commands", &self.sub_commands)
            .finish_non_exhaustive()
    }
}
