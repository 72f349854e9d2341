//! Structural validation of command trees.
//!
//! Dispatch silently picks the first sibling that matches a token, so a
//! duplicated name or alias shadows the later command. [`validate_command`]
//! reports those collisions up front so an entry point can refuse to start
//! with an ambiguous tree.
//!
//! # Examples
//!
//! ```
//! use toolbox_core::{Command, ValidationError, validate_command};
//!
//! let ok = Command::new("app").with_sub_commands([
//!     Command::new("up"),
//!     Command::new("down"),
//! ]);
//! assert!(validate_command(&ok).is_empty());
//!
//! let clash = Command::new("app").with_sub_commands([
//!     Command::new("info"),
//!     Command::new("status").with_aliases(["info"]),
//! ]);
//! assert_eq!(
//!     validate_command(&clash),
//!     vec![ValidationError::DuplicateToken {
//!         parent: "app".into(),
//!         token: "info".into(),
//!     }]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::Command;

/// Command tree validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A command name is empty or whitespace-only.
    #[error("command name cannot be empty (under '{0}')")]
    EmptyCommandName(String),
    /// Two siblings share a name or alias.
    #[error("token '{token}' selects more than one sub command of '{parent}'")]
    DuplicateToken {
        /// Name of the command owning the colliding children.
        parent: String,
        /// The shadowed token.
        token: String,
    },
}

/// Validates a whole command tree, returning every problem found.
pub fn validate_command(command: &Command) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if command.name().trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName(String::new()));
    }
    validate_children(command, &mut errors);
    errors
}

fn validate_children(command: &Command, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for sub in command.sub_commands() {
        if sub.name().trim().is_empty() {
            errors.push(ValidationError::EmptyCommandName(command.name().to_string()));
        }
        let own: HashSet<&str> = std::iter::once(sub.name())
            .chain(sub.aliases().iter().map(String::as_str))
            .collect();
        for token in own {
            if !seen.insert(token) {
                errors.push(ValidationError::DuplicateToken {
                    parent: command.name().to_string(),
                    token: token.to_string(),
                });
            }
        }
        validate_children(sub, errors);
    }
}

impl Command {
    /// Validates this tree. See [`validate_command`].
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors = validate_command(self);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tree() {
        let tree = Command::new("root").with_sub_commands([
            Command::new("migration")
                .with_aliases(["migrate", "migrator"])
                .with_sub_commands([
                    Command::new("info").with_aliases(["status"]),
                    Command::new("generate").with_aliases(["gen", "new"]),
                ]),
            Command::new("version").with_aliases(["ver"]),
        ]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_duplicate_name_detected() {
        let tree = Command::new("root").with_sub_commands([Command::new("a"), Command::new("a")]);
        assert_eq!(
            validate_command(&tree),
            vec![ValidationError::DuplicateToken {
                parent: "root".into(),
                token: "a".into(),
            }]
        );
    }

    #[test]
    fn test_alias_repeated_on_same_command_is_not_a_collision() {
        let tree =
            Command::new("root").with_sub_commands([Command::new("a").with_aliases(["a", "b", "b"])]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_collision_in_nested_level() {
        let tree = Command::new("root").with_sub_commands([Command::new("branch")
            .with_sub_commands([Command::new("x"), Command::new("y").with_aliases(["x"])])]);
        let errors = tree.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::DuplicateToken { parent, token } if parent == "branch" && token == "x"
        ));
    }

    #[test]
    fn test_same_token_in_different_branches_is_fine() {
        let tree = Command::new("root").with_sub_commands([
            Command::new("a").with_sub_commands([Command::new("info")]),
            Command::new("b").with_sub_commands([Command::new("info")]),
        ]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_empty_name_detected() {
        let tree = Command::new("root").with_sub_commands([Command::new("  ")]);
        assert_eq!(
            validate_command(&tree),
            vec![ValidationError::EmptyCommandName("root".into())]
        );
    }
}
