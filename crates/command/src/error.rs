//! Command parsing errors

use thiserror::Error;

/// Errors produced while turning a line into a [`crate::Command`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A command was given fewer arguments than it requires
    #[error("Too few arguments")]
    TooFewArguments,

    /// The first token does not name a known command
    #[error("Unsupported command: {0}")]
    Unsupported(String),
}

/// Type alias for command parsing results
pub type Result<T> = std::result::Result<T, CommandError>;
