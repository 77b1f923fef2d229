//! Error kinds surfaced by the settings subsystem.
//!
//! Validation errors stay on the screen that produced them. Precondition and
//! collaborator errors route a flow to its error substate. `UnknownChangeKind`
//! is a dispatch bug reported as a generic failure.

use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Synchronous input check failed (empty, too long, duplicate, malformed).
    #[error("{0}")]
    Validation(String),
    /// The world is not in a state that allows the change (dirty tree, missing branch).
    #[error("{0}")]
    Precondition(String),
    /// A collaborator (config store, credential store, git) failed.
    #[error("{operation} failed: {message}")]
    Collaborator {
        operation: &'static str,
        message: String,
    },
    #[error("unknown change kind: {0}")]
    UnknownChangeKind(String),
}

impl SettingsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Wraps an underlying library error with the name of the operation that failed.
    pub fn collaborator(operation: &'static str, err: impl Display) -> Self {
        Self::Collaborator {
            operation,
            message: err.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label for the error screen header.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid input",
            Self::Precondition(_) => "Cannot continue",
            Self::Collaborator { .. } => "Operation failed",
            Self::UnknownChangeKind(_) => "Unexpected error",
        }
    }
}
