//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Session ID must not be empty")]
    SessionIdEmpty,

    #[error("Session ID is too long ({0} characters)")]
    SessionIdTooLong(usize),

    #[error("Session ID '{0}' contains invalid characters")]
    SessionIdInvalidCharacter(String),
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),

    #[error("Game '{0}' already exists")]
    DuplicateGame(String),
}

/// Message push errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Session '{0}' already has two seats")]
    SessionFull(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
