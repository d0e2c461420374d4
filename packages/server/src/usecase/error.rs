//! UseCase errors.

use thiserror::Error;

/// Errors of game creation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateGameError {
    #[error("Failed to generate a session ID")]
    IdGenerationFailed,

    #[error("Failed to store the game: {0}")]
    StorageFailed(String),

    #[error("Invalid starting position: {0}")]
    InvalidPosition(String),

    #[error("A starting position is only supported in single-player games")]
    PositionNotSupported,
}

/// Errors of move, promotion and auto-move requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),

    #[error("Game '{0}' is not played in this mode")]
    ModeMismatch(String),
}

/// Errors of joining a session channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),

    #[error("Game '{0}' is not a multiplayer game")]
    NotMultiplayer(String),

    #[error("Session '{0}' already has two players")]
    SessionFull(String),

    #[error("Failed to register seat: {0}")]
    RegistrationFailed(String),
}

/// Errors of relaying a channel message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Invalid channel message: {0}")]
    InvalidMessage(String),

    #[error("No move of {0} waiting to be relayed")]
    NoMoveToRelay(String),

    #[error("Failed to serialize message: {0}")]
    SerializationFailed(String),

    #[error("Failed to broadcast message: {0}")]
    BroadcastFailed(String),
}
