//! Error types for the move exchange client.

use thiserror::Error;

/// Client-level errors reported by the binary
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session channel could not be opened
    #[error("Couldn't connect to the game")]
    ConnectFailed(#[source] ChannelError),

    /// Creating a new game failed
    #[error("Couldn't create a game: {0}")]
    CreateFailed(#[source] TransportError),
}

/// Failures of a move request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Failures of the session channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Session '{0}' already has two players")]
    SessionFull(String),

    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Channel closed")]
    Closed,
}

/// Misuse of the promotion dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromotionError {
    #[error("A promotion is already being chosen")]
    AlreadyShown,

    #[error("No promotion is pending")]
    NotShown,
}

/// Unrecognised input line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unrecognised command '{0}'")]
    Unrecognised(String),

    #[error("Unknown promotion piece '{0}' (choose q, r, b or n)")]
    UnknownPiece(String),
}
