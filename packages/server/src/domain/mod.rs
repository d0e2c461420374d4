//! Domain layer: game sessions and the interfaces the use cases depend on.

pub mod engine;
pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Game, MoveOutcome, PendingPromotion, PlayedMove};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use pusher::{MessagePusher, PusherChannel, next_seat_colour};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use repository::GameRepository;
pub use value_object::{SessionId, SessionIdFactory};
