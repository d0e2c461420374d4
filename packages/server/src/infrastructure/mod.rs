//! Infrastructure layer: concrete storage, message delivery and DTO conversion.

pub mod dto;
pub mod message_pusher;
pub mod repository;
