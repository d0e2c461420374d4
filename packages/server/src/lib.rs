//! Gambit game server library.
//!
//! Owns chess game sessions, validates moves, answers single-player
//! auto-move requests and relays channel messages between the two seats
//! of a session.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
