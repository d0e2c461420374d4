//! Gambit move exchange client.
//!
//! Turns typed moves into server move requests, interprets the verdicts
//! (including the promotion dialog) and exchanges confirmed moves with the
//! opponent over the session channel.

pub mod board;
pub mod channel;
pub mod command;
pub mod error;
pub mod formatter;
pub mod promotion;
pub mod runner;
pub mod session;
pub mod transport;
mod ui;

pub use runner::{ClientConfig, run_client};
