//! HTTP / WebSocket game server.

mod handler;
mod server;
mod signal;
pub mod state;
mod sweeper;

pub use server::Server;
pub use sweeper::{DEFAULT_IDLE_TIMEOUT, SWEEP_INTERVAL};
