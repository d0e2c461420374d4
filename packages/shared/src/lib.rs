//! Code shared by the Gambit server and client.
//!
//! - `protocol`: wire types exchanged over HTTP and the session channel
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: timestamp helpers

pub mod logger;
pub mod protocol;
pub mod time;
