//! Request handlers.

mod http;
mod websocket;

pub use http::{
    auto_move, create_game, health_check, multi_move, multi_promote, restart_game, single_move,
    single_promote,
};
pub use websocket::websocket_handler;
