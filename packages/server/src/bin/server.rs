//! Gambit chess game server.
//!
//! Hosts game sessions over HTTP and relays moves between the two seats of
//! a multiplayer session over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin gambit-server
//! cargo run --bin gambit-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use gambit_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryGameRepository},
    ui::{DEFAULT_IDLE_TIMEOUT, Server},
    usecase::{
        AutoMoveUseCase, CreateGameUseCase, JoinSessionUseCase, LeaveSessionUseCase,
        PromotePawnUseCase, RelayMessageUseCase, RestartGameUseCase, SubmitMoveUseCase,
        SweepIdleGamesUseCase,
    },
};
use gambit_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "gambit-server")]
#[command(about = "Chess game server for two-player and single-player sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds after which an untouched game without players is removed
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs())]
    idle_timeout: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory database)
    let repository = Arc::new(InMemoryGameRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let clock = Arc::new(SystemClock);

    // 3. Create UseCases
    let create_game_usecase = Arc::new(CreateGameUseCase::new(repository.clone()));
    let submit_move_usecase = Arc::new(SubmitMoveUseCase::new(repository.clone()));
    let promote_pawn_usecase = Arc::new(PromotePawnUseCase::new(repository.clone()));
    let auto_move_usecase = Arc::new(AutoMoveUseCase::new(repository.clone()));
    let restart_game_usecase = Arc::new(RestartGameUseCase::new(repository.clone()));
    let join_session_usecase = Arc::new(JoinSessionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let leave_session_usecase = Arc::new(LeaveSessionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let sweep_idle_games_usecase = Arc::new(SweepIdleGamesUseCase::new(
        repository,
        message_pusher,
        clock,
        Duration::from_secs(args.idle_timeout),
    ));

    // 4. Create and run the server
    let server = Server::new(
        create_game_usecase,
        submit_move_usecase,
        promote_pawn_usecase,
        auto_move_usecase,
        restart_game_usecase,
        join_session_usecase,
        relay_message_usecase,
        leave_session_usecase,
        sweep_idle_games_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
