//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use gambit_shared::time::SystemClock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryGameRepository},
    usecase::{
        AutoMoveUseCase, CreateGameUseCase, JoinSessionUseCase, LeaveSessionUseCase,
        PromotePawnUseCase, RelayMessageUseCase, RestartGameUseCase, SubmitMoveUseCase,
        SweepIdleGamesUseCase,
    },
};

use super::{
    handler::{
        auto_move, create_game, health_check, multi_move, multi_promote, restart_game,
        single_move, single_promote, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
    sweeper::{DEFAULT_IDLE_TIMEOUT, SWEEP_INTERVAL, spawn_sweeper},
};

/// Chess game server
///
/// # Example
///
/// ```ignore
/// let server = Server::with_in_memory_storage();
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance from its use cases
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_game_usecase: Arc<CreateGameUseCase>,
        submit_move_usecase: Arc<SubmitMoveUseCase>,
        promote_pawn_usecase: Arc<PromotePawnUseCase>,
        auto_move_usecase: Arc<AutoMoveUseCase>,
        restart_game_usecase: Arc<RestartGameUseCase>,
        join_session_usecase: Arc<JoinSessionUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        leave_session_usecase: Arc<LeaveSessionUseCase>,
        sweep_idle_games_usecase: Arc<SweepIdleGamesUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                create_game_usecase,
                submit_move_usecase,
                promote_pawn_usecase,
                auto_move_usecase,
                restart_game_usecase,
                join_session_usecase,
                relay_message_usecase,
                leave_session_usecase,
                sweep_idle_games_usecase,
            }),
        }
    }

    /// Server wired to the in-memory repository and the WebSocket pusher
    pub fn with_in_memory_storage() -> Self {
        let repository = Arc::new(InMemoryGameRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let clock = Arc::new(SystemClock);

        Self::new(
            Arc::new(CreateGameUseCase::new(repository.clone())),
            Arc::new(SubmitMoveUseCase::new(repository.clone())),
            Arc::new(PromotePawnUseCase::new(repository.clone())),
            Arc::new(AutoMoveUseCase::new(repository.clone())),
            Arc::new(RestartGameUseCase::new(repository.clone())),
            Arc::new(JoinSessionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(RelayMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(LeaveSessionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            Arc::new(SweepIdleGamesUseCase::new(
                repository,
                message_pusher,
                clock,
                DEFAULT_IDLE_TIMEOUT,
            )),
        )
    }

    /// Routes of the game server
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/{session_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/games", post(create_game))
            .route("/mp/move", post(multi_move))
            .route("/mp/promote", post(multi_promote))
            .route("/sp/move", post(single_move))
            .route("/sp/promote", post(single_promote))
            .route("/sp/automove", post(auto_move))
            .route("/sp/new", post(restart_game))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until the shutdown signal
    ///
    /// Idle games are swept in the background while the server runs.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let sweeper = spawn_sweeper(self.state.sweep_idle_games_usecase.clone(), SWEEP_INTERVAL);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        sweeper.abort();
        result
    }

    /// Run the game server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chess server listening on {}", listener.local_addr()?);
        tracing::info!("Create a game with: POST http://{}/api/games", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
