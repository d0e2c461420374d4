//! UseCase layer: one struct per operation of the game server.

mod auto_move;
mod create_game;
mod error;
mod join_session;
mod leave_session;
mod promote_pawn;
mod relay_message;
mod restart_game;
mod submit_move;
mod sweep_idle_games;

pub use auto_move::AutoMoveUseCase;
pub use create_game::{CreateGameUseCase, CreatedSession};
pub use error::{CreateGameError, JoinError, MoveError, RelayError};
pub use join_session::{JoinSessionUseCase, SeatAssignment};
pub use leave_session::LeaveSessionUseCase;
pub use promote_pawn::PromotePawnUseCase;
pub use relay_message::RelayMessageUseCase;
pub use restart_game::RestartGameUseCase;
pub use submit_move::SubmitMoveUseCase;
pub use sweep_idle_games::SweepIdleGamesUseCase;
