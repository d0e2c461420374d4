//! Conversion logic between domain results and wire DTOs.

use gambit_shared::protocol::{GameStatus, MoveResponse, ResponseType};

use crate::domain::{MoveOutcome, PlayedMove};

// ========================================
// Domain → DTO
// ========================================

impl From<PlayedMove> for MoveResponse {
    fn from(played: PlayedMove) -> Self {
        Self {
            response_type: ResponseType::Ok,
            game_fen: Some(played.layout),
            refresh: played.refresh,
            capture: played.capture,
            promotion: false,
            end_of_game: played.status.is_end_of_game(),
            game_status: Some(played.status),
            played_move: Some(played.notation.to_string()),
        }
    }
}

impl From<MoveOutcome> for MoveResponse {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Rejected => MoveResponse::snapback(),
            MoveOutcome::PromotionPending { layout } => MoveResponse::promotion_required(layout),
            MoveOutcome::Played(played) => played.into(),
        }
    }
}
