//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::{
    AutoMoveUseCase, CreateGameUseCase, JoinSessionUseCase, LeaveSessionUseCase,
    PromotePawnUseCase, RelayMessageUseCase, RestartGameUseCase, SubmitMoveUseCase,
    SweepIdleGamesUseCase,
};

/// Shared application state
pub struct AppState {
    /// CreateGameUseCase（ゲーム作成のユースケース）
    pub create_game_usecase: Arc<CreateGameUseCase>,
    /// SubmitMoveUseCase（着手のユースケース）
    pub submit_move_usecase: Arc<SubmitMoveUseCase>,
    /// PromotePawnUseCase（昇格のユースケース）
    pub promote_pawn_usecase: Arc<PromotePawnUseCase>,
    /// AutoMoveUseCase（エンジン着手のユースケース）
    pub auto_move_usecase: Arc<AutoMoveUseCase>,
    /// RestartGameUseCase（やり直しのユースケース）
    pub restart_game_usecase: Arc<RestartGameUseCase>,
    /// JoinSessionUseCase（チャンネル参加のユースケース）
    pub join_session_usecase: Arc<JoinSessionUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// LeaveSessionUseCase（チャンネル離脱のユースケース）
    pub leave_session_usecase: Arc<LeaveSessionUseCase>,
    /// SweepIdleGamesUseCase（放置ゲーム掃除のユースケース）
    pub sweep_idle_games_usecase: Arc<SweepIdleGamesUseCase>,
}
