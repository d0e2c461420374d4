//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Form, Json, extract::State, http::StatusCode};
use gambit_shared::protocol::{
    AutoMoveForm, CreateGameForm, CreatedGame, GameMode, MoveForm, MoveResponse, PromotionForm,
    RestartForm,
};

use crate::{
    domain::SessionId,
    ui::state::AppState,
    usecase::{CreateGameError, MoveError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a game session
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CreateGameForm>,
) -> Result<Json<CreatedGame>, StatusCode> {
    match state
        .create_game_usecase
        .execute(form.mode, form.fen.as_deref())
        .await
    {
        Ok(created) => Ok(Json(CreatedGame {
            id: created.id.into_string(),
            game_fen: created.layout,
        })),
        Err(e @ (CreateGameError::InvalidPosition(_) | CreateGameError::PositionNotSupported)) => {
            tracing::warn!("Game creation refused: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Failed to create game: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn multi_move(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MoveForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    submit_move(state, GameMode::Multi, form).await
}

pub async fn single_move(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MoveForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    submit_move(state, GameMode::Single, form).await
}

pub async fn multi_promote(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PromotionForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    promote(state, GameMode::Multi, form).await
}

pub async fn single_promote(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PromotionForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    promote(state, GameMode::Single, form).await
}

/// Let the engine play black's reply
pub async fn auto_move(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AutoMoveForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    let id = parse_session_id(form.id)?;
    let outcome = state
        .auto_move_usecase
        .execute(&id)
        .await
        .map_err(status_of)?;
    Ok(Json(outcome.into()))
}

/// Put a single-player game back at its starting position
pub async fn restart_game(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RestartForm>,
) -> Result<Json<MoveResponse>, StatusCode> {
    let id = parse_session_id(form.id)?;
    let layout = state
        .restart_game_usecase
        .execute(&id)
        .await
        .map_err(status_of)?;
    Ok(Json(MoveResponse::restarted(layout)))
}

async fn submit_move(
    state: Arc<AppState>,
    mode: GameMode,
    form: MoveForm,
) -> Result<Json<MoveResponse>, StatusCode> {
    let id = parse_session_id(form.id)?;
    let outcome = state
        .submit_move_usecase
        .execute(&id, mode, form.colour, &form.source, &form.target)
        .await
        .map_err(status_of)?;
    Ok(Json(outcome.into()))
}

async fn promote(
    state: Arc<AppState>,
    mode: GameMode,
    form: PromotionForm,
) -> Result<Json<MoveResponse>, StatusCode> {
    let id = parse_session_id(form.id)?;
    let outcome = state
        .promote_pawn_usecase
        .execute(&id, mode, form.colour, &form.promotion)
        .await
        .map_err(status_of)?;
    Ok(Json(outcome.into()))
}

/// Malformed ids can never name a session
fn parse_session_id(raw: String) -> Result<SessionId, StatusCode> {
    SessionId::try_from(raw).map_err(|e| {
        tracing::warn!("Invalid session id: {}", e);
        StatusCode::NOT_FOUND
    })
}

fn status_of(error: MoveError) -> StatusCode {
    tracing::warn!("Move request refused: {}", error);
    match error {
        MoveError::GameNotFound(_) => StatusCode::NOT_FOUND,
        MoveError::ModeMismatch(_) => StatusCode::BAD_REQUEST,
    }
}
