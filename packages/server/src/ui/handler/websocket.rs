//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::SessionId,
    ui::state::AppState,
    usecase::{JoinError, SeatAssignment},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let session_id = match SessionId::try_from(session_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid session id format: '{}'", session_id);
            return Err(StatusCode::NOT_FOUND);
        }
    };

    // The seat itself is taken only once the upgrade has succeeded
    if let Err(e) = state.join_session_usecase.check(&session_id).await {
        tracing::warn!("{}. Rejecting connection.", e);
        return Err(status_of(&e));
    }

    Ok(ws.on_upgrade(move |socket| take_seat(socket, state, session_id)))
}

fn status_of(error: &JoinError) -> StatusCode {
    match error {
        JoinError::SessionFull(_) => StatusCode::CONFLICT,
        JoinError::GameNotFound(_) | JoinError::NotMultiplayer(_) => StatusCode::NOT_FOUND,
        JoinError::RegistrationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Registers the seat of an upgraded socket, or closes the socket when the
/// session filled up in the meantime.
async fn take_seat(mut socket: WebSocket, state: Arc<AppState>, session_id: SessionId) {
    // Create a channel for this seat to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    match state.join_session_usecase.execute(&session_id, tx).await {
        Ok(seat) => {
            tracing::info!(
                "Player {} seated in session '{}'",
                seat.colour,
                session_id.as_str()
            );
            handle_socket(socket, state, session_id, seat, rx).await;
        }
        Err(e) => {
            tracing::warn!("{}. Closing connection.", e);
            let frame = CloseFrame {
                code: close_code::POLICY,
                reason: e.to_string().into(),
            };
            if let Err(e) = socket.send(Message::Close(Some(frame))).await {
                tracing::debug!("Failed to send close frame: {}", e);
            }
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for messages relayed in the session
/// * `sender` - WebSocket sink to send messages to this seat
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: SessionId,
    seat: SeatAssignment,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let colour = seat.colour;
    let (mut sender, mut receiver) = socket.split();

    // The seat assignment goes out before the pusher loop drains any broadcast
    let delivered = match serde_json::to_string(&seat.message) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize SEAT message: {}", e);
            false
        }
    };
    if !delivered {
        state
            .leave_session_usecase
            .execute(&session_id, colour)
            .await;
        return;
    }

    let state_clone = state.clone();
    let session_id_clone = session_id.clone();

    // Spawn a task to relay messages from this seat to the whole session
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from {}: {}", colour, text.as_str());
                    if let Err(e) = state_clone
                        .relay_message_usecase
                        .execute(&session_id_clone, colour, text.as_str())
                        .await
                    {
                        tracing::warn!("Failed to relay message: {}", e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Player {} requested close", colour);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push session messages to this seat
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .leave_session_usecase
        .execute(&session_id, colour)
        .await;
    tracing::info!(
        "Player {} left session '{}'",
        colour,
        session_id.as_str()
    );
}
