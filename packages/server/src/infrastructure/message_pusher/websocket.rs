//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - セッションごとの座席（色と `UnboundedSender`）を管理
//! - セッションの全座席へのメッセージ送信（broadcast）
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use gambit_shared::protocol::Colour;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId, next_seat_colour};

/// 着席中のプレイヤー
struct Seat {
    colour: Colour,
    sender: PusherChannel,
}

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// セッション ID → 座席リスト（最大 2）
    seats: Mutex<HashMap<SessionId, Vec<Seat>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_seat(
        &self,
        session_id: &SessionId,
        sender: PusherChannel,
    ) -> Result<Colour, MessagePushError> {
        let mut seats = self.seats.lock().await;
        let session_seats = seats.entry(session_id.clone()).or_default();

        let occupied: Vec<Colour> = session_seats.iter().map(|seat| seat.colour).collect();
        let colour = next_seat_colour(&occupied)
            .ok_or_else(|| MessagePushError::SessionFull(session_id.as_str().to_string()))?;

        session_seats.push(Seat { colour, sender });
        tracing::debug!(
            "Seat '{}' registered in session '{}'",
            colour,
            session_id.as_str()
        );
        Ok(colour)
    }

    async fn unregister_seat(&self, session_id: &SessionId, colour: Colour) -> usize {
        let mut seats = self.seats.lock().await;
        let Some(session_seats) = seats.get_mut(session_id) else {
            return 0;
        };

        session_seats.retain(|seat| seat.colour != colour);
        let remaining = session_seats.len();
        if remaining == 0 {
            seats.remove(session_id);
        }
        tracing::debug!(
            "Seat '{}' unregistered from session '{}' ({} remaining)",
            colour,
            session_id.as_str(),
            remaining
        );
        remaining
    }

    async fn seat_count(&self, session_id: &SessionId) -> usize {
        let seats = self.seats.lock().await;
        seats.get(session_id).map_or(0, Vec::len)
    }

    async fn broadcast(
        &self,
        session_id: &SessionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let seats = self.seats.lock().await;
        let Some(session_seats) = seats.get(session_id) else {
            tracing::warn!(
                "Session '{}' has no seats during broadcast, skipping",
                session_id.as_str()
            );
            return Ok(());
        };

        for seat in session_seats {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = seat.sender.send(content.to_string()) {
                tracing::warn!(
                    "Failed to push message to seat '{}' of session '{}': {}",
                    seat.colour,
                    session_id.as_str(),
                    e
                );
            } else {
                tracing::debug!(
                    "Broadcasted message to seat '{}' of session '{}'",
                    seat.colour,
                    session_id.as_str()
                );
            }
        }

        Ok(())
    }
}
