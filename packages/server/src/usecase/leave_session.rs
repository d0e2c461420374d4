//! UseCase: チャンネル離脱処理

use std::sync::Arc;

use gambit_shared::{
    protocol::{ChannelMessage, Colour},
    time::Clock,
};

use crate::domain::{GameRepository, MessagePusher, SessionId};

/// チャンネル離脱のユースケース
pub struct LeaveSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl LeaveSessionUseCase {
    /// 新しい LeaveSessionUseCase を作成
    pub fn new(
        repository: Arc<dyn GameRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 座席を解除する
    ///
    /// 残りの座席があれば LEAVE を通知し、誰もいなくなればゲームを破棄します。
    pub async fn execute(&self, id: &SessionId, colour: Colour) {
        let remaining = self.message_pusher.unregister_seat(id, colour).await;

        if remaining == 0 {
            if let Err(e) = self.repository.remove(id).await {
                tracing::warn!("Failed to remove game '{}': {}", id.as_str(), e);
            } else {
                tracing::info!("Game '{}' closed", id.as_str());
            }
            return;
        }

        let mut message = ChannelMessage::leave(self.clock.now_millis());
        message.colour = Some(colour);
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize LEAVE message: {}", e);
                return;
            }
        };

        if let Err(e) = self.message_pusher.broadcast(id, &json).await {
            tracing::warn!("Failed to broadcast LEAVE in '{}': {}", id.as_str(), e);
        }
    }
}
