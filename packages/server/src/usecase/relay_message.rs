//! UseCase: チャンネルメッセージの中継処理
//!
//! クライアントから届いたエンベロープに送信者の色を付与し、
//! セッションの全座席（送信者を含む）へ配信します。
//! JOIN には現在の盤面と着席人数を付与します。
//! MOVE の内容と判定は、送信者がサーバーで実際に指した最新の手で置き換えます。
//! まだ中継していない手がなければ MOVE は配信しません。

use std::sync::Arc;

use gambit_shared::{
    protocol::{ChannelMessage, Colour, MessageType},
    time::Clock,
};

use crate::domain::{GameRepository, MessagePusher, SessionId};

use super::error::RelayError;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 送信時刻が未設定のメッセージに使う時計
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
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

    /// 受信したテキストを中継する
    ///
    /// # Returns
    ///
    /// * `Ok(ChannelMessage)` - 配信したメッセージ
    /// * `Err(RelayError)` - 不正なメッセージ、または配信失敗
    pub async fn execute(
        &self,
        id: &SessionId,
        sender: Colour,
        text: &str,
    ) -> Result<ChannelMessage, RelayError> {
        let mut message: ChannelMessage =
            serde_json::from_str(text).map_err(|e| RelayError::InvalidMessage(e.to_string()))?;

        message.colour = Some(sender);
        if message.sent_at == 0 {
            message.sent_at = self.clock.now_millis();
        }

        match message.r#type {
            MessageType::Join => {
                if let Some(game) = self.repository.find(id).await {
                    message.content = Some(game.lock().await.layout());
                }
                message.players = self.message_pusher.seat_count(id).await as u32;
            }
            MessageType::Move => {
                let played = match self.repository.find(id).await {
                    Some(game) => game.lock().await.take_unrelayed_move(sender),
                    None => None,
                };
                let Some(played) = played else {
                    return Err(RelayError::NoMoveToRelay(sender.as_str().to_string()));
                };
                message.content = Some(played.notation.to_string());
                message.move_response = Some(played.into());
            }
            MessageType::Seat => {
                return Err(RelayError::InvalidMessage(
                    "SEAT is only sent by the server".to_string(),
                ));
            }
            MessageType::Leave => {}
        }

        let json = serde_json::to_string(&message)
            .map_err(|e| RelayError::SerializationFailed(e.to_string()))?;

        self.message_pusher
            .broadcast(id, &json)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))?;

        tracing::debug!(
            "Relayed {:?} from {} in session '{}'",
            message.r#type,
            sender,
            id.as_str()
        );
        Ok(message)
    }
}
