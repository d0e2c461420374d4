//! UseCase: チャンネル参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinSessionUseCase::check() / execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 座席の色（白→黒）の割り当てがクライアントの盤面の向きを決める
//! - 色は SEAT メッセージで本人にだけ、他のどの配信よりも先に届ける
//! - 三人目の参加を拒否する
//!
//! ### どのような状況を想定しているか
//! - 正常系：一人目、二人目の参加、アップグレード前の参加確認
//! - 異常系：存在しないゲーム、シングルプレイのゲーム、満席

use std::sync::Arc;

use gambit_shared::{
    protocol::{ChannelMessage, Colour, GameMode},
    time::Clock,
};

use crate::domain::{GameRepository, MessagePushError, MessagePusher, PusherChannel, SessionId};

use super::error::JoinError;

/// 確保した座席
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    pub colour: Colour,
    /// この座席だけに最初に送る SEAT メッセージ
    pub message: ChannelMessage,
}

/// チャンネル参加のユースケース
pub struct JoinSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinSessionUseCase {
    /// 新しい JoinSessionUseCase を作成
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

    /// 座席を確保せずに参加できるかを確認する
    ///
    /// WebSocket へのアップグレード前に、404 / 409 を返すために使います。
    pub async fn check(&self, id: &SessionId) -> Result<(), JoinError> {
        self.find_multiplayer_layout(id).await?;
        if self.message_pusher.seat_count(id).await >= 2 {
            return Err(JoinError::SessionFull(id.as_str().to_string()));
        }
        Ok(())
    }

    /// 座席を確保し、割り当てた色と SEAT メッセージを返す
    ///
    /// # Arguments
    ///
    /// * `id` - セッション ID
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(
        &self,
        id: &SessionId,
        sender: PusherChannel,
    ) -> Result<SeatAssignment, JoinError> {
        let layout = self.find_multiplayer_layout(id).await?;

        let colour = self
            .message_pusher
            .register_seat(id, sender)
            .await
            .map_err(|e| match e {
                MessagePushError::SessionFull(id) => JoinError::SessionFull(id),
                MessagePushError::PushFailed(reason) => JoinError::RegistrationFailed(reason),
            })?;

        Ok(SeatAssignment {
            colour,
            message: ChannelMessage::seat(colour, layout, self.clock.now_millis()),
        })
    }

    async fn find_multiplayer_layout(&self, id: &SessionId) -> Result<String, JoinError> {
        let game = self
            .repository
            .find(id)
            .await
            .ok_or_else(|| JoinError::GameNotFound(id.as_str().to_string()))?;

        let game = game.lock().await;
        if game.mode != GameMode::Multi {
            return Err(JoinError::NotMultiplayer(id.as_str().to_string()));
        }
        Ok(game.layout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MockMessagePusher,
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::test_support::{repository_with, session},
    };
    use gambit_shared::{protocol::MessageType, time::FixedClock};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_first_and_second_players_get_opposite_colours() {
        // テスト項目: 一人目は白、二人目は黒の座席を得る
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(&session("g1"), tx1).await;
        let second = usecase.execute(&session("g1"), tx2).await;

        // then (期待する結果):
        assert_eq!(first.unwrap().colour, Colour::White);
        assert_eq!(second.unwrap().colour, Colour::Black);
    }

    #[tokio::test]
    async fn test_third_player_is_refused() {
        // テスト項目: 三人目の参加は SessionFull になる
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        usecase.execute(&session("g1"), tx1).await.unwrap();
        usecase.execute(&session("g1"), tx2).await.unwrap();

        // when (操作):
        let result = usecase.execute(&session("g1"), tx3).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::SessionFull("g1".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_game_does_not_register_seat() {
        // テスト項目: 存在しないゲームでは座席登録が呼ばれない
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_seat().times(0);
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(pusher),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(&session("missing"), tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::GameNotFound("missing".to_string())));
    }

    #[tokio::test]
    async fn test_single_player_game_has_no_channel() {
        // テスト項目: シングルプレイのゲームにはチャンネル参加できない
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Single).await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_seat().times(0);
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(pusher),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(&session("g1"), tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::NotMultiplayer("g1".to_string())));
    }

    #[tokio::test]
    async fn test_seat_message_carries_colour_and_layout() {
        // テスト項目: SEAT メッセージに割り当てた色と現在の盤面が入る
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase.execute(&session("g1"), tx1).await.unwrap();

        // when (操作):
        let seat = usecase.execute(&session("g1"), tx2).await.unwrap();

        // then (期待する結果):
        assert_eq!(seat.message.r#type, MessageType::Seat);
        assert_eq!(seat.message.colour, Some(Colour::Black));
        assert_eq!(seat.message.sent_at, 1_000);
        assert_eq!(
            seat.message.content.as_deref(),
            Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
        );
    }

    #[tokio::test]
    async fn test_check_does_not_take_a_seat() {
        // テスト項目: 参加確認は座席を確保しない
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = JoinSessionUseCase::new(
            repository,
            pusher.clone(),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let result = usecase.check(&session("g1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(pusher.seat_count(&session("g1")).await, 0);
    }

    #[tokio::test]
    async fn test_check_reports_full_session() {
        // テスト項目: 満席のセッションは確認の段階で SessionFull になる
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let usecase = JoinSessionUseCase::new(
            repository,
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase.execute(&session("g1"), tx1).await.unwrap();
        usecase.execute(&session("g1"), tx2).await.unwrap();

        // when (操作):
        let result = usecase.check(&session("g1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::SessionFull("g1".to_string())));
    }
}
