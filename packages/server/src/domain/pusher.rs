//! MessagePusher trait 定義
//!
//! セッションのチャンネル（座席）へのメッセージ送信を抽象化します。
//! 座席の色の割り当ては送信先の登録と同じロックの中で行う必要があるため、
//! 割り当て規則 `next_seat_colour` はドメイン層の純粋関数として定義し、
//! 実装側から呼び出します。

use async_trait::async_trait;
use gambit_shared::protocol::Colour;
use tokio::sync::mpsc;

use super::{MessagePushError, SessionId};

/// 座席ごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// 次に着席するプレイヤーの色を決める
///
/// - 誰もいなければ白
/// - 一人いればその反対の色
/// - 二人いれば満席（`None`）
pub fn next_seat_colour(occupied: &[Colour]) -> Option<Colour> {
    match occupied {
        [] => Some(Colour::White),
        [existing] => Some(existing.opposite()),
        _ => None,
    }
}

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 座席を登録し、割り当てた色を返す
    async fn register_seat(
        &self,
        session_id: &SessionId,
        sender: PusherChannel,
    ) -> Result<Colour, MessagePushError>;

    /// 座席を解除し、残りの座席数を返す
    async fn unregister_seat(&self, session_id: &SessionId, colour: Colour) -> usize;

    /// 着席中の座席数を取得
    async fn seat_count(&self, session_id: &SessionId) -> usize;

    /// セッションの全座席にメッセージを送信
    async fn broadcast(&self, session_id: &SessionId, content: &str)
    -> Result<(), MessagePushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seat_is_white() {
        // テスト項目: 最初の着席者は白になる
        // given (前提条件):
        let occupied = [];

        // when (操作):
        let colour = next_seat_colour(&occupied);

        // then (期待する結果):
        assert_eq!(colour, Some(Colour::White));
    }

    #[test]
    fn test_second_seat_takes_opposite_colour() {
        // テスト項目: 二人目は先に座っている側の反対の色になる
        // given (前提条件):
        let occupied = [Colour::Black];

        // when (操作):
        let colour = next_seat_colour(&occupied);

        // then (期待する結果):
        assert_eq!(colour, Some(Colour::White));
    }

    #[test]
    fn test_third_seat_is_refused() {
        // テスト項目: 三人目は着席できない
        // given (前提条件):
        let occupied = [Colour::White, Colour::Black];

        // when (操作):
        let colour = next_seat_colour(&occupied);

        // then (期待する結果):
        assert_eq!(colour, None);
    }
}
