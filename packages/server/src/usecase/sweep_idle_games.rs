//! UseCase: 放置されたゲームの掃除
//!
//! 一定時間アクセスがなく、チャンネルに誰も着席していないゲームを破棄します。
//! シングルプレイのゲームや、作成後に誰も参加しなかったマルチプレイのゲームは
//! 座席の解除を経ないため、ここで回収します。

use std::{sync::Arc, time::Duration};

use gambit_shared::time::Clock;

use crate::domain::{GameRepository, MessagePusher};

/// 放置ゲーム掃除のユースケース
pub struct SweepIdleGamesUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
    /// MessagePusher（着席人数の確認に使う）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 最後のアクセスからこの時間を過ぎたゲームが対象
    idle_timeout: Duration,
}

impl SweepIdleGamesUseCase {
    /// 新しい SweepIdleGamesUseCase を作成
    pub fn new(
        repository: Arc<dyn GameRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            idle_timeout,
        }
    }

    /// 放置されたゲームを破棄し、破棄した件数を返す
    pub async fn execute(&self) -> usize {
        let cutoff = self.clock.now_millis() - self.idle_timeout.as_millis() as i64;
        let mut removed = 0;

        for id in self.repository.idle_games(cutoff).await {
            if self.message_pusher.seat_count(&id).await > 0 {
                continue;
            }
            match self.repository.remove(&id).await {
                Ok(()) => {
                    tracing::info!("Game '{}' expired", id.as_str());
                    removed += 1;
                }
                Err(e) => tracing::warn!("Failed to expire game '{}': {}", id.as_str(), e),
            }
        }

        removed
    }
}
