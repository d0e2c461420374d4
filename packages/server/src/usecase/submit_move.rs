//! UseCase: 着手処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitMoveUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - クライアントの snap-back / commit の判断はこの結果に依存する
//! - シングルプレイでは常に白として扱われることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：合法手
//! - 異常系：存在しないゲーム、モードの不一致
//! - エッジケース：昇格待ち

use std::sync::Arc;

use gambit_shared::protocol::{Colour, GameMode};
use tokio::sync::Mutex;

use crate::domain::{Game, GameRepository, MoveOutcome, SessionId};

use super::error::MoveError;

/// ゲームを取得し、モードが一致することを確認する
pub(super) async fn find_game_in_mode(
    repository: &Arc<dyn GameRepository>,
    id: &SessionId,
    mode: GameMode,
) -> Result<Arc<Mutex<Game>>, MoveError> {
    let game = repository
        .find(id)
        .await
        .ok_or_else(|| MoveError::GameNotFound(id.as_str().to_string()))?;

    if game.lock().await.mode != mode {
        return Err(MoveError::ModeMismatch(id.as_str().to_string()));
    }
    Ok(game)
}

/// シングルプレイの人間側の色
pub(super) fn player_colour(mode: GameMode, requested: Option<Colour>) -> Option<Colour> {
    match mode {
        GameMode::Single => Some(Colour::White),
        GameMode::Multi => requested,
    }
}

/// 着手のユースケース
pub struct SubmitMoveUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
}

impl SubmitMoveUseCase {
    /// 新しい SubmitMoveUseCase を作成
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// 着手を実行
    ///
    /// # Arguments
    ///
    /// * `id` - セッション ID
    /// * `mode` - リクエストされたエンドポイントのモード
    /// * `colour` - 着手する側（マルチプレイのみ使用、未指定は拒否）
    /// * `source` / `target` - 代数表記のマス
    pub async fn execute(
        &self,
        id: &SessionId,
        mode: GameMode,
        colour: Option<Colour>,
        source: &str,
        target: &str,
    ) -> Result<MoveOutcome, MoveError> {
        let game = find_game_in_mode(&self.repository, id, mode).await?;

        let Some(colour) = player_colour(mode, colour) else {
            tracing::debug!("Move without colour in game '{}' rejected", id.as_str());
            return Ok(MoveOutcome::Rejected);
        };

        let outcome = game.lock().await.play(colour, source, target);
        tracing::debug!(
            "Move {}-{} by {} in game '{}': {:?}",
            source,
            target,
            colour,
            id.as_str(),
            outcome
        );
        Ok(outcome)
    }
}
