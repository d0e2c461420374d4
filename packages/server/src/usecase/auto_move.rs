//! UseCase: エンジンの着手処理（シングルプレイ）

use std::sync::Arc;

use gambit_shared::protocol::{Colour, GameMode};

use crate::domain::{GameRepository, MoveOutcome, SessionId};

use super::{error::MoveError, submit_move::find_game_in_mode};

/// エンジンが担当する色
const ENGINE_COLOUR: Colour = Colour::Black;

/// エンジン着手のユースケース
pub struct AutoMoveUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
}

impl AutoMoveUseCase {
    /// 新しい AutoMoveUseCase を作成
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// エンジンの手番であれば一手指す
    pub async fn execute(&self, id: &SessionId) -> Result<MoveOutcome, MoveError> {
        let game = find_game_in_mode(&self.repository, id, GameMode::Single).await?;
        let mut game = game.lock().await;

        if game.turn() != ENGINE_COLOUR {
            tracing::debug!("Auto-move requested out of turn in game '{}'", id.as_str());
            return Ok(MoveOutcome::Rejected);
        }

        let outcome = game.play_auto();
        tracing::debug!("Engine move in game '{}': {:?}", id.as_str(), outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::{
        SubmitMoveUseCase,
        test_support::{repository_with, session},
    };

    #[tokio::test]
    async fn test_auto_move_after_player_move() {
        // テスト項目: プレイヤーの着手後にエンジンが指す
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Single).await;
        let submit = SubmitMoveUseCase::new(repository.clone());
        let auto = AutoMoveUseCase::new(repository);
        submit
            .execute(&session("g1"), GameMode::Single, None, "e2", "e4")
            .await
            .unwrap();

        // when (操作):
        let result = auto.execute(&session("g1")).await;

        // then (期待する結果):
        let Ok(MoveOutcome::Played(played)) = result else {
            panic!("expected an engine move");
        };
        assert!(played.notation.source.ends_with('7') || played.notation.source.ends_with('8'));
    }

    #[tokio::test]
    async fn test_auto_move_out_of_turn() {
        // テスト項目: エンジンの手番でなければ拒否される
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Single).await;
        let auto = AutoMoveUseCase::new(repository);

        // when (操作):
        let result = auto.execute(&session("g1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(MoveOutcome::Rejected));
    }

    #[tokio::test]
    async fn test_auto_move_in_multiplayer_game() {
        // テスト項目: マルチプレイのゲームではエンジンは使えない
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let auto = AutoMoveUseCase::new(repository);

        // when (操作):
        let result = auto.execute(&session("g1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(MoveError::ModeMismatch("g1".to_string())));
    }
}
