//! UseCase: ゲームのやり直し（シングルプレイ）

use std::sync::Arc;

use gambit_shared::protocol::GameMode;

use crate::domain::{GameRepository, SessionId};

use super::{error::MoveError, submit_move::find_game_in_mode};

/// やり直しのユースケース
pub struct RestartGameUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
}

impl RestartGameUseCase {
    /// 新しい RestartGameUseCase を作成
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// ゲームを作成時の局面に戻し、その盤面を返す
    pub async fn execute(&self, id: &SessionId) -> Result<String, MoveError> {
        let game = find_game_in_mode(&self.repository, id, GameMode::Single).await?;
        let mut game = game.lock().await;

        game.restart();
        tracing::info!("Game '{}' restarted", id.as_str());
        Ok(game.layout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MoveOutcome,
        usecase::{
            SubmitMoveUseCase,
            test_support::{repository_with, session},
        },
    };

    #[tokio::test]
    async fn test_restart_after_moves() {
        // テスト項目: 着手後にやり直すと初期局面に戻り、白から指せる
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Single).await;
        let submit = SubmitMoveUseCase::new(repository.clone());
        let restart = RestartGameUseCase::new(repository);
        submit
            .execute(&session("g1"), GameMode::Single, None, "e2", "e4")
            .await
            .unwrap();

        // when (操作):
        let layout = restart.execute(&session("g1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(layout, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        let again = submit
            .execute(&session("g1"), GameMode::Single, None, "e2", "e4")
            .await
            .unwrap();
        assert!(matches!(again, MoveOutcome::Played(_)));
    }

    #[tokio::test]
    async fn test_restart_is_single_player_only() {
        // テスト項目: マルチプレイのゲームはやり直せない
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let restart = RestartGameUseCase::new(repository);

        // when (操作):
        let result = restart.execute(&session("g1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(MoveError::ModeMismatch("g1".to_string())));
    }
}
