//! UseCase: 昇格処理

use std::sync::Arc;

use gambit_shared::protocol::{Colour, GameMode};

use crate::domain::{GameRepository, MoveOutcome, SessionId};

use super::{
    error::MoveError,
    submit_move::{find_game_in_mode, player_colour},
};

/// 昇格のユースケース
pub struct PromotePawnUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
}

impl PromotePawnUseCase {
    /// 新しい PromotePawnUseCase を作成
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// 保留中の昇格を `piece` で完了する
    pub async fn execute(
        &self,
        id: &SessionId,
        mode: GameMode,
        colour: Option<Colour>,
        piece: &str,
    ) -> Result<MoveOutcome, MoveError> {
        let game = find_game_in_mode(&self.repository, id, mode).await?;

        let Some(colour) = player_colour(mode, colour) else {
            return Ok(MoveOutcome::Rejected);
        };

        let outcome = game.lock().await.promote(colour, piece);
        tracing::debug!(
            "Promotion to '{}' by {} in game '{}': {:?}",
            piece,
            colour,
            id.as_str(),
            outcome
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Game, GameRepository},
        infrastructure::repository::InMemoryGameRepository,
        usecase::{
            SubmitMoveUseCase,
            test_support::{repository_with, session},
        },
    };
    use shakmaty::{CastlingMode, Chess, fen::Fen};

    async fn repository_with_promotable_pawn() -> Arc<InMemoryGameRepository> {
        let position: Chess = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1"
            .parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap();
        let repository = Arc::new(InMemoryGameRepository::new());
        repository
            .insert(Game::with_position(session("g1"), GameMode::Multi, position))
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_promote_after_pending_move() {
        // テスト項目: 昇格待ちの後に駒を選ぶと着手が完了する
        // given (前提条件):
        let repository = repository_with_promotable_pawn().await;
        let submit = SubmitMoveUseCase::new(repository.clone());
        let promote = PromotePawnUseCase::new(repository);
        let pending = submit
            .execute(&session("g1"), GameMode::Multi, Some(Colour::White), "a7", "a8")
            .await
            .unwrap();
        assert!(matches!(pending, MoveOutcome::PromotionPending { .. }));

        // when (操作):
        let result = promote
            .execute(&session("g1"), GameMode::Multi, Some(Colour::White), "q")
            .await;

        // then (期待する結果):
        let Ok(MoveOutcome::Played(played)) = result else {
            panic!("expected a played promotion");
        };
        assert_eq!(played.layout, "Q3k3/8/8/8/8/8/8/4K3");
    }

    #[tokio::test]
    async fn test_promote_without_pending_move() {
        // テスト項目: 昇格待ちがない状態の昇格要求は拒否される
        // given (前提条件):
        let repository = repository_with("g1", GameMode::Multi).await;
        let promote = PromotePawnUseCase::new(repository);

        // when (操作):
        let result = promote
            .execute(&session("g1"), GameMode::Multi, Some(Colour::White), "q")
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(MoveOutcome::Rejected));
    }
}
