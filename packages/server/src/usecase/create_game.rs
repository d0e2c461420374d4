//! UseCase: ゲーム作成処理

use std::sync::Arc;

use gambit_shared::protocol::{Colour, GameMode};

use crate::domain::{Game, GameRepository, SessionId, SessionIdFactory};

use super::error::CreateGameError;

/// 作成したゲーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: SessionId,
    /// 開始局面の盤面
    pub layout: String,
}

/// ゲーム作成のユースケース
pub struct CreateGameUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn GameRepository>,
}

impl CreateGameUseCase {
    /// 新しい CreateGameUseCase を作成
    pub fn new(repository: Arc<dyn GameRepository>) -> Self {
        Self { repository }
    }

    /// ゲームを作成し、セッション ID と開始局面を返す
    ///
    /// # Arguments
    ///
    /// * `mode` - シングルプレイ / マルチプレイ
    /// * `fen` - 開始局面（シングルプレイのみ、白番であること）。省略時は初期局面
    pub async fn execute(
        &self,
        mode: GameMode,
        fen: Option<&str>,
    ) -> Result<CreatedSession, CreateGameError> {
        let id = SessionIdFactory::generate().map_err(|_| CreateGameError::IdGenerationFailed)?;

        let game = match fen.filter(|fen| !fen.trim().is_empty()) {
            None => Game::new(id.clone(), mode),
            Some(_) if mode != GameMode::Single => {
                return Err(CreateGameError::PositionNotSupported);
            }
            Some(fen) => {
                let position =
                    Game::position_from_fen(fen).map_err(CreateGameError::InvalidPosition)?;
                let game = Game::with_position(id.clone(), mode, position);
                if game.turn() != Colour::White || game.status().is_end_of_game() {
                    return Err(CreateGameError::InvalidPosition(
                        "the position must be a running game with white to move".to_string(),
                    ));
                }
                game
            }
        };
        let layout = game.layout();

        self.repository
            .insert(game)
            .await
            .map_err(|e| CreateGameError::StorageFailed(e.to_string()))?;

        tracing::info!("Game '{}' created ({:?})", id.as_str(), mode);
        Ok(CreatedSession { id, layout })
    }
}
