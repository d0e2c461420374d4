//! InMemory Game Repository 実装
//!
//! ドメイン層が定義する GameRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//! 放置されたゲームを見つけられるよう、登録・取得のたびに時刻を記録します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use gambit_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{Game, GameRepository, RepositoryError, SessionId};

/// 登録済みのゲームと最終アクセス時刻
struct StoredGame {
    game: Arc<Mutex<Game>>,
    touched_at: i64,
}

/// インメモリ Game Repository 実装
pub struct InMemoryGameRepository {
    /// セッション ID → ゲーム
    games: Mutex<HashMap<SessionId, StoredGame>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl InMemoryGameRepository {
    /// 新しい InMemoryGameRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// アクセス時刻の記録に `clock` を使う InMemoryGameRepository を作成
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn insert(&self, game: Game) -> Result<(), RepositoryError> {
        let mut games = self.games.lock().await;
        if games.contains_key(&game.id) {
            return Err(RepositoryError::DuplicateGame(game.id.as_str().to_string()));
        }
        tracing::debug!("Game '{}' stored", game.id.as_str());
        games.insert(
            game.id.clone(),
            StoredGame {
                game: Arc::new(Mutex::new(game)),
                touched_at: self.clock.now_millis(),
            },
        );
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Option<Arc<Mutex<Game>>> {
        let mut games = self.games.lock().await;
        let stored = games.get_mut(id)?;
        stored.touched_at = self.clock.now_millis();
        Some(stored.game.clone())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut games = self.games.lock().await;
        match games.remove(id) {
            Some(_) => {
                tracing::debug!("Game '{}' removed", id.as_str());
                Ok(())
            }
            None => Err(RepositoryError::GameNotFound(id.as_str().to_string())),
        }
    }

    async fn count(&self) -> usize {
        let games = self.games.lock().await;
        games.len()
    }

    async fn idle_games(&self, cutoff: i64) -> Vec<SessionId> {
        let games = self.games.lock().await;
        games
            .iter()
            .filter(|(_, stored)| stored.touched_at < cutoff)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
