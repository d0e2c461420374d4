//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Game, RepositoryError, SessionId};

/// Game Repository trait
///
/// ゲームは `Arc<Mutex<Game>>` として貸し出されます。
/// UseCase はロックを保持している間だけ盤面を変更できるため、
/// 同一セッションへの着手は常に一つずつ処理されます。
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// ゲームを登録
    async fn insert(&self, game: Game) -> Result<(), RepositoryError>;

    /// ゲームを取得
    async fn find(&self, id: &SessionId) -> Option<Arc<Mutex<Game>>>;

    /// ゲームを削除
    async fn remove(&self, id: &SessionId) -> Result<(), RepositoryError>;

    /// 登録中のゲーム数を取得
    async fn count(&self) -> usize;

    /// 最後の取得が `cutoff`（Unix ミリ秒）より前のゲームを列挙
    async fn idle_games(&self, cutoff: i64) -> Vec<SessionId>;
}
