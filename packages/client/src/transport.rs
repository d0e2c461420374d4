//! Move requests to the game server.

use async_trait::async_trait;
use gambit_shared::protocol::{
    AutoMoveForm, CreateGameForm, CreatedGame, GameMode, MoveForm, MoveResponse, PromotionForm,
    RestartForm,
};

use crate::error::TransportError;

/// Request/response exchange with the server's move endpoints
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoveTransport: Send + Sync {
    /// Ask the server to validate and play a move
    async fn submit_move(&self, form: &MoveForm) -> Result<MoveResponse, TransportError>;

    /// Complete a pending promotion with the chosen piece
    async fn submit_promotion(&self, form: &PromotionForm) -> Result<MoveResponse, TransportError>;

    /// Ask the engine for its reply (single-player only)
    async fn fetch_auto_move(&self, form: &AutoMoveForm) -> Result<MoveResponse, TransportError>;

    /// Put the game back at its starting position (single-player only)
    async fn restart_game(&self, form: &RestartForm) -> Result<MoveResponse, TransportError>;
}

/// `MoveTransport` over the server's form-encoded HTTP API
pub struct HttpMoveTransport {
    client: reqwest::Client,
    base_url: String,
    mode: GameMode,
}

impl HttpMoveTransport {
    /// # Arguments
    ///
    /// * `base_url` - Server URL, e.g. `http://127.0.0.1:8080`
    /// * `mode` - Selects the `/sp` or `/mp` endpoints
    pub fn new(base_url: &str, mode: GameMode) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            mode,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Create a new game of this transport's mode
    ///
    /// `fen` sets the starting position of a single-player game.
    pub async fn create_game(&self, fen: Option<&str>) -> Result<CreatedGame, TransportError> {
        let form = CreateGameForm {
            mode: self.mode,
            fen: fen.map(str::to_string),
        };
        let created: CreatedGame = self
            .client
            .post(format!("{}/api/games", self.base_url))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if created.id.is_empty() {
            return Err(TransportError::UnexpectedResponse(
                "empty session id".to_string(),
            ));
        }
        Ok(created)
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.mode.route_prefix(), action)
    }

    async fn post_form<T: serde::Serialize + Sync>(
        &self,
        url: String,
        form: &T,
    ) -> Result<MoveResponse, TransportError> {
        tracing::debug!("POST {}", url);
        let verdict = self
            .client
            .post(url)
            .form(form)
            .send()
            .await?
            .error_for_status()?
            .json::<MoveResponse>()
            .await?;
        Ok(verdict)
    }
}

#[async_trait]
impl MoveTransport for HttpMoveTransport {
    async fn submit_move(&self, form: &MoveForm) -> Result<MoveResponse, TransportError> {
        self.post_form(self.endpoint("move"), form).await
    }

    async fn submit_promotion(&self, form: &PromotionForm) -> Result<MoveResponse, TransportError> {
        self.post_form(self.endpoint("promote"), form).await
    }

    async fn fetch_auto_move(&self, form: &AutoMoveForm) -> Result<MoveResponse, TransportError> {
        self.post_form(self.endpoint("automove"), form).await
    }

    async fn restart_game(&self, form: &RestartForm) -> Result<MoveResponse, TransportError> {
        self.post_form(self.endpoint("new"), form).await
    }
}
