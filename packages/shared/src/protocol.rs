//! Wire types exchanged between the Gambit server and its clients.
//!
//! HTTP requests are form-encoded (`MoveForm`, `PromotionForm`, ...) and
//! answered with a JSON `MoveResponse`. The per-session channel carries
//! JSON `ChannelMessage` envelopes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Side of the board a player controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub fn opposite(self) -> Self {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Colour::White => "WHITE",
            Colour::Black => "BLACK",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::White => write!(f, "white"),
            Colour::Black => write!(f, "black"),
        }
    }
}

/// Whether a game is played against the engine or against another client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Single,
    Multi,
}

impl GameMode {
    /// Route prefix of the move endpoints for this mode.
    pub fn route_prefix(self) -> &'static str {
        match self {
            GameMode::Single => "sp",
            GameMode::Multi => "mp",
        }
    }
}

/// Outcome of a move or promotion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseType {
    Ok,
    Snapback,
}

/// Status of a game after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Active,
    WhiteWin,
    BlackWin,
    Stalemate,
}

impl GameStatus {
    pub fn is_end_of_game(self) -> bool {
        !matches!(self, GameStatus::Active)
    }

    /// Message shown on the frozen board once the game is over.
    pub fn end_message(self) -> Option<&'static str> {
        match self {
            GameStatus::Active => None,
            GameStatus::WhiteWin => Some("Checkmate: White wins"),
            GameStatus::BlackWin => Some("Checkmate: Black wins"),
            GameStatus::Stalemate => Some("Stalemate"),
        }
    }

    pub fn winner(self) -> Option<Colour> {
        match self {
            GameStatus::WhiteWin => Some(Colour::White),
            GameStatus::BlackWin => Some(Colour::Black),
            GameStatus::Active | GameStatus::Stalemate => None,
        }
    }
}

/// Server verdict on a move, promotion or auto-move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub response_type: ResponseType,
    /// Board layout (FEN board field) after the move.
    #[serde(default)]
    pub game_fen: Option<String>,
    /// The client must replace its board with `game_fen`.
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub capture: bool,
    /// The move is legal but needs a promotion piece before it is played.
    #[serde(default)]
    pub promotion: bool,
    #[serde(default)]
    pub end_of_game: bool,
    #[serde(default)]
    pub game_status: Option<GameStatus>,
    /// Played move as `source-target`, e.g. `e7-e5`.
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub played_move: Option<String>,
}

impl MoveResponse {
    /// Verdict for an illegal or unauthorised request.
    pub fn snapback() -> Self {
        Self {
            response_type: ResponseType::Snapback,
            game_fen: None,
            refresh: false,
            capture: false,
            promotion: false,
            end_of_game: false,
            game_status: None,
            played_move: None,
        }
    }

    /// Verdict for a legal pawn move that still needs its promotion piece.
    pub fn promotion_required(game_fen: String) -> Self {
        Self {
            response_type: ResponseType::Ok,
            game_fen: Some(game_fen),
            promotion: true,
            game_status: Some(GameStatus::Active),
            ..Self::snapback()
        }
    }

    /// Verdict of `POST /sp/new`: the game is back at its starting position.
    pub fn restarted(game_fen: String) -> Self {
        Self {
            response_type: ResponseType::Ok,
            game_fen: Some(game_fen),
            refresh: true,
            game_status: Some(GameStatus::Active),
            ..Self::snapback()
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.response_type == ResponseType::Ok
    }

    pub fn requires_promotion(&self) -> bool {
        self.is_accepted() && self.promotion
    }

    /// Terminal status when the verdict ends the game.
    pub fn final_status(&self) -> Option<GameStatus> {
        if !self.end_of_game {
            return None;
        }
        self.game_status.filter(|status| status.is_end_of_game())
    }
}

/// Type of a channel envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// Sent by the server to one seat only, before anything else: its colour
    Seat,
    Join,
    Leave,
    Move,
}

/// Envelope published on a session channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub r#type: MessageType,
    /// SEAT and JOIN: board layout, MOVE: `source-target`.
    #[serde(default)]
    pub content: Option<String>,
    /// Colour of the sender, stamped by the server.
    #[serde(default)]
    pub colour: Option<Colour>,
    /// Number of seats taken when a JOIN is relayed.
    #[serde(default)]
    pub players: u32,
    #[serde(default)]
    pub move_response: Option<MoveResponse>,
    #[serde(default)]
    pub sent_at: i64,
}

impl ChannelMessage {
    pub fn join(sent_at: i64) -> Self {
        Self {
            r#type: MessageType::Join,
            content: None,
            colour: None,
            players: 0,
            move_response: None,
            sent_at,
        }
    }

    /// Seat assignment of the receiving client.
    pub fn seat(colour: Colour, layout: String, sent_at: i64) -> Self {
        Self {
            r#type: MessageType::Seat,
            content: Some(layout),
            colour: Some(colour),
            ..Self::join(sent_at)
        }
    }

    pub fn leave(sent_at: i64) -> Self {
        Self {
            r#type: MessageType::Leave,
            ..Self::join(sent_at)
        }
    }

    pub fn movement(notation: MoveNotation, verdict: MoveResponse, sent_at: i64) -> Self {
        Self {
            r#type: MessageType::Move,
            content: Some(notation.to_string()),
            move_response: Some(verdict),
            ..Self::join(sent_at)
        }
    }
}

/// Form body of `POST /api/games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameForm {
    pub mode: GameMode,
    /// Starting position in FEN (single-player only, white to move).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
}

/// Response of `POST /api/games`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGame {
    pub id: String,
    /// Board layout of the starting position.
    #[serde(default)]
    pub game_fen: String,
}

/// Form body of `POST /{mp,sp}/move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveForm {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<Colour>,
}

/// Form body of `POST /{mp,sp}/promote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionForm {
    pub id: String,
    /// One of `q`, `r`, `b`, `n`.
    pub promotion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<Colour>,
}

/// Form body of `POST /sp/automove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMoveForm {
    pub id: String,
}

/// Form body of `POST /sp/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartForm {
    pub id: String,
}

/// A `source-target` pair in algebraic notation, e.g. `e2-e4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNotation {
    pub source: String,
    pub target: String,
}

impl MoveNotation {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for MoveNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Error returned when a `source-target` string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoveNotationError(pub String);

impl fmt::Display for ParseMoveNotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid move notation '{}'", self.0)
    }
}

impl std::error::Error for ParseMoveNotationError {}

impl FromStr for MoveNotation {
    type Err = ParseMoveNotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('-') {
            Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                Ok(Self::new(source, target))
            }
            _ => Err(ParseMoveNotationError(s.to_string())),
        }
    }
}
