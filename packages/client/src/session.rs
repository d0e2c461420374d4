//! Game session: the move exchange state machine.
//!
//! A `GameSession` owns the local board, the orientation, the frozen state
//! and the promotion dialog. Every operation takes `&mut self` and returns
//! the [`SessionEvent`]s the caller should present, so one task drives both
//! user input and channel events and a submission is never interleaved with
//! anything else.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 着手の送信（snap-back / commit / 昇格待ち）
//! - 昇格ダイアログの選択と破棄
//! - チャンネルメッセージ（SEAT / JOIN / MOVE / LEAVE）の処理
//! - 遅延 refresh の世代管理（古い refresh が新しい手を消さない）
//! - シングルプレイのエンジン着手とやり直し
//!
//! ### どのような状況を想定しているか
//! - 正常系：合法手、昇格、相手の着手、終局
//! - 異常系：拒否、通信エラー、凍結中の操作
//! - エッジケース：自分の手のエコー、LEAVE の重複

use std::{sync::Arc, time::Duration};

use gambit_shared::{
    protocol::{
        AutoMoveForm, ChannelMessage, Colour, GameMode, GameStatus, MessageType, MoveForm,
        MoveNotation, MoveResponse, PromotionForm, RestartForm,
    },
    time::Clock,
};
use shakmaty::Square;

use crate::{
    board::BoardView,
    channel::ChannelPublisher,
    error::{ChannelError, PromotionError},
    promotion::{PromotionDialog, PromotionPiece},
    transport::MoveTransport,
};

/// Delay before a remote move's position refresh is applied
pub const REFRESH_DELAY: Duration = Duration::from_millis(100);

/// Why the board no longer accepts moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeReason {
    GameOver(GameStatus),
    OpponentLeft,
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForOpponent,
    Active,
    Frozen(FreezeReason),
}

/// Feedback cue of a played move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Move,
    Capture,
}

/// Server position to restore once the delay of a remote move has passed
///
/// `generation` counts the moves applied to the local board. A refresh whose
/// generation is behind the board's is stale and gets dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRefresh {
    pub layout: String,
    pub generation: u64,
}

/// Something the presentation layer should show or do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Orientation fixed by the server's SEAT message
    OrientationAssigned(Colour),
    /// Both seats taken, the board is live
    GameStarted { sent_at: i64 },
    /// The move was refused (or never sent); the piece goes back to `source`
    SnapBack(MoveNotation),
    /// Own move committed on the board
    Committed(MoveNotation),
    /// Opponent (or engine) move applied on the board
    OpponentMoved(MoveNotation),
    Cue(Cue),
    /// Hand `refresh` back to [`GameSession::refresh_position`] after `delay`
    ScheduleRefresh {
        refresh: BoardRefresh,
        delay: Duration,
    },
    /// The board was replaced by the server position
    BoardRefreshed,
    /// The single-player game is back at its starting position
    Restarted,
    /// Ask the user for the promotion piece
    PromotionPrompt(MoveNotation),
    PromotionDismissed,
    /// The game ended; `won` is `None` on stalemate
    GameOver { status: GameStatus, won: Option<bool> },
    OpponentLeft { sent_at: i64 },
    Notice(String),
}

/// One client's view of a game
pub struct GameSession {
    session_id: String,
    mode: GameMode,
    board: BoardView,
    orientation: Option<Colour>,
    phase: Phase,
    opponent_left: bool,
    dialog: PromotionDialog,
    /// Moves applied to `board` so far
    generation: u64,
    /// A remote move scheduled a refresh that was not applied yet
    refresh_outstanding: bool,
    transport: Arc<dyn MoveTransport>,
    publisher: Option<Arc<dyn ChannelPublisher>>,
    clock: Arc<dyn Clock>,
}

impl GameSession {
    /// Multiplayer session: frozen until the opponent joins, orientation set by SEAT
    pub fn multiplayer(
        session_id: String,
        transport: Arc<dyn MoveTransport>,
        publisher: Arc<dyn ChannelPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_id,
            mode: GameMode::Multi,
            board: BoardView::new(),
            orientation: None,
            phase: Phase::WaitingForOpponent,
            opponent_left: false,
            dialog: PromotionDialog::Hidden,
            generation: 0,
            refresh_outstanding: false,
            transport,
            publisher: Some(publisher),
            clock,
        }
    }

    /// Single-player session: white against the server engine, no channel
    pub fn single_player(
        session_id: String,
        transport: Arc<dyn MoveTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_id,
            mode: GameMode::Single,
            board: BoardView::new(),
            orientation: Some(Colour::White),
            phase: Phase::Active,
            opponent_left: false,
            dialog: PromotionDialog::Hidden,
            generation: 0,
            refresh_outstanding: false,
            transport,
            publisher: None,
            clock,
        }
    }

    /// Start from the layout the server created the game with
    pub fn with_starting_layout(mut self, layout: &str) -> Self {
        if !self.board.replace(layout) {
            tracing::warn!("Ignoring unreadable board layout '{}'", layout);
        }
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn board(&self) -> &BoardView {
        &self.board
    }

    pub fn orientation(&self) -> Option<Colour> {
        self.orientation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_frozen(&self) -> bool {
        self.phase != Phase::Active
    }

    pub fn promotion_pending(&self) -> bool {
        self.dialog.is_shown()
    }

    /// Announce this client on the channel
    pub async fn join(&self) -> Result<(), ChannelError> {
        match &self.publisher {
            Some(publisher) => {
                publisher
                    .publish(&ChannelMessage::join(self.clock.now_millis()))
                    .await
            }
            None => Ok(()),
        }
    }

    /// Submit `source` → `target` for the local side
    pub async fn submit_move(&mut self, source: &str, target: &str) -> Vec<SessionEvent> {
        let notation = MoveNotation::new(
            source.trim().to_ascii_lowercase(),
            target.trim().to_ascii_lowercase(),
        );

        if self.is_frozen() || self.dialog.is_shown() {
            tracing::debug!("Move {} while the board is frozen", notation);
            return vec![SessionEvent::SnapBack(notation)];
        }
        let (Ok(from), Ok(_)) = (
            notation.source.parse::<Square>(),
            notation.target.parse::<Square>(),
        ) else {
            tracing::debug!("Move {} names a square off the board", notation);
            return vec![SessionEvent::SnapBack(notation)];
        };
        if self.orientation.is_none() || self.board.piece_colour_at(from) != self.orientation {
            tracing::debug!("Move {} does not start from an own piece", notation);
            return vec![SessionEvent::SnapBack(notation)];
        }

        let form = MoveForm {
            id: self.session_id.clone(),
            source: notation.source.clone(),
            target: notation.target.clone(),
            colour: self.orientation,
        };
        let verdict = match self.transport.submit_move(&form).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Move request failed: {}", e);
                return vec![SessionEvent::SnapBack(notation)];
            }
        };

        if !verdict.is_accepted() {
            return vec![SessionEvent::SnapBack(notation)];
        }
        if verdict.requires_promotion() {
            return match self.dialog.show(notation.clone()) {
                Ok(()) => vec![SessionEvent::PromotionPrompt(notation)],
                Err(e) => {
                    tracing::warn!("{}", e);
                    vec![SessionEvent::SnapBack(notation)]
                }
            };
        }

        self.commit(notation, verdict).await
    }

    /// Complete the pending promotion with `piece`
    pub async fn choose_promotion(
        &mut self,
        piece: PromotionPiece,
    ) -> Result<Vec<SessionEvent>, PromotionError> {
        let (notation, piece) = self.dialog.select(piece)?;

        let form = PromotionForm {
            id: self.session_id.clone(),
            promotion: piece.as_str().to_string(),
            colour: self.orientation,
        };
        let verdict = match self.transport.submit_promotion(&form).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Promotion request failed: {}", e);
                return Ok(vec![SessionEvent::SnapBack(notation)]);
            }
        };

        if !verdict.is_accepted() || verdict.requires_promotion() {
            return Ok(vec![SessionEvent::SnapBack(notation)]);
        }
        Ok(self.commit(notation, verdict).await)
    }

    /// Close the promotion prompt without choosing
    pub fn dismiss_promotion(&mut self) -> Result<Vec<SessionEvent>, PromotionError> {
        let notation = self.dialog.dismiss()?;
        Ok(vec![
            SessionEvent::PromotionDismissed,
            SessionEvent::SnapBack(notation),
        ])
    }

    /// Apply an inbound channel envelope
    pub fn handle_message(&mut self, message: ChannelMessage) -> Vec<SessionEvent> {
        match message.r#type {
            MessageType::Seat => self.on_seat(message),
            MessageType::Join => self.on_join(message),
            MessageType::Move => self.on_move(message),
            MessageType::Leave => self.on_leave(message),
        }
    }

    /// Replace the board with a server position (scheduled by `ScheduleRefresh`)
    ///
    /// Does nothing when another move reached the board after the refresh
    /// was scheduled.
    pub fn refresh_position(&mut self, refresh: BoardRefresh) -> Vec<SessionEvent> {
        if refresh.generation != self.generation {
            tracing::debug!(
                "Dropping stale refresh of move {} (board is at move {})",
                refresh.generation,
                self.generation
            );
            return Vec::new();
        }
        self.refresh_outstanding = false;
        if self.board.replace(&refresh.layout) {
            vec![SessionEvent::BoardRefreshed]
        } else {
            tracing::warn!("Ignoring unreadable board layout '{}'", refresh.layout);
            Vec::new()
        }
    }

    /// Start the single-player game over from its starting position
    pub async fn restart(&mut self) -> Vec<SessionEvent> {
        if self.mode != GameMode::Single {
            return vec![SessionEvent::Notice(
                "Only a game against the engine can be restarted".to_string(),
            )];
        }

        let form = RestartForm {
            id: self.session_id.clone(),
        };
        let verdict = match self.transport.restart_game(&form).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Restart request failed: {}", e);
                return vec![SessionEvent::Notice("Couldn't restart the game".to_string())];
            }
        };
        let accepted = verdict.is_accepted();
        let Some(layout) = verdict.game_fen.filter(|_| accepted) else {
            tracing::warn!("Restart refused by the server");
            return vec![SessionEvent::Notice("Couldn't restart the game".to_string())];
        };
        if !self.board.replace(&layout) {
            tracing::warn!("Ignoring unreadable board layout '{}'", layout);
            return vec![SessionEvent::Notice("Couldn't restart the game".to_string())];
        }

        self.generation += 1;
        self.refresh_outstanding = false;
        self.dialog = PromotionDialog::Hidden;
        self.phase = Phase::Active;
        vec![SessionEvent::Restarted]
    }

    async fn commit(&mut self, notation: MoveNotation, verdict: MoveResponse) -> Vec<SessionEvent> {
        let mut events = self.apply_move(&notation, &verdict, false);
        events.insert(0, SessionEvent::Committed(notation.clone()));

        if let Some(publisher) = &self.publisher {
            let message =
                ChannelMessage::movement(notation, verdict.clone(), self.clock.now_millis());
            if let Err(e) = publisher.publish(&message).await {
                tracing::warn!("Failed to publish move: {}", e);
            }
        }

        if self.mode == GameMode::Single && !self.is_frozen() {
            events.extend(self.request_engine_reply().await);
        }
        events
    }

    /// Move the piece, sync the board if the verdict asks for it, play the cue, check for the end.
    ///
    /// A deferred refresh is scheduled instead of applied for moves that arrive over the channel.
    /// A later move's verdict carries the whole position, so it also settles a refresh that
    /// is still outstanding.
    fn apply_move(
        &mut self,
        notation: &MoveNotation,
        verdict: &MoveResponse,
        deferred_refresh: bool,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let (Ok(from), Ok(to)) = (
            notation.source.parse::<Square>(),
            notation.target.parse::<Square>(),
        ) {
            self.board.move_piece(from, to);
        }
        self.generation += 1;

        if let Some(layout) = &verdict.game_fen {
            if deferred_refresh {
                if verdict.refresh || self.refresh_outstanding {
                    self.refresh_outstanding = true;
                    events.push(SessionEvent::ScheduleRefresh {
                        refresh: BoardRefresh {
                            layout: layout.clone(),
                            generation: self.generation,
                        },
                        delay: REFRESH_DELAY,
                    });
                }
            } else if (verdict.refresh || self.refresh_outstanding) && self.board.replace(layout) {
                self.refresh_outstanding = false;
                events.push(SessionEvent::BoardRefreshed);
            }
        }

        events.push(SessionEvent::Cue(if verdict.capture {
            Cue::Capture
        } else {
            Cue::Move
        }));

        if let Some(status) = verdict.final_status() {
            self.phase = Phase::Frozen(FreezeReason::GameOver(status));
            self.dialog = PromotionDialog::Hidden;
            events.push(SessionEvent::GameOver {
                status,
                won: status
                    .winner()
                    .map(|winner| Some(winner) == self.orientation),
            });
        }
        events
    }

    async fn request_engine_reply(&mut self) -> Vec<SessionEvent> {
        let form = AutoMoveForm {
            id: self.session_id.clone(),
        };
        let verdict = match self.transport.fetch_auto_move(&form).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Auto-move request failed: {}", e);
                return vec![SessionEvent::Notice(
                    "The engine did not reply".to_string(),
                )];
            }
        };

        let played = verdict
            .played_move
            .as_deref()
            .and_then(|m| m.parse::<MoveNotation>().ok());
        let Some(notation) = played.filter(|_| verdict.is_accepted()) else {
            tracing::warn!("Engine reply without a move: {:?}", verdict);
            return vec![SessionEvent::Notice(
                "The engine did not reply".to_string(),
            )];
        };

        let mut events = vec![SessionEvent::OpponentMoved(notation.clone())];
        events.extend(self.apply_move(&notation, &verdict, false));
        events
    }

    fn on_seat(&mut self, message: ChannelMessage) -> Vec<SessionEvent> {
        if self.orientation.is_some() {
            tracing::debug!("Repeated SEAT ignored");
            return Vec::new();
        }
        let Some(colour) = message.colour else {
            tracing::warn!("SEAT without a colour ignored");
            return Vec::new();
        };
        self.orientation = Some(colour);

        if let Some(layout) = &message.content
            && !self.board.replace(layout)
        {
            tracing::warn!("Ignoring unreadable board layout '{}'", layout);
        }
        vec![SessionEvent::OrientationAssigned(colour)]
    }

    fn on_join(&mut self, message: ChannelMessage) -> Vec<SessionEvent> {
        if message.players >= 2 && self.phase == Phase::WaitingForOpponent {
            self.phase = Phase::Active;
            return vec![SessionEvent::GameStarted {
                sent_at: message.sent_at,
            }];
        }
        Vec::new()
    }

    fn on_move(&mut self, message: ChannelMessage) -> Vec<SessionEvent> {
        if message.colour.is_some() && message.colour == self.orientation {
            return Vec::new();
        }
        if self.is_frozen() {
            tracing::debug!("MOVE ignored while frozen");
            return Vec::new();
        }
        let Some(notation) = message
            .content
            .as_deref()
            .and_then(|content| content.parse::<MoveNotation>().ok())
        else {
            tracing::warn!("MOVE without a readable move ignored");
            return Vec::new();
        };
        let verdict = message
            .move_response
            .unwrap_or_else(MoveResponse::snapback);

        let mut events = vec![SessionEvent::OpponentMoved(notation.clone())];
        events.extend(self.apply_move(&notation, &verdict, true));
        events
    }

    fn on_leave(&mut self, message: ChannelMessage) -> Vec<SessionEvent> {
        if self.opponent_left || (message.colour.is_some() && message.colour == self.orientation) {
            return Vec::new();
        }
        self.opponent_left = true;
        if !matches!(self.phase, Phase::Frozen(FreezeReason::GameOver(_))) {
            self.phase = Phase::Frozen(FreezeReason::OpponentLeft);
        }
        self.dialog = PromotionDialog::Hidden;
        vec![SessionEvent::OpponentLeft {
            sent_at: message.sent_at,
        }]
    }
}
