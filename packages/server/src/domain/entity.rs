//! Game entity.
//!
//! A `Game` wraps a `shakmaty` position and adds the session rules on top of
//! chess legality: only the side to move may play, and a pawn move to the
//! last rank is held back until its promotion piece is chosen.
//!
//! Each side's latest played move is kept until the channel relay takes it.

use gambit_shared::protocol::{Colour, GameMode, GameStatus, MoveNotation};
use shakmaty::{CastlingMode, Chess, Color, Move, Position, Role, Square, fen::Fen, uci::UciMove};

use super::{engine, value_object::SessionId};

/// Pawn move waiting for its promotion piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPromotion {
    pub colour: Colour,
    pub source: Square,
    pub target: Square,
}

/// Summary of a move that was played on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub notation: MoveNotation,
    pub capture: bool,
    /// Set when moving a single piece is not enough to reproduce the new
    /// position (castling, en passant, promotion).
    pub refresh: bool,
    pub layout: String,
    pub status: GameStatus,
}

/// Result of a move, promotion or auto-move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Rejected,
    PromotionPending { layout: String },
    Played(PlayedMove),
}

/// One chess game, addressed by its session id.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: SessionId,
    pub mode: GameMode,
    initial: Chess,
    position: Chess,
    pending_promotion: Option<PendingPromotion>,
    unrelayed_white: Option<PlayedMove>,
    unrelayed_black: Option<PlayedMove>,
}

impl Game {
    /// Create a game in the standard starting position.
    pub fn new(id: SessionId, mode: GameMode) -> Self {
        Self::with_position(id, mode, Chess::default())
    }

    pub fn with_position(id: SessionId, mode: GameMode, position: Chess) -> Self {
        Self {
            id,
            mode,
            initial: position.clone(),
            position,
            pending_promotion: None,
            unrelayed_white: None,
            unrelayed_black: None,
        }
    }

    /// Parse a starting position from FEN.
    pub fn position_from_fen(fen: &str) -> Result<Chess, String> {
        fen.trim()
            .parse::<Fen>()
            .map_err(|e| e.to_string())?
            .into_position(CastlingMode::Standard)
            .map_err(|e| e.to_string())
    }

    /// Board layout in FEN board notation.
    pub fn layout(&self) -> String {
        self.position.board().to_string()
    }

    pub fn turn(&self) -> Colour {
        colour_of(self.position.turn())
    }

    pub fn pending_promotion(&self) -> Option<&PendingPromotion> {
        self.pending_promotion.as_ref()
    }

    /// Back to the starting position the game was created with.
    pub fn restart(&mut self) {
        self.position = self.initial.clone();
        self.pending_promotion = None;
        self.unrelayed_white = None;
        self.unrelayed_black = None;
    }

    /// Take the latest move of `colour` that was not relayed yet.
    pub fn take_unrelayed_move(&mut self, colour: Colour) -> Option<PlayedMove> {
        self.unrelayed_slot(colour).take()
    }

    fn unrelayed_slot(&mut self, colour: Colour) -> &mut Option<PlayedMove> {
        match colour {
            Colour::White => &mut self.unrelayed_white,
            Colour::Black => &mut self.unrelayed_black,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.position.is_checkmate() {
            match self.position.turn() {
                Color::White => GameStatus::BlackWin,
                Color::Black => GameStatus::WhiteWin,
            }
        } else if self.position.is_stalemate() {
            GameStatus::Stalemate
        } else {
            GameStatus::Active
        }
    }

    /// Play `source` → `target` for `colour`.
    ///
    /// A legal promotion is recorded as pending and the position stays
    /// unchanged until [`Game::promote`] supplies the piece.
    pub fn play(&mut self, colour: Colour, source: &str, target: &str) -> MoveOutcome {
        if self.status().is_end_of_game() || self.turn() != colour {
            return MoveOutcome::Rejected;
        }
        let (Ok(source), Ok(target)) = (source.parse::<Square>(), target.parse::<Square>()) else {
            return MoveOutcome::Rejected;
        };

        let candidate = self
            .position
            .legal_moves()
            .into_iter()
            .find(|mv| uci_squares(mv) == Some((source, target)));

        match candidate {
            None => MoveOutcome::Rejected,
            Some(mv) if mv.is_promotion() => {
                self.pending_promotion = Some(PendingPromotion {
                    colour,
                    source,
                    target,
                });
                MoveOutcome::PromotionPending {
                    layout: self.layout(),
                }
            }
            Some(mv) => self.apply(mv),
        }
    }

    /// Complete the pending promotion of `colour` with `piece` (`q`, `r`, `b` or `n`).
    pub fn promote(&mut self, colour: Colour, piece: &str) -> MoveOutcome {
        let Some(pending) = self.pending_promotion.clone() else {
            return MoveOutcome::Rejected;
        };
        if pending.colour != colour || self.turn() != colour {
            return MoveOutcome::Rejected;
        }
        let Some(role) = promotion_role(piece) else {
            return MoveOutcome::Rejected;
        };

        let promotion = self.position.legal_moves().into_iter().find(|mv| {
            uci_squares(mv) == Some((pending.source, pending.target)) && mv.promotion() == Some(role)
        });

        match promotion {
            Some(mv) => self.apply(mv),
            None => MoveOutcome::Rejected,
        }
    }

    /// Let the engine play for the side to move.
    pub fn play_auto(&mut self) -> MoveOutcome {
        if self.status().is_end_of_game() {
            return MoveOutcome::Rejected;
        }
        match engine::choose_move(&self.position, &mut rand::thread_rng()) {
            Some(mv) => self.apply(mv),
            None => MoveOutcome::Rejected,
        }
    }

    fn apply(&mut self, mv: Move) -> MoveOutcome {
        let Some((source, target)) = uci_squares(&mv) else {
            tracing::warn!("Move {:?} in game '{}' has no source square", mv, self.id.as_str());
            return MoveOutcome::Rejected;
        };
        let mover = self.turn();
        let capture = mv.is_capture();
        let refresh = mv.is_castle() || mv.is_en_passant() || mv.is_promotion();

        self.position.play_unchecked(mv);
        self.pending_promotion = None;

        let played = PlayedMove {
            notation: MoveNotation::new(source.to_string(), target.to_string()),
            capture,
            refresh,
            layout: self.layout(),
            status: self.status(),
        };
        *self.unrelayed_slot(mover) = Some(played.clone());
        MoveOutcome::Played(played)
    }
}

/// Source and target squares as the user sees them (king's squares for castling).
fn uci_squares(mv: &Move) -> Option<(Square, Square)> {
    match mv.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => Some((from, to)),
        _ => None,
    }
}

fn promotion_role(piece: &str) -> Option<Role> {
    let mut chars = piece.trim().chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'q' => Some(Role::Queen),
        'r' => Some(Role::Rook),
        'b' => Some(Role::Bishop),
        'n' => Some(Role::Knight),
        _ => None,
    }
}

pub(crate) fn colour_of(color: Color) -> Colour {
    match color {
        Color::White => Colour::White,
        Color::Black => Colour::Black,
    }
}
