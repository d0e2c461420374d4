//! Promotion dialog.
//!
//! A two-state machine: `Hidden` until the server answers a pawn move with
//! "promotion required", `Shown` until the user picks a piece or dismisses
//! the prompt. The held move is handed back exactly once.

use std::{fmt, str::FromStr};

use gambit_shared::protocol::MoveNotation;

use crate::error::{CommandError, PromotionError};

/// Pieces a pawn can promote to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    pub const ALL: [PromotionPiece; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// Code sent to the server
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queen => "q",
            Self::Rook => "r",
            Self::Bishop => "b",
            Self::Knight => "n",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Queen => "queen",
            Self::Rook => "rook",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
        }
    }
}

impl fmt::Display for PromotionPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PromotionPiece {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|piece| piece.as_str() == lower || piece.name() == lower)
            .ok_or_else(|| CommandError::UnknownPiece(s.to_string()))
    }
}

/// Dialog state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromotionDialog {
    #[default]
    Hidden,
    /// Waiting for the user to choose, holding the pawn move
    Shown(MoveNotation),
}

impl PromotionDialog {
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown(_))
    }

    /// Hidden → Shown
    pub fn show(&mut self, pending: MoveNotation) -> Result<(), PromotionError> {
        if self.is_shown() {
            return Err(PromotionError::AlreadyShown);
        }
        *self = Self::Shown(pending);
        Ok(())
    }

    /// Shown → Hidden, returning the held move to complete with `piece`
    pub fn select(&mut self, piece: PromotionPiece) -> Result<(MoveNotation, PromotionPiece), PromotionError> {
        match std::mem::take(self) {
            Self::Shown(pending) => Ok((pending, piece)),
            Self::Hidden => Err(PromotionError::NotShown),
        }
    }

    /// Shown → Hidden, dropping the held move
    pub fn dismiss(&mut self) -> Result<MoveNotation, PromotionError> {
        match std::mem::take(self) {
            Self::Shown(pending) => Ok(pending),
            Self::Hidden => Err(PromotionError::NotShown),
        }
    }
}
