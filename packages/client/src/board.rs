//! Local copy of the board.
//!
//! The client only moves pieces from square to square; whenever that is not
//! enough (castling, en passant, promotion) the server position replaces the
//! whole board.

use gambit_shared::protocol::Colour;
use shakmaty::{Board, Color, Piece, Square};

/// The board as the client displays it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    board: Board,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            board: Board::default(),
        }
    }
}

impl BoardView {
    /// Standard starting position
    pub fn new() -> Self {
        Self::default()
    }

    /// Board from a FEN board field, e.g. `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`
    pub fn from_layout(layout: &str) -> Option<Self> {
        layout
            .trim()
            .parse::<Board>()
            .ok()
            .map(|board| Self { board })
    }

    /// FEN board field of the current position
    pub fn layout(&self) -> String {
        self.board.to_string()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    pub fn piece_colour_at(&self, square: Square) -> Option<Colour> {
        self.board.piece_at(square).map(|piece| match piece.color {
            Color::White => Colour::White,
            Color::Black => Colour::Black,
        })
    }

    /// Move whatever stands on `source` to `target`, capturing what stands there.
    ///
    /// Returns `false` when `source` is empty.
    pub fn move_piece(&mut self, source: Square, target: Square) -> bool {
        match self.board.remove_piece_at(source) {
            Some(piece) => {
                self.board.set_piece_at(target, piece);
                true
            }
            None => false,
        }
    }

    /// Replace the whole board with `layout`. Returns `false` if it does not parse.
    pub fn replace(&mut self, layout: &str) -> bool {
        match Self::from_layout(layout) {
            Some(view) => {
                *self = view;
                true
            }
            None => false,
        }
    }
}
