//! Move selection for single-player games.
//!
//! While the position is in the opening book the engine plays one of the
//! book continuations at random. Otherwise every legal move is scored by a
//! two-ply search: material plus piece-square bonuses after the opponent's
//! strongest reply. Mates score above any material, stalemates score zero.
//! Under-promotions are never played.

use std::{collections::HashMap, sync::LazyLock};

use rand::{Rng, seq::SliceRandom};
use shakmaty::{
    Bitboard, Board, CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role, Square,
    fen::Fen, uci::UciMove,
};

const MATE_SCORE: i32 = 100_000;

/// Book lines in UCI notation, played from the standard starting position.
const OPENING_LINES: &[&str] = &[
    // Ruy Lopez
    "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6",
    // Giuoco Piano
    "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 c2c3 g8f6",
    // Sicilian, Najdorf setup
    "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 a7a6",
    // French
    "e2e4 e7e6 d2d4 d7d5 b1c3 g8f6",
    // Caro-Kann
    "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4",
    // Queen's Gambit Declined
    "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7",
    // Slav
    "d2d4 d7d5 c2c4 c7c6 g1f3 g8f6",
    // King's Indian
    "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6",
    // Nimzo-Indian
    "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4",
    // English
    "c2c4 e7e5 b1c3 g8f6 g1f3 b8c6",
    // Reti
    "g1f3 d7d5 g2g3 g8f6 f1g2",
];

/// Normalized FEN → book continuations in UCI notation.
static OPENING_BOOK: LazyLock<HashMap<String, Vec<String>>> = LazyLock::new(build_book);

// Piece-square tables, written from white's side with a8 first.
#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

fn role_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 100,
        Role::Knight => 300,
        Role::Bishop => 320,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 0,
    }
}

fn square_bonus(role: Role, color: Color, square: Square) -> i32 {
    let table = match role {
        Role::Pawn => &PAWN_TABLE,
        Role::Knight => &KNIGHT_TABLE,
        Role::Bishop => &BISHOP_TABLE,
        Role::Rook => &ROOK_TABLE,
        Role::Queen => &QUEEN_TABLE,
        Role::King => &KING_TABLE,
    };
    let index = match color {
        Color::White => usize::from(square.flip_vertical()),
        Color::Black => usize::from(square),
    };
    table[index]
}

fn side_value(board: &Board, color: Color) -> i32 {
    Role::ALL
        .iter()
        .map(|&role| {
            let pieces: Bitboard = board.by_color(color) & board.by_role(role);
            pieces
                .into_iter()
                .map(|square| role_value(role) + square_bonus(role, color, square))
                .sum::<i32>()
        })
        .sum()
}

/// Material and piece placement of `color` minus that of its opponent.
pub fn evaluate(board: &Board, color: Color) -> i32 {
    side_value(board, color) - side_value(board, color.other())
}

/// Pick a move for the side to move, or `None` when there is no legal move.
///
/// Outside the book, ties keep move generation order.
pub fn choose_move<R: Rng + ?Sized>(position: &Chess, rng: &mut R) -> Option<Move> {
    let candidates = candidate_moves(position);

    let book = book_moves(position, &candidates);
    if let Some(mv) = book.choose(rng) {
        tracing::debug!("Book move {}", mv.to_uci(CastlingMode::Standard));
        return Some(mv.clone());
    }

    let mover = position.turn();
    let mut best: Option<(i32, Move)> = None;
    for mv in candidates {
        let mut after = position.clone();
        after.play_unchecked(mv.clone());
        let score = score_after_move(&after, mover);

        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, mv));
        }
    }

    best.map(|(_, mv)| mv)
}

/// Legal moves, promoting to a queen only.
fn candidate_moves(position: &Chess) -> Vec<Move> {
    position
        .legal_moves()
        .into_iter()
        .filter(|mv| mv.promotion().is_none_or(|role| role == Role::Queen))
        .collect()
}

fn book_moves(position: &Chess, candidates: &[Move]) -> Vec<Move> {
    let Some(continuations) = OPENING_BOOK.get(&book_key(position)) else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|mv| {
            let uci = mv.to_uci(CastlingMode::Standard).to_string();
            continuations.contains(&uci)
        })
        .cloned()
        .collect()
}

/// FEN without the move counters, so transpositions share an entry.
fn book_key(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal)
        .to_string()
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_book() -> HashMap<String, Vec<String>> {
    let mut book: HashMap<String, Vec<String>> = HashMap::new();

    for line in OPENING_LINES {
        let mut position = Chess::default();
        for token in line.split_whitespace() {
            let Some(mv) = token
                .parse::<UciMove>()
                .ok()
                .and_then(|uci| uci.to_move(&position).ok())
            else {
                tracing::warn!("Illegal book move '{}' in line '{}'", token, line);
                break;
            };

            let continuations = book.entry(book_key(&position)).or_default();
            if !continuations.iter().any(|known| known == token) {
                continuations.push(token.to_string());
            }
            position.play_unchecked(mv);
        }
    }

    book
}

fn score_after_move(after: &Chess, mover: Color) -> i32 {
    if after.is_checkmate() {
        return MATE_SCORE;
    }
    if after.is_stalemate() {
        return 0;
    }

    after
        .legal_moves()
        .into_iter()
        .map(|reply| {
            let mut answered = after.clone();
            answered.play_unchecked(reply);
            if answered.is_checkmate() {
                -MATE_SCORE
            } else {
                evaluate(answered.board(), mover)
            }
        })
        .min()
        .unwrap_or_else(|| evaluate(after.board(), mover))
}
