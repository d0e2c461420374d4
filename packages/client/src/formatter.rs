//! Text formatting for the terminal client.

use gambit_shared::{
    protocol::{Colour, GameMode},
    time::timestamp_to_rfc3339,
};
use shakmaty::{File, Rank, Square};

use crate::{
    board::BoardView,
    promotion::PromotionPiece,
    session::{Cue, SessionEvent},
};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Draw the board from `orientation`'s side
    ///
    /// # Arguments
    ///
    /// * `board` - The board to draw
    /// * `orientation` - The side at the bottom (white when unknown)
    /// * `notation` - Whether to print rank and file coordinates
    pub fn format_board(board: &BoardView, orientation: Option<Colour>, notation: bool) -> String {
        let flipped = orientation == Some(Colour::Black);
        let ranks: Vec<u32> = if flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };
        let files: Vec<u32> = if flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };
        let margin = if notation { "  " } else { "" };

        let mut output = String::new();
        output.push('\n');
        output.push_str(&format!("{}+-----------------+\n", margin));
        for &rank in &ranks {
            if notation {
                output.push_str(&format!("{} ", rank + 1));
            }
            output.push('|');
            for &file in &files {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let symbol = board.piece_at(square).map_or('.', |piece| piece.char());
                output.push(' ');
                output.push(symbol);
            }
            output.push_str(" |\n");
        }
        output.push_str(&format!("{}+-----------------+\n", margin));
        if notation {
            output.push_str("   ");
            for &file in &files {
                output.push(' ');
                output.push((b'a' + file as u8) as char);
            }
            output.push('\n');
        }
        output
    }

    /// Format the announcement of a newly created game
    pub fn format_session_created(session_id: &str, mode: GameMode) -> String {
        match mode {
            GameMode::Single => format!("\nNew game against the engine ({}). You play white.\n", session_id),
            GameMode::Multi => format!(
                "\nNew game created. Share this session id with your opponent:\n\n    {}\n\nWaiting for the opponent to join...\n",
                session_id
            ),
        }
    }

    /// Format a session event, `None` for events with nothing to print
    pub fn format_event(event: &SessionEvent) -> Option<String> {
        let text = match event {
            SessionEvent::OrientationAssigned(colour) => format!("You play {}.", colour),
            SessionEvent::GameStarted { sent_at } => format!(
                "+ Opponent joined at {}. The game is on.",
                timestamp_to_rfc3339(*sent_at)
            ),
            SessionEvent::SnapBack(notation) => format!("x {} snapped back", notation),
            SessionEvent::Committed(notation) => format!("> {}", notation),
            SessionEvent::OpponentMoved(notation) => format!("< {}", notation),
            SessionEvent::Cue(Cue::Capture) => "Capture!".to_string(),
            SessionEvent::Cue(Cue::Move) => return None,
            SessionEvent::ScheduleRefresh { .. } | SessionEvent::BoardRefreshed => return None,
            SessionEvent::Restarted => "New game. You play white.".to_string(),
            SessionEvent::PromotionPrompt(notation) => {
                let choices: Vec<String> = PromotionPiece::ALL
                    .iter()
                    .map(|piece| format!("{} ({})", piece.as_str(), piece))
                    .collect();
                format!(
                    "Promote on {}: choose {}, or 'cancel'",
                    notation.target,
                    choices.join(", ")
                )
            }
            SessionEvent::PromotionDismissed => "Promotion cancelled".to_string(),
            SessionEvent::GameOver { status, won } => {
                let mut text = "Game over".to_string();
                if let Some(message) = status.end_message() {
                    text.push_str(&format!(". {}", message));
                }
                match won {
                    Some(true) => text.push_str(". You won!"),
                    Some(false) => text.push_str(". You lost."),
                    None => {}
                }
                text
            }
            SessionEvent::OpponentLeft { sent_at } => format!(
                "- Opponent left at {}. The game is over.",
                timestamp_to_rfc3339(*sent_at)
            ),
            SessionEvent::Notice(notice) => notice.clone(),
        };
        Some(text)
    }

    /// Whether the board should be drawn again after `event`
    pub fn redraws_board(event: &SessionEvent) -> bool {
        matches!(
            event,
            SessionEvent::OrientationAssigned(_)
                | SessionEvent::Committed(_)
                | SessionEvent::OpponentMoved(_)
                | SessionEvent::BoardRefreshed
                | SessionEvent::Restarted
        )
    }

    pub fn format_help() -> String {
        "Commands:\n  \
         e2 e4 | e2e4 | e2-e4   move a piece\n  \
         q | r | b | n          choose a promotion piece\n  \
         cancel                 dismiss the promotion prompt\n  \
         new                    start over (against the engine)\n  \
         board                  draw the board\n  \
         quit                   leave the game\n"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_shared::protocol::{GameStatus, MoveNotation};

    #[test]
    fn test_format_board_white_with_notation() {
        // テスト項目: 白側から見た盤面が座標付きで描画される
        // given (前提条件):
        let board = BoardView::new();

        // when (操作):
        let output = MessageFormatter::format_board(&board, Some(Colour::White), true);

        // then (期待する結果):
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "8 | r n b q k b n r |");
        assert_eq!(lines[9], "1 | R N B Q K B N R |");
        assert_eq!(lines[11], "    a b c d e f g h");
    }

    #[test]
    fn test_format_board_black_without_notation() {
        // テスト項目: 黒側から見た盤面は反転し、座標なしでも描画できる
        // given (前提条件):
        let board = BoardView::new();

        // when (操作):
        let output = MessageFormatter::format_board(&board, Some(Colour::Black), false);

        // then (期待する結果):
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "| R N B K Q B N R |");
        assert_eq!(lines[9], "| r n b k q b n r |");
        assert!(!output.contains('a'));
    }

    #[test]
    fn test_format_game_over() {
        // テスト項目: 終局メッセージに結果と勝敗が含まれる
        // given (前提条件):
        let event = SessionEvent::GameOver {
            status: GameStatus::BlackWin,
            won: Some(false),
        };

        // when (操作):
        let text = MessageFormatter::format_event(&event);

        // then (期待する結果):
        assert_eq!(
            text.as_deref(),
            Some("Game over. Checkmate: Black wins. You lost.")
        );
    }

    #[test]
    fn test_format_stalemate() {
        // テスト項目: ステイルメイトでは勝敗を表示しない
        // given (前提条件):
        let event = SessionEvent::GameOver {
            status: GameStatus::Stalemate,
            won: None,
        };

        // when (操作):
        let text = MessageFormatter::format_event(&event);

        // then (期待する結果):
        assert_eq!(text.as_deref(), Some("Game over. Stalemate"));
    }

    #[test]
    fn test_silent_events() {
        // テスト項目: 表示する内容のないイベントは None になる
        // given (前提条件):
        let events = [SessionEvent::Cue(Cue::Move), SessionEvent::BoardRefreshed];

        // when (操作):
        let texts: Vec<Option<String>> = events.iter().map(MessageFormatter::format_event).collect();

        // then (期待する結果):
        assert_eq!(texts, vec![None, None]);
        assert!(MessageFormatter::redraws_board(&SessionEvent::BoardRefreshed));
        assert!(!MessageFormatter::redraws_board(&SessionEvent::SnapBack(
            MoveNotation::new("e2", "e4")
        )));
    }
}
