//! Parsing of input lines.

use gambit_shared::protocol::MoveNotation;

use crate::{error::CommandError, promotion::PromotionPiece};

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(MoveNotation),
    Promote(PromotionPiece),
    Cancel,
    /// Start a game against the engine over
    Restart,
    Board,
    Help,
    Quit,
}

/// Parse a line: `e2 e4`, `e2e4`, `e2-e4`, `q`/`r`/`b`/`n`, `cancel`, `new`, `board`, `help`, `quit`
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim().to_ascii_lowercase();

    match line.as_str() {
        "cancel" => return Ok(Command::Cancel),
        "new" | "restart" => return Ok(Command::Restart),
        "board" => return Ok(Command::Board),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    if let Ok(piece) = line.parse::<PromotionPiece>() {
        return Ok(Command::Promote(piece));
    }

    let squares: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect();

    match squares.as_slice() {
        [source, target] if is_square_like(source) && is_square_like(target) => {
            Ok(Command::Move(MoveNotation::new(*source, *target)))
        }
        [joined] if joined.len() == 4 && joined.is_ascii() => {
            let (source, target) = joined.split_at(2);
            if is_square_like(source) && is_square_like(target) {
                Ok(Command::Move(MoveNotation::new(source, target)))
            } else {
                Err(CommandError::Unrecognised(line.clone()))
            }
        }
        _ => Err(CommandError::Unrecognised(line.clone())),
    }
}

/// Two characters, a letter then a digit; whether it is on the board is checked later
fn is_square_like(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(file), Some(rank), None) if file.is_ascii_alphabetic() && rank.is_ascii_digit()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_forms() {
        // テスト項目: 三つの表記の着手が同じ手として解釈される
        // given (前提条件):
        let lines = ["e2 e4", "e2e4", "E2-E4"];

        // when (操作):
        let commands: Vec<Command> = lines.iter().map(|l| parse_command(l).unwrap()).collect();

        // then (期待する結果):
        for command in commands {
            assert_eq!(command, Command::Move(MoveNotation::new("e2", "e4")));
        }
    }

    #[test]
    fn test_off_board_square_is_still_a_move() {
        // テスト項目: 盤外のマスも着手として解釈される（検証はセッション側）
        // given (前提条件):
        let line = "i9 e4";

        // when (操作):
        let command = parse_command(line);

        // then (期待する結果):
        assert_eq!(command, Ok(Command::Move(MoveNotation::new("i9", "e4"))));
    }

    #[test]
    fn test_parse_keywords_and_pieces() {
        // テスト項目: キーワードと昇格駒が解釈される
        // given (前提条件):

        // when (操作):
        let cancel = parse_command("cancel");
        let restart = parse_command("New");
        let quit = parse_command(" quit ");
        let queen = parse_command("q");

        // then (期待する結果):
        assert_eq!(cancel, Ok(Command::Cancel));
        assert_eq!(restart, Ok(Command::Restart));
        assert_eq!(quit, Ok(Command::Quit));
        assert_eq!(queen, Ok(Command::Promote(PromotionPiece::Queen)));
    }

    #[test]
    fn test_parse_garbage() {
        // テスト項目: 解釈できない入力はエラーになる
        // given (前提条件):
        let line = "castle please";

        // when (操作):
        let command = parse_command(line);

        // then (期待する結果):
        assert_eq!(
            command,
            Err(CommandError::Unrecognised("castle please".to_string()))
        );
    }
}
