//! Classification of finished games.

use std::fmt;

use crate::game_state::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    InProgress,
}

impl GameResult {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "draw",
            GameResult::InProgress => "in-progress",
        }
    }

    /// Score-sheet text: empty while the game is running.
    pub const fn score_text(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "½-½",
            GameResult::InProgress => "",
        }
    }

    /// PGN result token.
    pub const fn pgn_token(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::InProgress => "*",
        }
    }

    pub const fn is_over(self) -> bool {
        !matches!(self, GameResult::InProgress)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct TerminalStateClassifier;

impl TerminalStateClassifier {
    pub fn is_over<P: Position>(position: &P) -> bool {
        !position.has_legal_moves()
    }

    pub fn result<P: Position>(position: &P) -> GameResult {
        if position.has_legal_moves() {
            GameResult::InProgress
        } else if !position.is_check() {
            GameResult::Draw
        } else if position.white_to_move() {
            GameResult::BlackWins
        } else {
            GameResult::WhiteWins
        }
    }
}
