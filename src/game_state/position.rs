//! The board capability consumed by the session, notation and search layers.
//!
//! Everything above the board model talks to positions through this trait, so
//! an alternative board implementation can be injected into `GameSession`
//! without touching session, notation, or engine code.

use crate::errors::PositionResult;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::{has_legal_move, legal_move_list};
use crate::moves::chess_move::ChessMove;
use crate::utils::long_algebraic::find_move_by_long_algebraic;

pub trait Position: Clone + Send + Sized {
    fn starting_position() -> Self;

    fn from_fen(fen: &str) -> PositionResult<Self>;

    fn generate_legal_moves(&self) -> Vec<ChessMove>;

    /// Apply a move taken from `generate_legal_moves`.
    fn make_move(&self, mv: ChessMove) -> Self;

    fn is_check(&self) -> bool;

    fn white_to_move(&self) -> bool;

    /// Move-pair counter, starting at 1 and incremented after each black move.
    fn fullmove_number(&self) -> u32;

    fn to_fen(&self) -> String;

    /// Move that produced this position, if any.
    fn last_move(&self) -> Option<ChessMove>;

    fn piece_on(&self, square: Square) -> Option<(Color, PieceKind)>;

    /// Key equal for positions that count as repetitions of each other.
    fn repetition_key(&self) -> u64;

    fn has_legal_moves(&self) -> bool {
        !self.generate_legal_moves().is_empty()
    }

    /// Resolve and play a long-algebraic move; `None` if it is not legal here.
    fn make_move_lan(&self, lan: &str) -> Option<Self> {
        let mv = find_move_by_long_algebraic(&self.generate_legal_moves(), lan)?;
        Some(self.make_move(mv))
    }

    fn side_to_move(&self) -> Color {
        if self.white_to_move() {
            Color::Light
        } else {
            Color::Dark
        }
    }
}

impl Position for GameState {
    fn starting_position() -> Self {
        GameState::new_game()
    }

    fn from_fen(fen: &str) -> PositionResult<Self> {
        GameState::from_fen(fen)
    }

    fn generate_legal_moves(&self) -> Vec<ChessMove> {
        legal_move_list(self)
    }

    fn make_move(&self, mv: ChessMove) -> Self {
        apply_move(self, mv)
    }

    fn is_check(&self) -> bool {
        is_king_in_check(self, self.side_to_move)
    }

    fn white_to_move(&self) -> bool {
        self.side_to_move.is_light()
    }

    fn fullmove_number(&self) -> u32 {
        u32::from(self.fullmove_number)
    }

    fn to_fen(&self) -> String {
        self.get_fen()
    }

    fn last_move(&self) -> Option<ChessMove> {
        self.last_move
    }

    fn piece_on(&self, square: Square) -> Option<(Color, PieceKind)> {
        GameState::piece_on(self, square)
    }

    fn repetition_key(&self) -> u64 {
        self.zobrist_key
    }

    fn has_legal_moves(&self) -> bool {
        has_legal_move(self)
    }
}
