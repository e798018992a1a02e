//! Figurine / standard algebraic notation for a single half-move.
//!
//! The formatter looks at the position before the move and the position after
//! it; the move itself comes from `Position::last_move` of the later position.
//! Disambiguation is computed from the legal moves of the earlier position, so
//! two different legal moves never produce the same token.

use std::collections::HashSet;

use crate::errors::NotationError;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::position::Position;
use crate::moves::chess_move::ChessMove;
use crate::utils::algebraic::{file_char, rank_char, square_file, square_rank, square_to_algebraic};

pub const CHECK_MARKER: &str = "†";
pub const MATE_MARKER: &str = "#";
pub const EN_PASSANT_MARKER: &str = " e.p.";
pub const KINGSIDE_CASTLE: &str = "0-0";
pub const QUEENSIDE_CASTLE: &str = "0-0-0";

const FILE_C: u8 = 2;
const FILE_E: u8 = 4;
const FILE_G: u8 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotationStyle {
    /// Unicode chess figurines, coloured by the moving side.
    #[default]
    Figurine,
    /// ASCII piece letters (`N`, `B`, `R`, `Q`, `K`).
    Letters,
}

impl NotationStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "figurine" | "fan" => Some(NotationStyle::Figurine),
            "letters" | "san" => Some(NotationStyle::Letters),
            _ => None,
        }
    }
}

/// Unicode figurine for every colour and piece kind.
pub const fn figurine(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::Light, PieceKind::King) => '♔',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Dark, PieceKind::King) => '♚',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Pawn) => '♟',
    }
}

pub const fn piece_letter(piece: PieceKind) -> char {
    match piece {
        PieceKind::King => 'K',
        PieceKind::Queen => 'Q',
        PieceKind::Rook => 'R',
        PieceKind::Bishop => 'B',
        PieceKind::Knight => 'N',
        PieceKind::Pawn => 'P',
    }
}

pub const fn piece_symbol(style: NotationStyle, color: Color, piece: PieceKind) -> char {
    match style {
        NotationStyle::Figurine => figurine(color, piece),
        NotationStyle::Letters => piece_letter(piece),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotationFormatter {
    pub style: NotationStyle,
}

impl NotationFormatter {
    pub const fn new(style: NotationStyle) -> Self {
        Self { style }
    }

    /// Token for the move leading from `before` to `after`, or `None` when
    /// `after` does not record a producing move.
    pub fn format_half_move<P: Position>(&self, before: &P, after: &P) -> Option<String> {
        let mv = after.last_move()?;
        let mover = before.side_to_move();
        let suffix = check_suffix(after);

        if mv.moved_piece == PieceKind::King && square_file(mv.from) == FILE_E {
            match square_file(mv.to) {
                FILE_G => return Some(format!("{KINGSIDE_CASTLE}{suffix}")),
                FILE_C => return Some(format!("{QUEENSIDE_CASTLE}{suffix}")),
                _ => {}
            }
        }

        let capture = mv.is_capture();
        let mut out = String::with_capacity(12);

        if mv.moved_piece == PieceKind::Pawn {
            if capture {
                out.push(file_char(mv.from));
            }
        } else {
            out.push(piece_symbol(self.style, mover, mv.moved_piece));
            out.push_str(&disambiguation(&before.generate_legal_moves(), &mv));
        }

        if capture {
            out.push('x');
        }

        out.push_str(&square_to_algebraic(mv.to));

        if mv.moved_piece == PieceKind::Pawn
            && mv.captured_piece == Some(PieceKind::Pawn)
            && before.piece_on(mv.to).is_none()
        {
            out.push_str(EN_PASSANT_MARKER);
        }

        if let Some(promotion) = mv.promotion {
            out.push('=');
            out.push(piece_symbol(self.style, mover, promotion));
        }

        out.push_str(suffix);
        Some(out)
    }

    /// Token for half-move `halfmove`, i.e. `positions[halfmove] -> positions[halfmove + 1]`.
    pub fn format_history<P: Position>(
        &self,
        positions: &[P],
        halfmove: usize,
    ) -> Result<String, NotationError> {
        let (Some(before), Some(after)) = (positions.get(halfmove), positions.get(halfmove + 1))
        else {
            return Err(NotationError::OutOfRange {
                halfmove,
                len: positions.len(),
            });
        };
        self.format_half_move(before, after)
            .ok_or(NotationError::MissingLastMove(halfmove + 1))
    }

    /// Tokens for every half-move of a history.
    pub fn format_all<P: Position>(&self, positions: &[P]) -> Result<Vec<String>, NotationError> {
        (0..positions.len().saturating_sub(1))
            .map(|halfmove| self.format_history(positions, halfmove))
            .collect()
    }
}

fn check_suffix<P: Position>(after: &P) -> &'static str {
    if !after.is_check() {
        ""
    } else if after.has_legal_moves() {
        CHECK_MARKER
    } else {
        MATE_MARKER
    }
}

/// Origin qualifier for a piece move that shares its destination, piece and
/// promotion with other legal moves.
fn disambiguation(legal_moves: &[ChessMove], mv: &ChessMove) -> String {
    let candidates: Vec<&ChessMove> = legal_moves.iter().filter(|m| m.same_target(mv)).collect();
    if candidates.len() <= 1 {
        return String::new();
    }

    let files: HashSet<u8> = candidates.iter().map(|m| square_file(m.from)).collect();
    let ranks: HashSet<u8> = candidates.iter().map(|m| square_rank(m.from)).collect();

    if files.len() == candidates.len() {
        file_char(mv.from).to_string()
    } else if ranks.len() == candidates.len() {
        rank_char(mv.from).to_string()
    } else {
        square_to_algebraic(mv.from)
    }
}
