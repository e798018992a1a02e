//! Static position scoring used by the reference search.

use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::position::Position;

pub const MATE_SCORE: i32 = 30000;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score<P: Position>(&self, position: &P) -> i32;
}

/// Material plus a small centralisation bonus for minor pieces and pawns.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    #[inline]
    fn centrality_bonus(piece: PieceKind, square: u8) -> i32 {
        if !matches!(piece, PieceKind::Pawn | PieceKind::Knight | PieceKind::Bishop) {
            return 0;
        }
        let file = i32::from(square % 8);
        let rank = i32::from(square / 8);
        let distance = (2 * file - 7).abs() + (2 * rank - 7).abs();
        (14 - distance) * 2
    }
}

impl BoardScorer for MaterialScorer {
    fn score<P: Position>(&self, position: &P) -> i32 {
        let white_minus_black: i32 = (0..64u8)
            .filter_map(|square| position.piece_on(square).map(|p| (square, p)))
            .map(|(square, (color, piece))| {
                let value = Self::piece_value(piece) + Self::centrality_bonus(piece, square);
                match color {
                    Color::Light => value,
                    Color::Dark => -value,
                }
            })
            .sum();

        if position.white_to_move() {
            white_minus_black
        } else {
            -white_minus_black
        }
    }
}
