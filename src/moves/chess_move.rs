//! Move value type.
//!
//! Moves carry enough context (moved and captured piece, promotion, special
//! flags) to be applied and described without re-inspecting the board.

use crate::game_state::chess_types::{PieceKind, Square};

pub const FLAG_CAPTURE: u8 = 1 << 0;
pub const FLAG_DOUBLE_PAWN_PUSH: u8 = 1 << 1;
pub const FLAG_EN_PASSANT: u8 = 1 << 2;
pub const FLAG_CASTLING: u8 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub moved_piece: PieceKind,
    pub captured_piece: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub flags: u8,
}

impl ChessMove {
    #[inline]
    pub const fn new(
        from: Square,
        to: Square,
        moved_piece: PieceKind,
        captured_piece: Option<PieceKind>,
        promotion: Option<PieceKind>,
        flags: u8,
    ) -> Self {
        Self {
            from,
            to,
            moved_piece,
            captured_piece,
            promotion,
            flags,
        }
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.flags & FLAG_CAPTURE != 0
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        self.flags & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        self.flags & FLAG_CASTLING != 0
    }

    #[inline]
    pub const fn is_double_pawn_push(&self) -> bool {
        self.flags & FLAG_DOUBLE_PAWN_PUSH != 0
    }

    /// Two moves compete for the same notation token when they land on the
    /// same square with the same piece and the same promotion.
    #[inline]
    pub fn same_target(&self, other: &ChessMove) -> bool {
        self.to == other.to
            && self.moved_piece == other.moved_piece
            && self.promotion == other.promotion
    }
}

#[cfg(test)]
mod tests {
    use super::{ChessMove, FLAG_CAPTURE, FLAG_EN_PASSANT};
    use crate::game_state::chess_types::PieceKind;

    #[test]
    fn same_target_ignores_origin_and_capture() {
        let a = ChessMove::new(1, 18, PieceKind::Knight, None, None, 0);
        let b = ChessMove::new(
            35,
            18,
            PieceKind::Knight,
            Some(PieceKind::Pawn),
            None,
            FLAG_CAPTURE,
        );
        let c = ChessMove::new(9, 18, PieceKind::Bishop, None, None, 0);

        assert!(a.same_target(&b));
        assert!(!a.same_target(&c));
    }

    #[test]
    fn flags_are_reported() {
        let ep = ChessMove::new(
            36,
            43,
            PieceKind::Pawn,
            Some(PieceKind::Pawn),
            None,
            FLAG_CAPTURE | FLAG_EN_PASSANT,
        );
        assert!(ep.is_capture());
        assert!(ep.is_en_passant());
        assert!(!ep.is_castling());
        assert!(!ep.is_double_pawn_push());
    }
}
