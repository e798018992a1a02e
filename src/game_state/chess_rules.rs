//! Canonical chess-rule constants.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling rook relocation `(king_from, king_to, rook_from, rook_to)`.
pub const CASTLING_ROOK_MOVES: [(u8, u8, u8, u8); 4] = [
    (4, 6, 7, 5),
    (4, 2, 0, 3),
    (60, 62, 63, 61),
    (60, 58, 56, 59),
];
