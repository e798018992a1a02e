//! Square naming helpers.
//!
//! Converts between coordinates such as `e4` and square indices, and exposes
//! file/rank accessors used by notation and FEN components.

use crate::errors::{PositionError, PositionResult};
use crate::game_state::chess_types::Square;

/// Convert a coordinate (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> PositionResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(PositionError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(PositionError::InvalidSquare(square.to_owned()));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Zero-based file (`0 == a`).
#[inline]
pub const fn square_file(square: Square) -> u8 {
    square % 8
}

/// Zero-based rank (`0 == 1st rank`).
#[inline]
pub const fn square_rank(square: Square) -> u8 {
    square / 8
}

#[inline]
pub const fn file_char(square: Square) -> char {
    (b'a' + square_file(square)) as char
}

#[inline]
pub const fn rank_char(square: Square) -> char {
    (b'1' + square_rank(square)) as char
}

/// Name of a square (for example: "e4"). Indices wrap into `0..=63`.
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let square = square & 63;
    let mut out = String::with_capacity(2);
    out.push(file_char(square));
    out.push(rank_char(square));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_square_conversions() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("E4").expect("E4 should parse"), 28);
        assert_eq!(square_to_algebraic(0), "a1");
        assert_eq!(square_to_algebraic(63), "h8");
    }

    #[test]
    fn rejects_off_board_names() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("e").is_err());
    }

    #[test]
    fn file_and_rank_accessors() {
        let g1 = 6u8;
        assert_eq!(square_file(g1), 6);
        assert_eq!(square_rank(g1), 0);
        assert_eq!(file_char(g1), 'g');
        assert_eq!(rank_char(g1), '1');
    }
}
