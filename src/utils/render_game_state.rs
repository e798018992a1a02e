//! Terminal-oriented Unicode board renderer.

use crate::game_state::position::Position;
use crate::notation::fan::figurine;

/// Render the board to a Unicode string for terminal output, white at the
/// bottom, followed by a side-to-move line.
///
/// Assumes square indexing where `0 == a1`, `7 == h1`, and `63 == h8`.
pub fn render_game_state<P: Position>(position: &P) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            match position.piece_on(rank * 8 + file) {
                Some((color, piece)) => out.push(figurine(color, piece)),
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h\n");
    out.push_str(if position.white_to_move() {
        "white to move"
    } else {
        "black to move"
    });

    out
}
