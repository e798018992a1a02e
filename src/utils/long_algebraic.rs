//! Long algebraic (LAN / UCI-style) move strings such as `e2e4` or `a7a8q`.

use crate::moves::chess_move::ChessMove;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

pub fn move_to_long_algebraic(mv: &ChessMove) -> String {
    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(mv.from));
    out.push_str(&square_to_algebraic(mv.to));
    if let Some(promotion) = mv.promotion {
        out.push(promotion.fen_char());
    }
    out
}

/// Resolve a LAN string against a list of legal moves. Returns `None` when the
/// string is malformed or names no move in the list. A pawn move to the back
/// rank only matches when the promotion letter is present.
pub fn find_move_by_long_algebraic(legal_moves: &[ChessMove], lan: &str) -> Option<ChessMove> {
    let lan = lan.trim();
    if !lan.is_ascii() || !(4..=5).contains(&lan.len()) {
        return None;
    }

    let from = algebraic_to_square(&lan[0..2]).ok()?;
    let to = algebraic_to_square(&lan[2..4]).ok()?;
    let promotion_char = lan[4..].chars().next().map(|ch| ch.to_ascii_lowercase());

    legal_moves.iter().copied().find(|mv| {
        mv.from == from && mv.to == to && mv.promotion.map(|p| p.fen_char()) == promotion_char
    })
}

#[cfg(test)]
mod tests {
    use super::{find_move_by_long_algebraic, move_to_long_algebraic};
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::legal_move_list;

    #[test]
    fn resolves_simple_move() {
        let game = GameState::new_game();
        let moves = legal_move_list(&game);
        let mv = find_move_by_long_algebraic(&moves, "e2e4").expect("e2e4 should be legal");
        assert!(mv.is_double_pawn_push());
        assert_eq!(move_to_long_algebraic(&mv), "e2e4");
    }

    #[test]
    fn promotion_requires_suffix() {
        let game = GameState::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("FEN should parse");
        let moves = legal_move_list(&game);

        assert_eq!(find_move_by_long_algebraic(&moves, "a7a8"), None);
        let mv = find_move_by_long_algebraic(&moves, "a7a8N").expect("underpromotion should resolve");
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
        assert_eq!(move_to_long_algebraic(&mv), "a7a8n");
    }

    #[test]
    fn malformed_or_illegal_strings_do_not_resolve() {
        let moves = legal_move_list(&GameState::new_game());
        for lan in ["", "e2", "e2e5", "z9e4", "e2e4qq", "é2e4"] {
            assert_eq!(find_move_by_long_algebraic(&moves, lan), None, "{lan}");
        }
    }
}
