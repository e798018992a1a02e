use crate::game_state::chess_rules::CASTLING_ROOK_MOVES;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::chess_move::ChessMove;

/// Produce the state reached by playing `mv`. The move is trusted: callers
/// must have taken it from the legal move list of `game_state`.
pub fn apply_move(game_state: &GameState, mv: ChessMove) -> GameState {
    let from_mask = 1u64 << mv.from;
    let to_mask = 1u64 << mv.to;

    let moving_color = game_state.side_to_move;
    let enemy_color = moving_color.opposite();

    let mut next = game_state.clone();

    next.pieces[moving_color.index()][mv.moved_piece.index()] &= !from_mask;

    if mv.is_en_passant() {
        let capture_sq = match moving_color {
            Color::Light => mv.to.wrapping_sub(8),
            Color::Dark => mv.to.wrapping_add(8),
        };
        next.pieces[enemy_color.index()][PieceKind::Pawn.index()] &= !(1u64 << (capture_sq & 63));
    } else if mv.is_capture() {
        for bb in next.pieces[enemy_color.index()].iter_mut() {
            *bb &= !to_mask;
        }
    }

    let placed = mv.promotion.unwrap_or(mv.moved_piece);
    next.pieces[moving_color.index()][placed.index()] |= to_mask;

    if mv.is_castling() {
        if let Some(&(_, _, rook_from, rook_to)) = CASTLING_ROOK_MOVES
            .iter()
            .find(|(king_from, king_to, _, _)| *king_from == mv.from && *king_to == mv.to)
        {
            let rooks = &mut next.pieces[moving_color.index()][PieceKind::Rook.index()];
            *rooks &= !(1u64 << rook_from);
            *rooks |= 1u64 << rook_to;
        }
    }

    next.castling_rights &= !castling_rights_lost(mv);

    next.en_passant_square = if mv.is_double_pawn_push() {
        Some((mv.from + mv.to) / 2)
    } else {
        None
    };

    if mv.moved_piece == PieceKind::Pawn || mv.is_capture() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if moving_color == Color::Dark {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = enemy_color;
    next.last_move = Some(mv);
    next.refresh_derived();

    next
}

/// Rights cleared by touching a king or rook home square.
fn castling_rights_lost(mv: ChessMove) -> CastlingRights {
    let touched = |square: Square| -> CastlingRights {
        match square {
            0 => CASTLE_LIGHT_QUEENSIDE,
            4 => CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE,
            7 => CASTLE_LIGHT_KINGSIDE,
            56 => CASTLE_DARK_QUEENSIDE,
            60 => CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE,
            63 => CASTLE_DARK_KINGSIDE,
            _ => 0,
        }
    };
    touched(mv.from) | touched(mv.to)
}

#[cfg(test)]
mod tests {
    use super::apply_move;
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::game_state::GameState;
    use crate::moves::chess_move::{ChessMove, FLAG_CASTLING, FLAG_DOUBLE_PAWN_PUSH};

    #[test]
    fn double_push_sets_en_passant_square() {
        let game = GameState::new_game();
        let mv = ChessMove::new(12, 28, PieceKind::Pawn, None, None, FLAG_DOUBLE_PAWN_PUSH);
        let next = apply_move(&game, mv);

        assert_eq!(
            next.get_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(next.last_move, Some(mv));
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let game =
            GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let mv = ChessMove::new(4, 6, PieceKind::King, None, None, FLAG_CASTLING);
        let next = apply_move(&game, mv);

        assert_eq!(next.get_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
    }
}
