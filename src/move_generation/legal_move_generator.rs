//! Full legal move generation pipeline.
//!
//! Generates pseudo-legal moves piece by piece, applies each candidate, and
//! drops the ones that leave the mover's own king in check.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::{is_king_in_check, is_square_attacked};
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
use crate::moves::chess_move::{
    ChessMove, FLAG_CAPTURE, FLAG_CASTLING, FLAG_DOUBLE_PAWN_PUSH, FLAG_EN_PASSANT,
};

/// A legal move together with the state it leads to.
#[derive(Debug, Clone)]
pub struct GeneratedMove {
    pub chess_move: ChessMove,
    pub game_after_move: GameState,
}

pub fn generate_legal_moves(game_state: &GameState) -> Vec<GeneratedMove> {
    let mut pseudo = Vec::<ChessMove>::with_capacity(128);
    generate_pseudo_legal_moves(game_state, &mut pseudo);

    let mover = game_state.side_to_move;
    pseudo
        .into_iter()
        .filter_map(|mv| {
            let next = apply_move(game_state, mv);
            if is_king_in_check(&next, mover) {
                None
            } else {
                Some(GeneratedMove {
                    chess_move: mv,
                    game_after_move: next,
                })
            }
        })
        .collect()
}

/// Legal moves without keeping the successor states.
pub fn legal_move_list(game_state: &GameState) -> Vec<ChessMove> {
    generate_legal_moves(game_state)
        .into_iter()
        .map(|generated| generated.chess_move)
        .collect()
}

pub fn has_legal_move(game_state: &GameState) -> bool {
    let mut pseudo = Vec::<ChessMove>::with_capacity(128);
    generate_pseudo_legal_moves(game_state, &mut pseudo);

    let mover = game_state.side_to_move;
    pseudo
        .into_iter()
        .any(|mv| !is_king_in_check(&apply_move(game_state, mv), mover))
}

fn generate_pseudo_legal_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    generate_pawn_moves(game_state, out);
    generate_piece_moves(game_state, PieceKind::Knight, out, |sq, _| knight_attacks(sq));
    generate_piece_moves(game_state, PieceKind::Bishop, out, bishop_attacks);
    generate_piece_moves(game_state, PieceKind::Rook, out, rook_attacks);
    generate_piece_moves(game_state, PieceKind::Queen, out, queen_attacks);
    generate_piece_moves(game_state, PieceKind::King, out, |sq, _| king_attacks(sq));
    generate_castling_moves(game_state, out);
}

fn generate_piece_moves(
    game_state: &GameState,
    piece: PieceKind,
    out: &mut Vec<ChessMove>,
    attacks_from: impl Fn(Square, u64) -> u64,
) {
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];

    let mut pieces = game_state.pieces[side.index()][piece.index()];
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        let mut targets = attacks_from(from, game_state.occupancy_all) & !own_occ;

        while targets != 0 {
            let to = targets.trailing_zeros() as Square;
            let captured = enemy_piece_on(game_state, to);
            let flags = if captured.is_some() { FLAG_CAPTURE } else { 0 };
            out.push(ChessMove::new(from, to, piece, captured, None, flags));
            targets &= targets - 1;
        }

        pieces &= pieces - 1;
    }
}

fn generate_pawn_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    let side = game_state.side_to_move;
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let empty = !game_state.occupancy_all;
    let (start_rank, promotion_rank) = match side {
        Color::Light => (1, 7),
        Color::Dark => (6, 0),
    };

    let mut pawns = game_state.pieces[side.index()][PieceKind::Pawn.index()];
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        pawns &= pawns - 1;

        let one_step = match side {
            Color::Light => from + 8,
            Color::Dark => from - 8,
        };

        if (1u64 << one_step) & empty != 0 {
            push_pawn_move(out, from, one_step, None, 0, promotion_rank);

            if from / 8 == start_rank {
                let two_step = match side {
                    Color::Light => from + 16,
                    Color::Dark => from - 16,
                };
                if (1u64 << two_step) & empty != 0 {
                    out.push(ChessMove::new(
                        from,
                        two_step,
                        PieceKind::Pawn,
                        None,
                        None,
                        FLAG_DOUBLE_PAWN_PUSH,
                    ));
                }
            }
        }

        let mut captures = pawn_attacks(side, from) & enemy_occ;
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            let captured = enemy_piece_on(game_state, to);
            push_pawn_move(out, from, to, captured, FLAG_CAPTURE, promotion_rank);
            captures &= captures - 1;
        }

        if let Some(ep) = game_state.en_passant_square {
            if pawn_attacks(side, from) & (1u64 << ep) != 0 {
                out.push(ChessMove::new(
                    from,
                    ep,
                    PieceKind::Pawn,
                    Some(PieceKind::Pawn),
                    None,
                    FLAG_CAPTURE | FLAG_EN_PASSANT,
                ));
            }
        }
    }
}

fn push_pawn_move(
    out: &mut Vec<ChessMove>,
    from: Square,
    to: Square,
    captured: Option<PieceKind>,
    flags: u8,
    promotion_rank: u8,
) {
    if to / 8 == promotion_rank {
        for promo in PieceKind::PROMOTIONS {
            out.push(ChessMove::new(from, to, PieceKind::Pawn, captured, Some(promo), flags));
        }
    } else {
        out.push(ChessMove::new(from, to, PieceKind::Pawn, captured, None, flags));
    }
}

fn generate_castling_moves(game_state: &GameState, out: &mut Vec<ChessMove>) {
    let side = game_state.side_to_move;
    let enemy = side.opposite();

    // (right, king_from, king_to, must_be_empty, must_not_be_attacked)
    let candidates: [(CastlingRights, Square, Square, u64, [Square; 2]); 2] = match side {
        Color::Light => [
            (CASTLE_LIGHT_KINGSIDE, 4, 6, (1 << 5) | (1 << 6), [5, 6]),
            (CASTLE_LIGHT_QUEENSIDE, 4, 2, (1 << 1) | (1 << 2) | (1 << 3), [3, 2]),
        ],
        Color::Dark => [
            (CASTLE_DARK_KINGSIDE, 60, 62, (1 << 61) | (1 << 62), [61, 62]),
            (CASTLE_DARK_QUEENSIDE, 60, 58, (1 << 57) | (1 << 58) | (1 << 59), [59, 58]),
        ],
    };

    for (right, king_from, king_to, empty_mask, transit) in candidates {
        if game_state.castling_rights & right == 0
            || game_state.occupancy_all & empty_mask != 0
            || game_state.pieces[side.index()][PieceKind::King.index()] & (1u64 << king_from) == 0
        {
            continue;
        }
        // Cannot castle out of or through check.
        if is_square_attacked(game_state, king_from, enemy)
            || transit.iter().any(|&sq| is_square_attacked(game_state, sq, enemy))
        {
            continue;
        }
        out.push(ChessMove::new(
            king_from,
            king_to,
            PieceKind::King,
            None,
            None,
            FLAG_CASTLING,
        ));
    }
}

#[inline]
fn enemy_piece_on(game_state: &GameState, square: Square) -> Option<PieceKind> {
    let enemy = game_state.side_to_move.opposite();
    let mask = 1u64 << square;
    PieceKind::ALL
        .into_iter()
        .find(|piece| game_state.pieces[enemy.index()][piece.index()] & mask != 0)
}
