//! FEN-to-GameState parser.
//!
//! Builds a fully-populated state from a Forsyth-Edwards Notation string and
//! validates it enough for move generation to be sound: one king per side,
//! the side not to move must not be in check, an en-passant target must follow
//! a real double push, and castling rights that the piece placement cannot
//! support are dropped.

use crate::errors::{PositionError, PositionResult};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::utils::algebraic::{algebraic_to_square, square_rank};

pub fn parse_fen(fen: &str) -> PositionResult<GameState> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(PositionError::MissingFenField("board"))?;
    let side_part = parts
        .next()
        .ok_or(PositionError::MissingFenField("side-to-move"))?;
    let castling_part = parts.next().ok_or(PositionError::MissingFenField("castling"))?;
    let en_passant_part = parts
        .next()
        .ok_or(PositionError::MissingFenField("en-passant"))?;
    // Clock fields are optional; many GUIs emit four-field FEN.
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(PositionError::TrailingFenFields);
    }

    let mut game_state = GameState::new_empty();

    parse_board(board_part, &mut game_state)?;
    game_state.side_to_move = parse_side_to_move(side_part)?;
    game_state.castling_rights = parse_castling_rights(castling_part)?;
    game_state.en_passant_square = parse_en_passant_square(en_passant_part)?;
    game_state.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| PositionError::InvalidClock(halfmove_part.to_owned()))?;
    game_state.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| PositionError::InvalidClock(fullmove_part.to_owned()))?
        .max(1);

    validate_kings(&game_state)?;
    validate_en_passant(&game_state, en_passant_part)?;
    game_state.castling_rights &= supported_castling_rights(&game_state);
    game_state.refresh_derived();

    if is_king_in_check(&game_state, game_state.side_to_move.opposite()) {
        return Err(PositionError::OpponentInCheck);
    }

    Ok(game_state)
}

fn parse_board(board_part: &str, game_state: &mut GameState) -> PositionResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(PositionError::InvalidBoard(
            "board layout must contain 8 ranks".to_owned(),
        ));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(PositionError::InvalidBoard(format!(
                        "invalid empty-square count '{ch}'"
                    )));
                }
                file += empty_count as usize;
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch).ok_or_else(|| {
                PositionError::InvalidBoard(format!("invalid piece character '{ch}'"))
            })?;

            if file >= 8 {
                return Err(PositionError::InvalidBoard(format!(
                    "rank {} has too many files",
                    board_rank + 1
                )));
            }

            if piece == PieceKind::Pawn && (board_rank == 0 || board_rank == 7) {
                return Err(PositionError::InvalidBoard(format!(
                    "pawn on back rank {}",
                    board_rank + 1
                )));
            }

            let sq = board_rank * 8 + file;
            game_state.pieces[color.index()][piece.index()] |= 1u64 << sq;
            file += 1;
        }

        if file != 8 {
            return Err(PositionError::InvalidBoard(format!(
                "rank {} does not sum to 8 files",
                board_rank + 1
            )));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> PositionResult<Color> {
    match side_part {
        "w" | "W" => Ok(Color::Light),
        "b" | "B" => Ok(Color::Dark),
        _ => Err(PositionError::InvalidSideToMove(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> PositionResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_LIGHT_KINGSIDE,
            'Q' => rights |= CASTLE_LIGHT_QUEENSIDE,
            'k' => rights |= CASTLE_DARK_KINGSIDE,
            'q' => rights |= CASTLE_DARK_QUEENSIDE,
            _ => return Err(PositionError::InvalidCastlingRights(ch)),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> PositionResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)?;
    match square_rank(square) {
        2 | 5 => Ok(Some(square)),
        _ => Err(PositionError::InvalidSquare(en_passant_part.to_owned())),
    }
}

/// The target must sit behind an enemy pawn that just double-pushed from an
/// empty square, on the rank the side to move captures onto.
fn validate_en_passant(game_state: &GameState, en_passant_part: &str) -> PositionResult<()> {
    let Some(target) = game_state.en_passant_square else {
        return Ok(());
    };

    let mover = game_state.side_to_move;
    let capture_rank = if mover.is_light() { 5 } else { 2 };
    if square_rank(target) != capture_rank {
        return Err(PositionError::InvalidSquare(en_passant_part.to_owned()));
    }

    let (pushed_to, pushed_from) = if mover.is_light() {
        (target - 8, target + 8)
    } else {
        (target + 8, target - 8)
    };
    let occupied = |square: Square| {
        game_state
            .pieces
            .iter()
            .flatten()
            .any(|bitboard| bitboard & (1u64 << square) != 0)
    };
    let pushed_pawn = game_state.pieces[mover.opposite().index()][PieceKind::Pawn.index()]
        & (1u64 << pushed_to)
        != 0;

    if !pushed_pawn || occupied(target) || occupied(pushed_from) {
        return Err(PositionError::InvalidSquare(en_passant_part.to_owned()));
    }
    Ok(())
}

fn validate_kings(game_state: &GameState) -> PositionResult<()> {
    for (color, name) in [(Color::Light, "white"), (Color::Dark, "black")] {
        let count = game_state.pieces[color.index()][PieceKind::King.index()].count_ones();
        if count != 1 {
            return Err(PositionError::KingCount { color: name, count });
        }
    }
    Ok(())
}

/// Rights whose king and rook still stand on their home squares.
fn supported_castling_rights(game_state: &GameState) -> CastlingRights {
    let has = |color: Color, piece: PieceKind, square: Square| {
        game_state.pieces[color.index()][piece.index()] & (1u64 << square) != 0
    };

    let mut rights = 0;
    if has(Color::Light, PieceKind::King, 4) {
        if has(Color::Light, PieceKind::Rook, 7) {
            rights |= CASTLE_LIGHT_KINGSIDE;
        }
        if has(Color::Light, PieceKind::Rook, 0) {
            rights |= CASTLE_LIGHT_QUEENSIDE;
        }
    }
    if has(Color::Dark, PieceKind::King, 60) {
        if has(Color::Dark, PieceKind::Rook, 63) {
            rights |= CASTLE_DARK_KINGSIDE;
        }
        if has(Color::Dark, PieceKind::Rook, 56) {
            rights |= CASTLE_DARK_QUEENSIDE;
        }
    }
    rights
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::Light
    } else if ch.is_ascii_lowercase() {
        Color::Dark
    } else {
        return None;
    };

    Some((color, PieceKind::from_fen_char(ch)?))
}
