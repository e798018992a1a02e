//! Perft node counting used to validate move generation.

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::{generate_legal_moves, has_legal_move};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft(game_state: &GameState, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut total = PerftCounts::default();
    for generated in generate_legal_moves(game_state) {
        if depth > 1 {
            total.merge(perft(&generated.game_after_move, depth - 1));
            continue;
        }

        let mv = generated.chess_move;
        let next = &generated.game_after_move;
        total.nodes += 1;
        total.captures += usize::from(mv.is_capture());
        total.en_passant += usize::from(mv.is_en_passant());
        total.castles += usize::from(mv.is_castling());
        total.promotions += usize::from(mv.promotion.is_some());
        if is_king_in_check(next, next.side_to_move) {
            total.checks += 1;
            total.checkmates += usize::from(!has_legal_move(next));
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::perft;
    use crate::game_state::game_state::GameState;

    fn nodes(fen: &str, depth: u8) -> usize {
        let game = GameState::from_fen(fen).expect("perft FEN should parse");
        perft(&game, depth).nodes
    }

    #[test]
    fn startpos_node_counts() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(nodes(fen, 1), 20);
        assert_eq!(nodes(fen, 2), 400);
        assert_eq!(nodes(fen, 3), 8902);
    }

    #[test]
    fn kiwipete_counts() {
        let game = GameState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("kiwipete FEN should parse");
        let depth1 = perft(&game, 1);
        assert_eq!(depth1.nodes, 48);
        assert_eq!(depth1.captures, 8);
        assert_eq!(depth1.castles, 2);
        assert_eq!(perft(&game, 2).nodes, 2039);
    }

    #[test]
    fn endgame_and_promotion_counts() {
        assert_eq!(nodes("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 3), 2812);
        assert_eq!(
            nodes("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 2),
            264
        );
        assert_eq!(
            nodes("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", 2),
            1486
        );
    }
}
