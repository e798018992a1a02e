//! Crate root module declarations for the chess session library.
//!
//! Exposes the board model, move generation, notation, search and session
//! layers so the shell binary, benches and tests can import stable paths.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod position;
    pub mod zobrist;
}

pub mod moves {
    pub mod attack_tables;
    pub mod chess_move;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod notation {
    pub mod fan;
    pub mod terminal_state;
}

pub mod search {
    pub mod board_scoring;
    pub mod cancellation;
    pub mod iterative_deepening;
    pub mod search_coordinator;
}

pub mod engines {
    pub mod engine_iterative;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod session {
    pub mod game_session;
    pub mod log_sink;
    pub mod session_config;
}

pub mod shell {
    pub mod command_shell;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_game_state;
}
