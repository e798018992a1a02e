//! Error types for the session crate.
//!
//! Input problems (bad FEN, bad square names) are recoverable and surface as
//! `PositionError`. Engine and coordinator failures that indicate a broken
//! search contract are marked fatal through `SessionError::is_fatal`, and the
//! interactive shell terminates the session when it sees one.

use crate::moves::chess_move::ChessMove;

/// Board parsing and naming errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("missing {0} field in FEN")]
    MissingFenField(&'static str),

    #[error("FEN has extra trailing fields")]
    TrailingFenFields,

    #[error("invalid board layout: {0}")]
    InvalidBoard(String),

    #[error("invalid side-to-move field: {0}")]
    InvalidSideToMove(String),

    #[error("invalid castling rights character: {0}")]
    InvalidCastlingRights(char),

    #[error("invalid clock field: {0}")]
    InvalidClock(String),

    #[error("invalid algebraic square: {0}")]
    InvalidSquare(String),

    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: &'static str, count: u32 },

    #[error("side not to move is in check")]
    OpponentInCheck,
}

pub type PositionResult<T> = Result<T, PositionError>;

/// Errors raised by a `SearchEngine` implementation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("search was cancelled")]
    Cancelled,

    #[error("search request carried an empty position history")]
    EmptyHistory,

    #[error("invalid engine option {name}: {reason}")]
    InvalidOption { name: String, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while coordinating a search.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The engine returned no move although it was not cancelled.
    #[error("engine returned an empty principal line")]
    EmptyMainLine,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("position at half-move {0} has no producing move")]
    MissingLastMove(usize),

    #[error("half-move {halfmove} is out of range for a history of {len} positions")]
    OutOfRange { halfmove: usize, len: usize },
}

/// Errors surfaced by `GameSession`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] PositionError),

    #[error("engine supplied a move that is not legal here: {0:?}")]
    EngineContract(ChessMove),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("unknown option {name}")]
    UnknownOption { name: String },

    #[error("invalid value {value:?} for option {name}")]
    InvalidOptionValue { name: String, value: String },

    #[error("engine rejected option: {0}")]
    EngineOption(EngineError),
}

impl SessionError {
    /// True when the error means the session can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionError::EngineContract(_) => true,
            SessionError::Coordinator(CoordinatorError::EmptyMainLine) => true,
            SessionError::Coordinator(CoordinatorError::Engine(EngineError::EmptyHistory)) => {
                true
            }
            _ => false,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
