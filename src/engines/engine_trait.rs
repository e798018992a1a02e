//! Engine abstraction layer used by the search coordinator.
//!
//! Defines the request and result payloads so different engine strategies can
//! be injected into a session behind a single trait.

use std::time::Duration;

use crate::errors::EngineResult;
use crate::game_state::position::Position;
use crate::moves::chess_move::ChessMove;
use crate::search::cancellation::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub move_time: Option<Duration>,
    pub nodes: Option<u64>,
    pub depth: Option<u8>,
}

/// Everything an engine needs for one search. `positions` is the full game
/// history, oldest first; the last element is the position to move from.
pub struct SearchRequest<'a, P: Position> {
    pub positions: &'a [P],
    pub limits: SearchLimits,
    pub cancel: &'a CancellationToken,
}

impl<'a, P: Position> SearchRequest<'a, P> {
    pub fn current(&self) -> Option<&'a P> {
        self.positions.last()
    }
}

/// Periodic progress report passed to the request's progress callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u8,
    pub nodes: u64,
    pub score: i32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub main_line: Vec<ChessMove>,
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
}

impl SearchResult {
    pub fn best_move(&self) -> Option<ChessMove> {
        self.main_line.first().copied()
    }
}

pub trait SearchEngine<P: Position>: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> EngineResult<()> {
        Ok(())
    }

    /// Search the last position of `request.positions`. Implementations call
    /// `progress` regularly and return `EngineError::Cancelled` promptly once
    /// `request.cancel` trips.
    fn search(
        &mut self,
        request: SearchRequest<'_, P>,
        progress: &mut dyn FnMut(&SearchInfo),
    ) -> EngineResult<SearchResult>;
}
