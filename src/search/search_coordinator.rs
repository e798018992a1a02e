//! Drives one engine search on behalf of a session.
//!
//! The coordinator owns no engine or history. It builds the request from its
//! configured limits, forwards progress reports to a [`YieldHook`] so a long
//! search gives other work a chance to run, and reduces the engine's result to
//! a single move.

use std::time::Duration;

use crate::engines::engine_trait::{SearchEngine, SearchInfo, SearchLimits, SearchRequest};
use crate::errors::{CoordinatorError, CoordinatorResult, EngineError};
use crate::game_state::position::Position;
use crate::moves::chess_move::ChessMove;
use crate::search::cancellation::CancellationToken;

/// Checkpoint invoked periodically while a search runs.
pub trait YieldHook {
    fn checkpoint(&mut self, info: &SearchInfo);
}

/// Yields the current OS thread at every checkpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadYield;

impl YieldHook for ThreadYield {
    fn checkpoint(&mut self, _info: &SearchInfo) {
        std::thread::yield_now();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl YieldHook for NoYield {
    fn checkpoint(&mut self, _info: &SearchInfo) {}
}

impl<F: FnMut(&SearchInfo)> YieldHook for F {
    fn checkpoint(&mut self, info: &SearchInfo) {
        self(info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Move(ChessMove),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCoordinator {
    pub limits: SearchLimits,
    /// Progress reports between two yield checkpoints; zero is treated as one.
    pub yield_interval: u32,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self {
            limits: SearchLimits {
                move_time: Some(Duration::from_millis(300)),
                nodes: None,
                depth: None,
            },
            yield_interval: 64,
        }
    }
}

impl SearchCoordinator {
    pub fn new(limits: SearchLimits, yield_interval: u32) -> Self {
        Self {
            limits,
            yield_interval,
        }
    }

    /// Ask `engine` for a move from the last position of `history`.
    pub fn request_move<P, E, H>(
        &self,
        engine: &mut E,
        history: &[P],
        cancel: &CancellationToken,
        hook: &mut H,
    ) -> CoordinatorResult<SearchOutcome>
    where
        P: Position,
        E: SearchEngine<P> + ?Sized,
        H: YieldHook + ?Sized,
    {
        if cancel.is_cancelled() {
            log::debug!("search cancelled before start");
            return Ok(SearchOutcome::Cancelled);
        }

        let interval = self.yield_interval.max(1);
        let mut reports = 0u32;
        let mut progress = |info: &SearchInfo| {
            reports = reports.wrapping_add(1);
            if reports % interval == 0 {
                hook.checkpoint(info);
            }
        };

        let request = SearchRequest {
            positions: history,
            limits: self.limits,
            cancel,
        };

        let result = match engine.search(request, &mut progress) {
            Ok(result) => result,
            Err(EngineError::Cancelled) => {
                log::debug!("{} search cancelled", engine.name());
                return Ok(SearchOutcome::Cancelled);
            }
            Err(err) => return Err(err.into()),
        };

        if cancel.is_cancelled() {
            log::debug!("{} search finished after cancellation", engine.name());
            return Ok(SearchOutcome::Cancelled);
        }

        match result.best_move() {
            Some(mv) => {
                log::debug!(
                    "{} depth {} score {} nodes {}",
                    engine.name(),
                    result.depth,
                    result.score,
                    result.nodes
                );
                Ok(SearchOutcome::Move(mv))
            }
            None => {
                log::error!("{} returned an empty principal line", engine.name());
                Err(CoordinatorError::EmptyMainLine)
            }
        }
    }
}
