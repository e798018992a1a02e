//! Random-move engine.
//!
//! Selects uniformly from legal moves. Useful for diagnostics, integration
//! testing and low-strength play.

use rand::prelude::IndexedRandom;

use crate::engines::engine_trait::{SearchEngine, SearchInfo, SearchRequest, SearchResult};
use crate::errors::{EngineError, EngineResult};
use crate::game_state::position::Position;

#[derive(Debug, Default)]
pub struct RandomEngine;

impl RandomEngine {
    pub fn new() -> Self {
        Self
    }
}

impl<P: Position> SearchEngine<P> for RandomEngine {
    fn name(&self) -> &str {
        "Random Mover"
    }

    fn search(
        &mut self,
        request: SearchRequest<'_, P>,
        progress: &mut dyn FnMut(&SearchInfo),
    ) -> EngineResult<SearchResult> {
        if request.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let position = request.current().ok_or(EngineError::EmptyHistory)?;

        let legal_moves = position.generate_legal_moves();
        log::trace!("random engine legal_moves {}", legal_moves.len());

        let mut rng = rand::rng();
        let mut result = SearchResult {
            nodes: legal_moves.len() as u64,
            depth: 1,
            ..SearchResult::default()
        };
        if let Some(picked) = legal_moves.as_slice().choose(&mut rng) {
            result.main_line.push(*picked);
        }

        progress(&SearchInfo {
            depth: result.depth,
            nodes: result.nodes,
            score: 0,
            elapsed_ms: 0,
        });
        Ok(result)
    }
}
