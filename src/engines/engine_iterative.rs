//! Iterative deepening alpha-beta engine.
//!
//! Depth, time and node limits come from the request; the engine's own
//! default depth applies when the request leaves depth open.

use crate::engines::engine_trait::{SearchEngine, SearchInfo, SearchRequest, SearchResult};
use crate::errors::{EngineError, EngineResult};
use crate::game_state::position::Position;
use crate::search::board_scoring::MaterialScorer;
use crate::search::iterative_deepening::{iterative_deepening_search, SearchConfig};

pub const MAX_SEARCH_DEPTH: u8 = 64;

pub struct IterativeEngine {
    default_depth: u8,
    scorer: MaterialScorer,
}

impl IterativeEngine {
    pub fn new(default_depth: u8) -> Self {
        Self {
            default_depth: default_depth.clamp(1, MAX_SEARCH_DEPTH),
            scorer: MaterialScorer,
        }
    }

    pub fn default_depth(&self) -> u8 {
        self.default_depth
    }
}

impl Default for IterativeEngine {
    fn default() -> Self {
        Self::new(MAX_SEARCH_DEPTH)
    }
}

impl<P: Position> SearchEngine<P> for IterativeEngine {
    fn name(&self) -> &str {
        "Iterative Alpha-Beta"
    }

    fn set_option(&mut self, name: &str, value: &str) -> EngineResult<()> {
        if name.eq_ignore_ascii_case("Depth") {
            let parsed = value
                .trim()
                .parse::<u8>()
                .map_err(|_| EngineError::InvalidOption {
                    name: name.to_owned(),
                    reason: format!("expected a depth, got '{value}'"),
                })?;
            self.default_depth = parsed.clamp(1, MAX_SEARCH_DEPTH);
            return Ok(());
        }
        Err(EngineError::InvalidOption {
            name: name.to_owned(),
            reason: "unsupported option".to_owned(),
        })
    }

    fn search(
        &mut self,
        request: SearchRequest<'_, P>,
        progress: &mut dyn FnMut(&SearchInfo),
    ) -> EngineResult<SearchResult> {
        if request.positions.is_empty() {
            return Err(EngineError::EmptyHistory);
        }

        let config = SearchConfig {
            max_depth: request
                .limits
                .depth
                .unwrap_or(self.default_depth)
                .clamp(1, MAX_SEARCH_DEPTH),
            move_time: request.limits.move_time,
            node_limit: request.limits.nodes,
        };

        let result = iterative_deepening_search(
            request.positions,
            &self.scorer,
            config,
            request.cancel,
            progress,
        )
        .map_err(|_| EngineError::Cancelled)?;

        log::debug!(
            "iterative engine depth {} score {} nodes {} line {}",
            result.depth,
            result.score,
            result.nodes,
            result.main_line.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::IterativeEngine;
    use crate::engines::engine_trait::{SearchEngine, SearchLimits, SearchRequest};
    use crate::errors::EngineError;
    use crate::game_state::game_state::GameState;
    use crate::game_state::position::Position;
    use crate::search::cancellation::CancellationToken;

    fn limits(depth: u8) -> SearchLimits {
        SearchLimits {
            move_time: Some(Duration::from_secs(10)),
            nodes: None,
            depth: Some(depth),
        }
    }

    #[test]
    fn returns_legal_move_from_history() {
        let start = GameState::new_game();
        let after = start.make_move_lan("e2e4").expect("e2e4 should be legal");
        let history = vec![start, after.clone()];
        let cancel = CancellationToken::new();
        let mut engine = IterativeEngine::new(3);

        let result = SearchEngine::<GameState>::search(
            &mut engine,
            SearchRequest {
                positions: &history,
                limits: limits(2),
                cancel: &cancel,
            },
            &mut |_| {},
        )
        .expect("search should succeed");

        let best = result.best_move().expect("a move should be found");
        assert!(after.generate_legal_moves().contains(&best));
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn cancelled_request_reports_cancelled() {
        let history = vec![GameState::new_game()];
        let cancel = CancellationToken::cancelled();
        let mut engine = IterativeEngine::default();
        let outcome = engine.search(
            SearchRequest {
                positions: &history,
                limits: SearchLimits::default(),
                cancel: &cancel,
            },
            &mut |_| {},
        );
        assert_eq!(outcome, Err(EngineError::Cancelled));
    }

    #[test]
    fn empty_history_is_rejected() {
        let history: Vec<GameState> = Vec::new();
        let cancel = CancellationToken::new();
        let mut engine = IterativeEngine::new(2);
        let outcome = engine.search(
            SearchRequest {
                positions: &history,
                limits: limits(1),
                cancel: &cancel,
            },
            &mut |_| {},
        );
        assert_eq!(outcome, Err(EngineError::EmptyHistory));
    }

    #[test]
    fn depth_option_is_parsed_and_clamped() {
        let mut engine = IterativeEngine::new(4);
        SearchEngine::<GameState>::set_option(&mut engine, "depth", "200")
            .expect("depth option should parse");
        assert_eq!(engine.default_depth(), 64);

        let err = SearchEngine::<GameState>::set_option(&mut engine, "Depth", "deep")
            .expect_err("non-numeric depth should fail");
        assert!(matches!(err, EngineError::InvalidOption { .. }));
        assert!(SearchEngine::<GameState>::set_option(&mut engine, "Hash", "16").is_err());
    }
}
