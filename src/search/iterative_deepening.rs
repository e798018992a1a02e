//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Each completed iteration replaces the principal line. An iteration cut
//! short by the time or node budget is discarded unless nothing has completed
//! yet, so the result always names a legal move when one exists. Positions
//! that repeat an earlier position of the game or the current search path
//! score as draws.

use std::time::{Duration, Instant};

use crate::engines::engine_trait::{SearchInfo, SearchResult};
use crate::game_state::position::Position;
use crate::moves::chess_move::ChessMove;
use crate::search::board_scoring::{BoardScorer, MaterialScorer, MATE_SCORE};
use crate::search::cancellation::CancellationToken;

/// Nodes between budget/cancellation polls.
const POLL_INTERVAL: u64 = 256;
/// Nodes between progress reports.
pub const PROGRESS_INTERVAL: u64 = 2048;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub move_time: Option<Duration>,
    pub node_limit: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            move_time: None,
            node_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAbort {
    Cancelled,
    OutOfBudget,
}

struct SearchContext<'a, S: BoardScorer> {
    scorer: &'a S,
    cancel: &'a CancellationToken,
    progress: &'a mut dyn FnMut(&SearchInfo),
    started: Instant,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: u64,
    depth: u8,
    best_score: i32,
    /// Repetition keys of the game history followed by the current search path.
    path_keys: Vec<u64>,
}

impl<S: BoardScorer> SearchContext<'_, S> {
    fn visit(&mut self) -> Result<(), SearchAbort> {
        self.nodes += 1;

        if self.nodes % PROGRESS_INTERVAL == 0 {
            self.report();
        }

        if self.nodes % POLL_INTERVAL == 0 {
            if self.cancel.is_cancelled() {
                return Err(SearchAbort::Cancelled);
            }
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(SearchAbort::OutOfBudget);
            }
        }

        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return Err(SearchAbort::OutOfBudget);
        }

        Ok(())
    }

    fn report(&mut self) {
        let info = SearchInfo {
            depth: self.depth,
            nodes: self.nodes,
            score: self.best_score,
            elapsed_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        (self.progress)(&info);
    }

    fn is_repetition(&self, key: u64) -> bool {
        self.path_keys.iter().rev().skip(1).any(|&k| k == key)
    }
}

/// Search the last position of `history`.
///
/// Returns `Err(SearchAbort::Cancelled)` if `cancel` trips; budget exhaustion
/// is not an error and yields the best line found so far.
pub fn iterative_deepening_search<P: Position, S: BoardScorer>(
    history: &[P],
    scorer: &S,
    config: SearchConfig,
    cancel: &CancellationToken,
    progress: &mut dyn FnMut(&SearchInfo),
) -> Result<SearchResult, SearchAbort> {
    if cancel.is_cancelled() {
        return Err(SearchAbort::Cancelled);
    }

    let Some(root) = history.last() else {
        return Ok(SearchResult::default());
    };

    let started = Instant::now();
    let mut ctx = SearchContext {
        scorer,
        cancel,
        progress,
        started,
        deadline: config.move_time.map(|budget| started + budget),
        node_limit: config.node_limit,
        nodes: 0,
        depth: 0,
        best_score: 0,
        path_keys: history.iter().map(Position::repetition_key).collect(),
    };

    let mut root_moves = ordered_moves(root);
    let mut result = SearchResult::default();
    if root_moves.is_empty() {
        result.score = terminal_score(root, 0);
        return Ok(result);
    }

    for depth in 1..=config.max_depth.max(1) {
        ctx.depth = depth;
        match search_root(root, &mut root_moves, depth, &mut ctx) {
            Ok((score, line)) => {
                result.main_line = line;
                result.score = score;
                result.depth = depth;
                ctx.best_score = score;
                ctx.report();
                log::debug!(
                    "depth {} score {} nodes {} elapsed {:?}",
                    depth,
                    score,
                    ctx.nodes,
                    ctx.started.elapsed()
                );
                if score.abs() >= MATE_SCORE - i32::from(depth) {
                    break;
                }
            }
            Err(SearchAbort::Cancelled) => return Err(SearchAbort::Cancelled),
            Err(SearchAbort::OutOfBudget) => break,
        }
    }

    if result.main_line.is_empty() {
        // Budget ran out before depth 1 finished; root_moves[0] is the best
        // move seen so far (or the first ordered move).
        result.main_line.push(root_moves[0]);
    }

    result.nodes = ctx.nodes;
    Ok(result)
}

fn search_root<P: Position, S: BoardScorer>(
    root: &P,
    root_moves: &mut [ChessMove],
    depth: u8,
    ctx: &mut SearchContext<'_, S>,
) -> Result<(i32, Vec<ChessMove>), SearchAbort> {
    let mut alpha = -MATE_SCORE - 1;
    let beta = MATE_SCORE + 1;
    let mut best_line = Vec::new();
    let mut best_index = 0usize;

    for index in 0..root_moves.len() {
        let mv = root_moves[index];
        let next = root.make_move(mv);
        let mut child_line = Vec::new();

        ctx.path_keys.push(next.repetition_key());
        let outcome = negamax(&next, depth - 1, -beta, -alpha, 1, &mut child_line, ctx);
        ctx.path_keys.pop();

        let score = match outcome {
            Ok(score) => -score,
            Err(abort) => {
                // Keep the best move of the unfinished iteration at the front.
                root_moves.swap(0, best_index);
                return Err(abort);
            }
        };

        if score > alpha {
            alpha = score;
            best_index = index;
            best_line.clear();
            best_line.push(mv);
            best_line.extend(child_line);
        }
    }

    // Next iteration searches the best move first.
    root_moves[..=best_index].rotate_right(1);
    Ok((alpha, best_line))
}

fn negamax<P: Position, S: BoardScorer>(
    position: &P,
    depth: u8,
    mut alpha: i32,
    beta: i32,
    ply: u8,
    line: &mut Vec<ChessMove>,
    ctx: &mut SearchContext<'_, S>,
) -> Result<i32, SearchAbort> {
    ctx.visit()?;

    if ctx.is_repetition(position.repetition_key()) {
        return Ok(0);
    }

    let moves = ordered_moves(position);
    if moves.is_empty() {
        return Ok(terminal_score(position, ply));
    }
    if depth == 0 {
        return Ok(ctx.scorer.score(position));
    }

    let mut best = -MATE_SCORE - 1;
    for mv in moves {
        let next = position.make_move(mv);
        let mut child_line = Vec::new();

        ctx.path_keys.push(next.repetition_key());
        let outcome = negamax(&next, depth - 1, -beta, -alpha, ply + 1, &mut child_line, ctx);
        ctx.path_keys.pop();
        let score = -outcome?;

        if score > best {
            best = score;
        }
        if score > alpha {
            alpha = score;
            line.clear();
            line.push(mv);
            line.extend(child_line);
        }
        if alpha >= beta {
            break;
        }
    }

    Ok(best)
}

/// Captures first, most valuable victim first, then quiet moves.
fn ordered_moves<P: Position>(position: &P) -> Vec<ChessMove> {
    let mut moves = position.generate_legal_moves();
    moves.sort_by_key(|mv| {
        let victim = mv.captured_piece.map_or(0, MaterialScorer::piece_value);
        let promotion = mv.promotion.map_or(0, MaterialScorer::piece_value);
        let attacker = if mv.captured_piece.is_some() {
            MaterialScorer::piece_value(mv.moved_piece).max(1) / 10
        } else {
            0
        };
        -(victim + promotion - attacker)
    });
    moves
}

fn terminal_score<P: Position>(position: &P, ply: u8) -> i32 {
    if position.is_check() {
        -MATE_SCORE + i32::from(ply)
    } else {
        0
    }
}
