//! One interactive game: the position history plus the engine that plays it.
//!
//! All state sits behind a single mutex. Every operation holds the lock for
//! its whole duration, including AI searches, so operations on one session
//! are serialized. History is only modified after every fallible step has
//! succeeded, which keeps the state consistent if a caller panics while
//! holding the lock; a poisoned lock is therefore recovered rather than
//! propagated.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::engines::engine_trait::SearchEngine;
use crate::errors::{SessionError, SessionResult};
use crate::game_state::position::Position;
use crate::moves::chess_move::ChessMove;
use crate::notation::fan::NotationFormatter;
use crate::notation::terminal_state::{GameResult, TerminalStateClassifier};
use crate::search::cancellation::CancellationToken;
use crate::search::search_coordinator::{SearchOutcome, ThreadYield, YieldHook};
use crate::session::log_sink::{GameLogSink, LoggedMove};
use crate::session::session_config::SessionConfig;
use crate::utils::long_algebraic::move_to_long_algebraic;
use crate::utils::pgn::{write_pgn, PgnHeaders};
use crate::utils::render_game_state::render_game_state;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// FEN of the new current position.
    Applied(String),
    /// The move was not legal; history is unchanged.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiMoveOutcome {
    Moved { mv: ChessMove, fen: String },
    Cancelled,
    /// The current position has no legal moves.
    GameOver(GameResult),
}

struct SessionState<P, E> {
    /// Never empty; the last element is the current position.
    positions: Vec<P>,
    engine: E,
    config: SessionConfig,
}

impl<P: Position, E: SearchEngine<P>> SessionState<P, E> {
    fn current(&self) -> &P {
        // `positions` is never empty.
        &self.positions[self.positions.len() - 1]
    }

    fn apply_engine_move(&mut self, mv: ChessMove) -> SessionResult<String> {
        let current = self.current();
        if !current.generate_legal_moves().contains(&mv) {
            log::error!(
                "engine move {} is not legal in {}",
                move_to_long_algebraic(&mv),
                current.to_fen()
            );
            return Err(SessionError::EngineContract(mv));
        }
        let next = current.make_move(mv);
        let fen = next.to_fen();
        self.positions.push(next);
        Ok(fen)
    }
}

pub struct GameSession<P: Position, E: SearchEngine<P>> {
    state: Mutex<SessionState<P, E>>,
}

impl<P: Position, E: SearchEngine<P>> GameSession<P, E> {
    /// Session at the standard starting position with default settings.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    pub fn with_config(engine: E, config: SessionConfig) -> Self {
        Self {
            state: Mutex::new(SessionState {
                positions: vec![P::starting_position()],
                engine,
                config,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<P, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the history to a single position parsed from `fen`, or to the
    /// standard start when `fen` is `None` or blank. Returns the normalized FEN.
    ///
    /// A malformed FEN is rejected and the previous history is kept.
    pub fn initialize(&self, fen: Option<&str>) -> SessionResult<String> {
        let start = match fen.map(str::trim).filter(|fen| !fen.is_empty()) {
            Some(fen) => P::from_fen(fen).map_err(|err| {
                log::warn!("rejected FEN {fen:?}: {err}");
                SessionError::InvalidFen(err)
            })?,
            None => P::starting_position(),
        };

        let normalized = start.to_fen();
        let mut state = self.lock();
        state.positions.clear();
        state.positions.push(start);
        state.engine.new_game();
        log::debug!("session initialized at {normalized}");
        Ok(normalized)
    }

    /// Play a long-algebraic move for the side to move. A move missing its
    /// promotion letter is retried as a queen promotion.
    pub fn apply_manual_move(&self, lan: &str) -> MoveOutcome {
        let lan = lan.trim();
        let mut state = self.lock();
        let current = state.current();
        let next = current
            .make_move_lan(lan)
            .or_else(|| current.make_move_lan(&format!("{lan}q")));

        match next {
            Some(next) => {
                let fen = next.to_fen();
                state.positions.push(next);
                log::debug!("manual move {lan} -> {fen}");
                MoveOutcome::Applied(fen)
            }
            None => {
                log::warn!("rejected manual move {lan:?}");
                MoveOutcome::Rejected
            }
        }
    }

    /// Append the result of `mv`, which must be legal in the current position.
    /// An illegal move is a broken engine contract and is reported as the
    /// fatal `SessionError::EngineContract`.
    pub fn apply_engine_move(&self, mv: ChessMove) -> SessionResult<String> {
        self.lock().apply_engine_move(mv)
    }

    /// Let the engine play one move for the side to move, yielding the thread
    /// periodically while it searches.
    ///
    /// Blocks until the search finishes; the session lock is held throughout.
    /// Calling this again on the same session before it returns (for example
    /// from a yield hook) deadlocks and is not allowed. To abort a search,
    /// cancel `cancel` from another thread.
    pub fn request_ai_move(&self, cancel: &CancellationToken) -> SessionResult<AiMoveOutcome> {
        self.request_ai_move_with_hook(cancel, &mut ThreadYield)
    }

    /// As [`Self::request_ai_move`], with a caller-supplied yield hook.
    pub fn request_ai_move_with_hook(
        &self,
        cancel: &CancellationToken,
        hook: &mut dyn YieldHook,
    ) -> SessionResult<AiMoveOutcome> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let result = TerminalStateClassifier::result(state.current());
        if result.is_over() {
            log::debug!("AI move requested in finished game ({result})");
            return Ok(AiMoveOutcome::GameOver(result));
        }

        let coordinator = state.config.coordinator();
        let outcome =
            coordinator.request_move(&mut state.engine, &state.positions, cancel, hook)?;

        match outcome {
            SearchOutcome::Move(mv) => {
                let fen = state.apply_engine_move(mv)?;
                log::info!(
                    "{} played {}",
                    state.engine.name(),
                    move_to_long_algebraic(&mv)
                );
                Ok(AiMoveOutcome::Moved { mv, fen })
            }
            SearchOutcome::Cancelled => Ok(AiMoveOutcome::Cancelled),
        }
    }

    /// Drop the last position. The starting position is never removed.
    pub fn undo(&self) -> bool {
        let mut state = self.lock();
        if state.positions.len() > 1 {
            state.positions.pop();
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> P {
        self.lock().current().clone()
    }

    pub fn history(&self) -> Vec<P> {
        self.lock().positions.clone()
    }

    pub fn current_fen(&self) -> String {
        self.lock().current().to_fen()
    }

    pub fn white_to_move(&self) -> bool {
        self.lock().current().white_to_move()
    }

    pub fn is_over(&self) -> bool {
        TerminalStateClassifier::is_over(self.lock().current())
    }

    pub fn result(&self) -> GameResult {
        TerminalStateClassifier::result(self.lock().current())
    }

    /// Half-moves played since the starting position.
    pub fn ply_count(&self) -> usize {
        self.lock().positions.len() - 1
    }

    pub fn config(&self) -> SessionConfig {
        self.lock().config
    }

    /// Set a session option, or forward an unknown name to the engine.
    pub fn set_option(&self, name: &str, value: &str) -> SessionResult<()> {
        let mut state = self.lock();
        match state.config.set_option(name, value) {
            Err(SessionError::UnknownOption { .. }) => state
                .engine
                .set_option(name, value)
                .map_err(SessionError::EngineOption),
            other => other,
        }
    }

    /// Write the formatted move list to `log_id` and the score-sheet result to
    /// `result_id`. A missing target is logged and ends the render.
    pub fn render_log<S: GameLogSink + ?Sized>(
        &self,
        sink: &mut S,
        log_id: &str,
        result_id: &str,
    ) -> SessionResult<()> {
        let state = self.lock();

        if !sink.has_target(log_id) {
            log::warn!("render_log: {log_id} not found");
            return Ok(());
        }

        let formatter = NotationFormatter::new(state.config.notation_style);
        let tokens = formatter.format_all(&state.positions)?;
        let moves: Vec<LoggedMove> = state
            .positions
            .iter()
            .zip(tokens)
            .map(|(before, text)| {
                LoggedMove::new(before.fullmove_number(), before.side_to_move(), text)
            })
            .collect();
        sink.write_moves(log_id, &moves);

        if !sink.has_target(result_id) {
            log::warn!("render_log: {result_id} not found");
            return Ok(());
        }
        let result = TerminalStateClassifier::result(state.current());
        sink.write_result(result_id, result.score_text());
        Ok(())
    }

    pub fn export_pgn(&self) -> SessionResult<String> {
        self.export_pgn_with_headers(&PgnHeaders::default())
    }

    pub fn export_pgn_with_headers(&self, headers: &PgnHeaders) -> SessionResult<String> {
        let state = self.lock();
        let result = TerminalStateClassifier::result(state.current());
        Ok(write_pgn(&state.positions, result, headers)?)
    }

    pub fn render_board(&self) -> String {
        render_game_state(self.lock().current())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::{AiMoveOutcome, GameSession, MoveOutcome};
    use crate::engines::engine_iterative::IterativeEngine;
    use crate::engines::engine_random::RandomEngine;
    use crate::engines::engine_trait::{SearchEngine, SearchInfo, SearchRequest, SearchResult};
    use crate::errors::{CoordinatorError, EngineResult, SessionError};
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::session::log_sink::GameLogSink;
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::game_state::game_state::GameState;
    use crate::game_state::position::Position;
    use crate::notation::terminal_state::GameResult;
    use crate::search::cancellation::CancellationToken;
    use crate::search::search_coordinator::NoYield;
    use crate::session::log_sink::TextLogSink;

    fn random_session() -> GameSession<GameState, RandomEngine> {
        GameSession::new(RandomEngine)
    }

    /// Engine that claims success without producing a line.
    struct SilentEngine;

    impl SearchEngine<GameState> for SilentEngine {
        fn name(&self) -> &str {
            "silent"
        }

        fn search(
            &mut self,
            _request: SearchRequest<'_, GameState>,
            _progress: &mut dyn FnMut(&SearchInfo),
        ) -> EngineResult<SearchResult> {
            Ok(SearchResult::default())
        }
    }

    #[test]
    fn initialize_round_trips_fen() {
        let session = random_session();
        assert_eq!(session.current_fen(), STARTING_POSITION_FEN);

        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 3 17";
        assert_eq!(session.initialize(Some(fen)).expect("FEN should load"), fen);
        assert_eq!(session.current_fen(), fen);
        assert!(!session.white_to_move());

        let normalized = session
            .initialize(Some("4k3/8/8/8/8/8/8/4K3 w - -"))
            .expect("short FEN should load");
        assert_eq!(normalized, "4k3/8/8/8/8/8/8/4K3 w - - 0 1");

        assert_eq!(
            session.initialize(None).expect("start should load"),
            STARTING_POSITION_FEN
        );
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn malformed_fen_keeps_history() {
        let session = random_session();
        assert!(matches!(session.apply_manual_move("e2e4"), MoveOutcome::Applied(_)));
        let before = session.current_fen();

        let err = session
            .initialize(Some("not a fen"))
            .expect_err("garbage FEN should be rejected");
        assert!(matches!(err, SessionError::InvalidFen(_)));
        assert!(!err.is_fatal());
        assert_eq!(session.current_fen(), before);
        assert_eq!(session.ply_count(), 1);
    }

    #[test]
    fn undo_restores_prior_fen_after_manual_move() {
        let session = random_session();
        let before = session.current_fen();
        let MoveOutcome::Applied(after) = session.apply_manual_move("e2e4") else {
            panic!("e2e4 should be legal");
        };
        assert_ne!(after, before);
        assert!(!session.white_to_move());

        assert!(session.undo());
        assert_eq!(session.current_fen(), before);
        assert!(!session.undo());
        assert_eq!(session.current_fen(), before);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn illegal_moves_never_change_history() {
        let session = random_session();
        for lan in ["e2e5", "e7e5", "", "zz", "e2e4e4", "a1a1"] {
            assert_eq!(session.apply_manual_move(lan), MoveOutcome::Rejected);
            assert_eq!(session.ply_count(), 0);
        }
    }

    #[test]
    fn missing_promotion_letter_promotes_to_queen() {
        let session = random_session();
        session
            .initialize(Some("4k3/P7/8/8/8/8/8/4K3 w - - 0 1"))
            .expect("FEN should load");
        assert!(matches!(session.apply_manual_move("a7a8"), MoveOutcome::Applied(_)));
        assert_eq!(
            session.current().piece_on(56),
            Some((Color::Light, PieceKind::Queen))
        );

        session.undo();
        assert!(matches!(session.apply_manual_move("a7a8n"), MoveOutcome::Applied(_)));
        assert_eq!(
            session.current().piece_on(56),
            Some((Color::Light, PieceKind::Knight))
        );
    }

    #[test]
    fn undo_restores_prior_fen_after_ai_move() {
        let session = random_session();
        session.apply_manual_move("d2d4");
        let before = session.current_fen();

        let outcome = session
            .request_ai_move(&CancellationToken::new())
            .expect("random engine should move");
        let AiMoveOutcome::Moved { fen, .. } = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(fen, session.current_fen());
        assert!(session.white_to_move());

        session.undo();
        assert_eq!(session.current_fen(), before);
    }

    #[test]
    fn iterative_engine_moves_within_budget() {
        let session: GameSession<GameState, IterativeEngine> =
            GameSession::new(IterativeEngine::default());
        session.set_option("MoveTime", "50").expect("MoveTime should apply");
        session.set_option("MaxDepth", "3").expect("MaxDepth should apply");

        let outcome = session
            .request_ai_move_with_hook(&CancellationToken::new(), &mut NoYield)
            .expect("iterative engine should move");
        assert!(matches!(outcome, AiMoveOutcome::Moved { .. }));
        assert_eq!(session.ply_count(), 1);
    }

    #[test]
    fn cancelled_token_leaves_history_untouched() {
        let session = random_session();
        let before = session.current_fen();
        let outcome = session
            .request_ai_move(&CancellationToken::cancelled())
            .expect("cancellation is not an error");
        assert_eq!(outcome, AiMoveOutcome::Cancelled);
        assert_eq!(session.current_fen(), before);
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn search_can_be_cancelled_from_another_thread() {
        let session: GameSession<GameState, IterativeEngine> =
            GameSession::new(IterativeEngine::default());
        session.set_option("MoveTime", "60000").expect("MoveTime should apply");
        let cancel = CancellationToken::new();

        let outcome = thread::scope(|scope| {
            let remote = cancel.clone();
            scope.spawn(move || {
                thread::sleep(Duration::from_millis(50));
                remote.cancel();
            });
            session.request_ai_move(&cancel)
        })
        .expect("cancellation is not an error");

        assert_eq!(outcome, AiMoveOutcome::Cancelled);
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn finished_game_reports_result_instead_of_searching() {
        let session = GameSession::<GameState, _>::new(SilentEngine);
        session
            .initialize(Some("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"))
            .expect("FEN should load");
        assert!(session.is_over());
        let outcome = session
            .request_ai_move(&CancellationToken::new())
            .expect("finished game is not an error");
        assert_eq!(outcome, AiMoveOutcome::GameOver(GameResult::Draw));
    }

    #[test]
    fn empty_main_line_is_fatal_and_leaves_history() {
        let session = GameSession::<GameState, _>::new(SilentEngine);
        let err = session
            .request_ai_move(&CancellationToken::new())
            .expect_err("silent engine breaks the contract");
        assert_eq!(err, SessionError::Coordinator(CoordinatorError::EmptyMainLine));
        assert!(err.is_fatal());
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn illegal_engine_move_is_fatal() {
        let session = random_session();
        let black_move = GameState::new_game()
            .make_move_lan("e2e4")
            .expect("e2e4 should be legal")
            .generate_legal_moves()[0];
        let err = session
            .apply_engine_move(black_move)
            .expect_err("black move is illegal for white");
        assert!(matches!(err, SessionError::EngineContract(_)));
        assert!(err.is_fatal());
        assert_eq!(session.ply_count(), 0);

        let legal = GameState::new_game().generate_legal_moves()[0];
        session.apply_engine_move(legal).expect("legal move should apply");
        assert_eq!(session.ply_count(), 1);
    }

    #[test]
    fn render_log_writes_moves_and_result() {
        let session = random_session();
        for lan in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            session.apply_manual_move(lan);
        }

        let mut sink = TextLogSink::with_targets(["moves", "score"]);
        session
            .render_log(&mut sink, "moves", "score")
            .expect("render should succeed");
        assert_eq!(sink.text("moves"), Some("1. f3 e5\n2. g4 ♛h4#"));
        assert_eq!(sink.text("score"), Some("0-1"));

        session.set_option("Notation", "letters").expect("Notation should apply");
        session.undo();
        session
            .render_log(&mut sink, "moves", "score")
            .expect("render should succeed");
        assert_eq!(sink.text("moves"), Some("1. f3 e5\n2. g4"));
        assert_eq!(sink.text("score"), Some(""));
    }

    #[test]
    fn render_log_stops_at_missing_target() {
        let session = random_session();
        session.apply_manual_move("e2e4");

        let mut sink = TextLogSink::with_targets(["score"]);
        sink.write_result("score", "stale");
        session
            .render_log(&mut sink, "moves", "score")
            .expect("missing target is not an error");
        assert_eq!(sink.text("score"), Some("stale"));

        let mut sink = TextLogSink::with_targets(["moves"]);
        session
            .render_log(&mut sink, "moves", "score")
            .expect("missing target is not an error");
        assert_eq!(sink.text("moves"), Some("1. e4"));
    }

    #[test]
    fn options_reach_session_and_engine() {
        let session: GameSession<GameState, IterativeEngine> =
            GameSession::new(IterativeEngine::new(4));
        session.set_option("YieldInterval", "8").expect("YieldInterval should apply");
        assert_eq!(session.config().yield_interval, 8);

        session.set_option("Depth", "2").expect("engine option should apply");
        let err = session
            .set_option("Ponder", "true")
            .expect_err("unknown option should fail");
        assert!(matches!(err, SessionError::EngineOption(_)));
    }

    #[test]
    fn engine_depth_option_bounds_session_search() {
        let session: GameSession<GameState, IterativeEngine> =
            GameSession::new(IterativeEngine::default());
        session.set_option("MoveTime", "100000").expect("MoveTime should apply");
        session.set_option("YieldInterval", "1").expect("YieldInterval should apply");
        session.set_option("Depth", "1").expect("engine depth should apply");

        let cancel = CancellationToken::new();
        let watchdog = cancel.clone();
        let mut deepest = 0u8;
        let outcome = session
            .request_ai_move_with_hook(&cancel, &mut |info: &SearchInfo| {
                deepest = deepest.max(info.depth);
                if info.depth > 1 {
                    watchdog.cancel();
                }
            })
            .expect("search should succeed");

        assert!(matches!(outcome, AiMoveOutcome::Moved { .. }));
        assert_eq!(deepest, 1);

        session.set_option("MaxDepth", "2").expect("session cap should apply");
        assert_eq!(session.config().search_limits().depth, Some(2));
    }

    #[test]
    fn en_passant_target_without_pushed_pawn_is_rejected() {
        let session = random_session();
        let err = session
            .initialize(Some("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1"))
            .expect_err("target without a pushed pawn should be rejected");
        assert!(matches!(err, SessionError::InvalidFen(_)));
        assert_eq!(session.current_fen(), STARTING_POSITION_FEN);

        session
            .initialize(Some("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1"))
            .expect("real en-passant target should load");
        let captures = session
            .current()
            .generate_legal_moves()
            .into_iter()
            .filter(|mv| mv.to == 43)
            .count();
        assert_eq!(captures, 1);
    }

    #[test]
    fn pgn_and_board_views() {
        let session = random_session();
        session.apply_manual_move("e2e4");
        let pgn = session.export_pgn().expect("PGN should export");
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.ends_with("1. e4 *\n"));

        let board = session.render_board();
        assert!(board.ends_with("black to move"));
    }

    #[test]
    fn session_is_shareable_between_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<GameSession<GameState, IterativeEngine>>();
    }
}
