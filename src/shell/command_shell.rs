//! Line-oriented stdio front-end for a game session.
//!
//! Each input line is one command; each command writes one or more response
//! lines. A fatal session error ends the loop.

use std::io::{self, BufRead, Write};

use crate::engines::engine_iterative::IterativeEngine;
use crate::engines::engine_trait::SearchEngine;
use crate::errors::SessionError;
use crate::game_state::game_state::GameState;
use crate::game_state::position::Position;
use crate::search::cancellation::CancellationToken;
use crate::session::game_session::{AiMoveOutcome, GameSession, MoveOutcome};
use crate::session::log_sink::TextLogSink;
use crate::session::session_config::SessionConfig;

pub const DEFAULT_LOG_TARGET: &str = "log";
pub const DEFAULT_RESULT_TARGET: &str = "result";

const HELP_TEXT: &str = "\
commands:
  init [fen]                    start a new game
  move <lan>                    play a move, e.g. e2e4 or e7e8n
  aimove                        let the engine move
  undo                          take back the last half-move
  fen | whitesmove | isover     query the current position
  result                        game result
  log [log_id result_id]        move list and score
  pgn                           export the game as PGN
  board                         draw the board
  setoption name <n> value <v>  MoveTime, Nodes, MaxDepth, YieldInterval, Notation, Depth
  quit";

#[derive(Debug)]
pub enum ShellControl {
    Continue,
    Quit,
    /// The session hit a contract violation and must not continue.
    Fatal(SessionError),
}

pub struct CommandShell<P: Position, E: SearchEngine<P>> {
    session: GameSession<P, E>,
    sink: TextLogSink,
}

impl<P: Position, E: SearchEngine<P>> CommandShell<P, E> {
    pub fn new(session: GameSession<P, E>) -> Self {
        Self {
            session,
            sink: TextLogSink::with_targets([DEFAULT_LOG_TARGET, DEFAULT_RESULT_TARGET]),
        }
    }

    pub fn session(&self) -> &GameSession<P, E> {
        &self.session
    }

    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<ShellControl> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(ShellControl::Continue);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "init" => {
                let fen = parts.collect::<Vec<_>>().join(" ");
                match self.session.initialize(Some(&fen)) {
                    Ok(fen) => writeln!(out, "{fen}")?,
                    Err(err) => writeln!(out, "error: {err}")?,
                }
            }
            "move" => match parts.next().map(|lan| self.session.apply_manual_move(lan)) {
                Some(MoveOutcome::Applied(fen)) => writeln!(out, "{fen}")?,
                Some(MoveOutcome::Rejected) | None => writeln!(out, "rejected")?,
            },
            "aimove" => match self.session.request_ai_move(&CancellationToken::new()) {
                Ok(AiMoveOutcome::Moved { fen, .. }) => writeln!(out, "{fen}")?,
                Ok(AiMoveOutcome::Cancelled) => writeln!(out, "cancelled")?,
                Ok(AiMoveOutcome::GameOver(result)) => writeln!(out, "game over {result}")?,
                Err(err) => return self.report_error(err, out),
            },
            "undo" => {
                self.session.undo();
                writeln!(out, "{}", self.session.current_fen())?;
            }
            "fen" => writeln!(out, "{}", self.session.current_fen())?,
            "whitesmove" => writeln!(out, "{}", self.session.white_to_move())?,
            "isover" => writeln!(out, "{}", self.session.is_over())?,
            "result" => writeln!(out, "{}", self.session.result())?,
            "log" => {
                let log_id = parts.next().unwrap_or(DEFAULT_LOG_TARGET);
                let result_id = parts.next().unwrap_or(DEFAULT_RESULT_TARGET);
                if let Err(err) = self.session.render_log(&mut self.sink, log_id, result_id) {
                    return self.report_error(err, out);
                }
                for target in [log_id, result_id] {
                    if let Some(text) = self.sink.text(target).filter(|text| !text.is_empty()) {
                        writeln!(out, "{text}")?;
                    }
                }
            }
            "pgn" => match self.session.export_pgn() {
                Ok(pgn) => write!(out, "{pgn}")?,
                Err(err) => return self.report_error(err, out),
            },
            "board" => writeln!(out, "{}", self.session.render_board())?,
            "setoption" => {
                let (name, value) = parse_setoption(trimmed);
                match self.session.set_option(&name, &value) {
                    Ok(()) => writeln!(out, "ok")?,
                    Err(err) => writeln!(out, "error: {err}")?,
                }
            }
            "help" => writeln!(out, "{HELP_TEXT}")?,
            "quit" | "exit" => return Ok(ShellControl::Quit),
            _ => writeln!(out, "unknown command: {cmd}")?,
        }

        Ok(ShellControl::Continue)
    }

    fn report_error(&self, err: SessionError, out: &mut impl Write) -> io::Result<ShellControl> {
        if err.is_fatal() {
            log::error!("fatal session error: {err}");
            writeln!(out, "fatal: {err}")?;
            Ok(ShellControl::Fatal(err))
        } else {
            writeln!(out, "error: {err}")?;
            Ok(ShellControl::Continue)
        }
    }
}

/// Split `setoption name <words> value <words>` into its name and value.
fn parse_setoption(line: &str) -> (String, String) {
    let mut name_tokens = Vec::<&str>::new();
    let mut value_tokens = Vec::<&str>::new();
    let mut mode = "";

    for tok in line.split_whitespace().skip(1) {
        match tok {
            "name" => mode = "name",
            "value" => mode = "value",
            _ if mode == "name" => name_tokens.push(tok),
            _ if mode == "value" => value_tokens.push(tok),
            _ => {}
        }
    }

    (name_tokens.join(" "), value_tokens.join(" "))
}

/// Run the shell on stdin/stdout with the iterative engine until `quit`,
/// end of input or a fatal error.
pub fn run_stdio_loop(config: SessionConfig) -> io::Result<()> {
    let session: GameSession<GameState, IterativeEngine> =
        GameSession::with_config(IterativeEngine::default(), config);
    let mut shell = CommandShell::new(session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let control = shell.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        match control {
            ShellControl::Continue => {}
            ShellControl::Quit => break,
            ShellControl::Fatal(err) => return Err(io::Error::other(err)),
        }
    }

    Ok(())
}
