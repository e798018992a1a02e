//! PGN export of a position history.
//!
//! Writes the Seven Tag Roster (plus `SetUp`/`FEN` for games that did not
//! start from the standard position) and letter-style SAN movetext wrapped at
//! 80 columns.

use chrono::{Local, NaiveDate};

use crate::errors::NotationError;
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::position::Position;
use crate::notation::fan::{NotationFormatter, NotationStyle, CHECK_MARKER, EN_PASSANT_MARKER};
use crate::notation::terminal_state::GameResult;

const PGN_LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    pub date: NaiveDate,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnHeaders {
    fn default() -> Self {
        Self {
            event: "Casual Game".to_owned(),
            site: "Local".to_owned(),
            date: Local::now().date_naive(),
            round: "-".to_owned(),
            white: "White".to_owned(),
            black: "Black".to_owned(),
        }
    }
}

pub fn write_pgn<P: Position>(
    positions: &[P],
    result: GameResult,
    headers: &PgnHeaders,
) -> Result<String, NotationError> {
    let mut out = String::new();

    let date = headers.date.format("%Y.%m.%d").to_string();
    let mut tags: Vec<(&str, &str)> = vec![
        ("Event", headers.event.as_str()),
        ("Site", headers.site.as_str()),
        ("Date", date.as_str()),
        ("Round", headers.round.as_str()),
        ("White", headers.white.as_str()),
        ("Black", headers.black.as_str()),
        ("Result", result.pgn_token()),
    ];

    let initial_fen = positions.first().map(Position::to_fen);
    if let Some(fen) = initial_fen.as_deref().filter(|fen| *fen != STARTING_POSITION_FEN) {
        tags.push(("SetUp", "1"));
        tags.push(("FEN", fen));
    }

    for (key, value) in tags {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut tokens = movetext_tokens(positions)?;
    tokens.push(result.pgn_token().to_owned());
    out.push_str(&wrap_tokens(&tokens, PGN_LINE_WIDTH));
    out.push('\n');

    Ok(out)
}

/// Numbered SAN tokens, e.g. `["1.", "e4", "e5", "2.", "Nf3"]`.
fn movetext_tokens<P: Position>(positions: &[P]) -> Result<Vec<String>, NotationError> {
    let formatter = NotationFormatter::new(NotationStyle::Letters);
    let mut tokens = Vec::with_capacity(positions.len() * 3 / 2);

    for (halfmove, before) in positions.iter().enumerate().take(positions.len().saturating_sub(1)) {
        let san = formatter
            .format_history(positions, halfmove)?
            .replace(EN_PASSANT_MARKER, "")
            .replace(CHECK_MARKER, "+");

        if before.white_to_move() {
            tokens.push(format!("{}.", before.fullmove_number()));
        } else if halfmove == 0 {
            tokens.push(format!("{}...", before.fullmove_number()));
        }
        tokens.push(san);
    }

    Ok(tokens)
}

fn wrap_tokens(tokens: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0usize;

    for token in tokens {
        let token_len = token.chars().count();
        if line_len > 0 && line_len + 1 + token_len > width {
            out.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token_len;
    }

    out
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{write_pgn, PgnHeaders};
    use crate::game_state::game_state::GameState;
    use crate::game_state::position::Position;
    use crate::notation::terminal_state::{GameResult, TerminalStateClassifier};

    fn headers() -> PgnHeaders {
        PgnHeaders {
            date: NaiveDate::from_ymd_opt(2024, 3, 9).expect("date should be valid"),
            ..PgnHeaders::default()
        }
    }

    fn play(start: GameState, moves: &[&str]) -> Vec<GameState> {
        let mut history = vec![start];
        for lan in moves {
            let next = history
                .last()
                .and_then(|p| p.make_move_lan(lan))
                .expect("scripted move should be legal");
            history.push(next);
        }
        history
    }

    #[test]
    fn fools_mate_exports_seven_tag_roster_and_movetext() {
        let history = play(GameState::new_game(), &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let result = TerminalStateClassifier::result(history.last().expect("history is non-empty"));
        let pgn = write_pgn(&history, result, &headers()).expect("PGN should write");

        assert_eq!(
            pgn,
            "[Event \"Casual Game\"]\n\
             [Site \"Local\"]\n\
             [Date \"2024.03.09\"]\n\
             [Round \"-\"]\n\
             [White \"White\"]\n\
             [Black \"Black\"]\n\
             [Result \"0-1\"]\n\
             \n\
             1. f3 e5 2. g4 Qh4# 0-1\n"
        );
    }

    #[test]
    fn custom_start_adds_setup_and_black_ellipsis() {
        let start = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").expect("FEN should parse");
        let history = play(start, &["e8d7", "e2e4"]);
        let pgn = write_pgn(&history, GameResult::InProgress, &headers()).expect("PGN should write");

        assert!(pgn.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]\n"));
        assert!(pgn.ends_with("\n12... Kd7 13. e4 *\n"));
    }

    #[test]
    fn en_passant_marker_is_dropped() {
        let start = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let history = play(start, &["e5d6", "e8d8", "e1e2"]);
        let pgn = write_pgn(&history, GameResult::InProgress, &headers()).expect("PGN should write");
        assert!(pgn.ends_with("\n1. exd6 Kd8 2. Ke2 *\n"));
    }

    #[test]
    fn checks_use_plus() {
        let history = play(GameState::new_game(), &["e2e4", "f7f6", "d1h5"]);
        let pgn = write_pgn(&history, GameResult::InProgress, &headers()).expect("PGN should write");
        assert!(pgn.ends_with("\n1. e4 f6 2. Qh5+ *\n"));
    }

    #[test]
    fn long_games_wrap_at_eighty_columns() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let moves: Vec<&str> = shuffle.iter().copied().cycle().take(80).collect();
        let history = play(GameState::new_game(), &moves);
        let pgn = write_pgn(&history, GameResult::InProgress, &headers()).expect("PGN should write");

        let movetext = pgn.split("\n\n").nth(1).expect("movetext follows the headers");
        assert!(movetext.lines().count() > 1);
        assert!(movetext.lines().all(|line| line.chars().count() <= 80));
    }
}
