//! Presentation sinks for the move log and the result line.

use std::collections::BTreeMap;

use crate::game_state::chess_types::Color;

pub const WHITE_MOVE_STYLE: &str = "gamelog-whitemove";
pub const BLACK_MOVE_STYLE: &str = "gamelog-blackmove";

/// One formatted half-move ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMove {
    /// Move-pair number, starting at 1.
    pub move_number: u32,
    pub color: Color,
    pub text: String,
    pub style_hint: &'static str,
}

impl LoggedMove {
    pub fn new(move_number: u32, color: Color, text: String) -> Self {
        let style_hint = match color {
            Color::Light => WHITE_MOVE_STYLE,
            Color::Dark => BLACK_MOVE_STYLE,
        };
        Self {
            move_number,
            color,
            text,
            style_hint,
        }
    }
}

/// Named output targets a session renders into.
pub trait GameLogSink {
    fn has_target(&self, target: &str) -> bool;

    /// Replace the contents of `target` with `moves`.
    fn write_moves(&mut self, target: &str, moves: &[LoggedMove]);

    /// Replace the contents of `target` with the score-sheet result text.
    fn write_result(&mut self, target: &str, result: &str);
}

/// In-memory sink holding one text buffer per registered target.
///
/// Moves render one move pair per line (`1. e4 e5`); a log that starts with a
/// black move opens with `1... e5`.
#[derive(Debug, Clone, Default)]
pub struct TextLogSink {
    targets: BTreeMap<String, String>,
}

impl TextLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: names
                .into_iter()
                .map(|name| (name.into(), String::new()))
                .collect(),
        }
    }

    pub fn add_target(&mut self, name: impl Into<String>) {
        self.targets.entry(name.into()).or_default();
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.targets.get(target).map(String::as_str)
    }
}

impl GameLogSink for TextLogSink {
    fn has_target(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    fn write_moves(&mut self, target: &str, moves: &[LoggedMove]) {
        let Some(buffer) = self.targets.get_mut(target) else {
            return;
        };
        buffer.clear();
        for (index, logged) in moves.iter().enumerate() {
            match logged.color {
                Color::Light => {
                    if index > 0 {
                        buffer.push('\n');
                    }
                    buffer.push_str(&format!("{}. {}", logged.move_number, logged.text));
                }
                Color::Dark if index == 0 => {
                    buffer.push_str(&format!("{}... {}", logged.move_number, logged.text));
                }
                Color::Dark => {
                    buffer.push(' ');
                    buffer.push_str(&logged.text);
                }
            }
        }
    }

    fn write_result(&mut self, target: &str, result: &str) {
        if let Some(buffer) = self.targets.get_mut(target) {
            buffer.clear();
            buffer.push_str(result);
        }
    }
}
