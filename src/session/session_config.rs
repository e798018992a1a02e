//! Run-time tunables for a game session.
//!
//! Options are set by name, the way a UCI `setoption` command would set them.

use std::time::Duration;

use crate::engines::engine_trait::SearchLimits;
use crate::errors::{SessionError, SessionResult};
use crate::notation::fan::NotationStyle;
use crate::search::search_coordinator::SearchCoordinator;

pub const DEFAULT_MOVE_TIME_MS: u64 = 300;
pub const MAX_DEPTH_CAP: u8 = 64;
pub const DEFAULT_YIELD_INTERVAL: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wall-clock budget per AI move.
    pub move_time_ms: u64,
    /// Optional node budget per AI move.
    pub node_limit: Option<u64>,
    /// Depth cap per AI move; `None` leaves depth to the engine.
    pub max_depth: Option<u8>,
    /// Progress reports between two cooperative yields.
    pub yield_interval: u32,
    pub notation_style: NotationStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_time_ms: DEFAULT_MOVE_TIME_MS,
            node_limit: None,
            max_depth: None,
            yield_interval: DEFAULT_YIELD_INTERVAL,
            notation_style: NotationStyle::Figurine,
        }
    }
}

impl SessionConfig {
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            move_time: Some(Duration::from_millis(self.move_time_ms)),
            nodes: self.node_limit,
            depth: self.max_depth,
        }
    }

    pub fn coordinator(&self) -> SearchCoordinator {
        SearchCoordinator::new(self.search_limits(), self.yield_interval)
    }

    /// Set one option by (case-insensitive) name.
    pub fn set_option(&mut self, name: &str, value: &str) -> SessionResult<()> {
        let value = value.trim();
        if name.eq_ignore_ascii_case("MoveTime") {
            self.move_time_ms = parse_number::<u64>(name, value)?.max(1);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Nodes") {
            self.node_limit = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                match parse_number::<u64>(name, value)? {
                    0 => None,
                    limit => Some(limit),
                }
            };
            return Ok(());
        }
        if name.eq_ignore_ascii_case("MaxDepth") {
            self.max_depth = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                match parse_number::<u8>(name, value)? {
                    0 => None,
                    depth => Some(depth.min(MAX_DEPTH_CAP)),
                }
            };
            return Ok(());
        }
        if name.eq_ignore_ascii_case("YieldInterval") {
            self.yield_interval = parse_number::<u32>(name, value)?.max(1);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Notation") {
            self.notation_style =
                NotationStyle::parse(value).ok_or_else(|| invalid_value(name, value))?;
            return Ok(());
        }
        Err(SessionError::UnknownOption {
            name: name.to_owned(),
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> SessionResult<T> {
    value.parse::<T>().map_err(|_| invalid_value(name, value))
}

fn invalid_value(name: &str, value: &str) -> SessionError {
    SessionError::InvalidOptionValue {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}
