//! Engine abstraction layer.
//!
//! Defines common input parameters and output payloads so different engine
//! strategies can be selected at runtime behind a single trait interface.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Position;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub nodes: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<Move>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> ChessResult<()> {
        Ok(())
    }

    fn choose_move(&mut self, position: &Position, params: &GoParams) -> ChessResult<EngineOutput>;
}

/// Parses an engine option value, reporting the option by name on failure.
pub(crate) fn parse_option<T: std::str::FromStr>(name: &str, value: &str) -> ChessResult<T> {
    value.trim().parse::<T>().map_err(|_| invalid_option(name, value))
}

/// Accepts the usual spellings of a boolean option.
pub(crate) fn parse_switch(name: &str, value: &str) -> ChessResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid_option(name, value)),
    }
}

pub(crate) fn invalid_option(name: &str, value: &str) -> ChessError {
    ChessError::InvalidOption {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}
