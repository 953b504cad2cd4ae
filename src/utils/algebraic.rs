//! Square and bitboard conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and the internal
//! square/bitboard representations used by FEN and move text.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Bitboard, Square};

/// Convert algebraic notation (for example: "e4") to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    Square::from_coords(file - b'a', rank - b'1')
        .ok_or_else(|| ChessError::InvalidSquare(square.to_owned()))
}

/// Convert a square to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let file_char = char::from(b'a' + square.file());
    let rank_char = char::from(b'1' + square.rank());
    format!("{file_char}{rank_char}")
}

/// Convert a one-hot bitboard to algebraic notation.
pub fn bitboard_to_algebraic(bitboard: Bitboard) -> ChessResult<String> {
    if bitboard.count_ones() != 1 {
        return Err(ChessError::InvalidSquare(format!(
            "bitboard {bitboard:#018x} must hold exactly one square"
        )));
    }
    Ok(square_to_algebraic(Square::from_lowest_bit(bitboard)))
}
