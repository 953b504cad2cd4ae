//! Canonical chess-rule constants.
//!
//! Static rule literals: the standard starting position and the thresholds of
//! the automatic draw rules.

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-moves without a capture or pawn move that end the game (fifty per side).
pub const FIFTY_MOVE_HALFMOVES: u16 = 100;

/// Occurrences of one position that end the game as a repetition draw.
pub const REPETITION_COUNT: usize = 3;
