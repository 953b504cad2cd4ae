//! Error types shared by the position, search and engine layers.
//!
//! Rejected moves are ordinary, recoverable results: the position they were
//! submitted to is never modified. Invariant violations indicate a bug in move
//! application or a corrupted setup and are meant to stop the caller.

use thiserror::Error;

use crate::moves::chess_move::Move;

pub type ChessResult<T> = Result<T, ChessError>;

/// Why a submitted move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no piece on the origin square")]
    EmptyOrigin,
    #[error("origin piece does not belong to the side to move")]
    WrongSide,
    #[error("destination is not a legal move for that piece")]
    IllegalDestination,
    #[error("the game is already over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("rejected move {mv}: {reason}")]
    RejectedMove { mv: Move, reason: RejectReason },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    #[error("invalid value '{value}' for option {name}")]
    InvalidOption { name: String, value: String },

    #[error("no legal move available")]
    NoLegalMoves,

    #[error("thread pool: {0}")]
    ThreadPool(String),
}

impl ChessError {
    #[inline]
    pub fn rejected(mv: Move, reason: RejectReason) -> Self {
        ChessError::RejectedMove { mv, reason }
    }

    #[inline]
    pub fn is_rejected_move(&self) -> bool {
        matches!(self, ChessError::RejectedMove { .. })
    }

    #[inline]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ChessError::InvariantViolation(_))
    }
}
