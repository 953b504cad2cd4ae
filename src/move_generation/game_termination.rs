//! End-of-game detection.
//!
//! Conditions are tested in a fixed order and the first match wins:
//! checkmate, stalemate, insufficient material, threefold repetition, then
//! the fifty-move rule.

use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_COUNT};
use crate::game_state::chess_types::*;

/// Result of the position for the side to move, if the game has ended.
pub fn classify(position: &Position) -> Option<GameResult> {
    let side = position.side_to_move();
    classify_with_moves(position, position.has_legal_move(side))
}

/// Same as [`classify`] when the caller already knows whether the side to
/// move has a legal move.
pub fn classify_with_moves(position: &Position, side_has_move: bool) -> Option<GameResult> {
    let side = position.side_to_move();

    if !side_has_move {
        return Some(if position.is_in_check(side) {
            GameResult::Checkmate { loser: side }
        } else {
            GameResult::Stalemate
        });
    }
    if is_insufficient_material(position) {
        return Some(GameResult::InsufficientMaterial);
    }
    if repetition_count(position) >= REPETITION_COUNT {
        return Some(GameResult::Repetition);
    }
    if position.halfmove_clock() >= FIFTY_MOVE_HALFMOVES {
        return Some(GameResult::FiftyMoveRule);
    }
    None
}

/// No pawns, rooks or queens, and the minor pieces are one of: none, a single
/// knight, a single bishop, or one bishop per side.
pub fn is_insufficient_material(position: &Position) -> bool {
    let heavy_or_pawns = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen]
        .into_iter()
        .any(|kind| position.count(kind) > 0);
    if heavy_or_pawns {
        return false;
    }

    let knights = position.count(PieceKind::Knight);
    let bishops = position.count(PieceKind::Bishop);
    let white_bishops = position.pieces(Color::White, PieceKind::Bishop).count_ones();

    match (knights, bishops) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (0, 2) => white_bishops == 1,
        _ => false,
    }
}

/// Occurrences of the current position since the last capture or pawn move,
/// the current one included.
pub fn repetition_count(position: &Position) -> usize {
    let key = position.zobrist_key();
    let earlier = position
        .history()
        .iter()
        .rev()
        .take(usize::from(position.halfmove_clock()))
        .filter(|&&previous| previous == key)
        .count();
    earlier + 1
}
