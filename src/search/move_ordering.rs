//! Static move ordering for alpha-beta.
//!
//! Moves are bucketed by what they do on the board and stably sorted, so
//! moves inside a bucket keep generation order.

use crate::errors::ChessResult;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::{attack_set, is_square_attacked};
use crate::moves::chess_move::Move;

/// Ordering bucket; earlier variants are searched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MoveClass {
    Capture,
    Check,
    /// The moved piece attacks an undefended enemy piece other than the king.
    Threat,
    Quiet,
}

/// Bucket of `mv`, played on `scratch` and taken back before returning.
pub fn classify_move(scratch: &mut Position, mv: Move) -> ChessResult<MoveClass> {
    let mover = scratch.side_to_move();
    let enemy = mover.opposite();
    let undo = scratch.make_move(mv)?;

    let class = if undo.is_capture() {
        MoveClass::Capture
    } else if scratch.is_in_check(enemy) {
        MoveClass::Check
    } else {
        let piece = Piece::new(undo.placed_piece, mover);
        let targets = attack_set(piece, mv.to, scratch.occupied())
            & scratch.occupancy(enemy)
            & !scratch.pieces(enemy, PieceKind::King);
        if squares_of(targets).any(|target| !is_square_attacked(scratch, target, enemy)) {
            MoveClass::Threat
        } else {
            MoveClass::Quiet
        }
    };

    scratch.unmake_move(undo);
    Ok(class)
}

/// `moves` of the side to move, reordered captures first, then checks, then
/// threats, then everything else.
pub fn order_moves(position: &Position, moves: Vec<Move>) -> ChessResult<Vec<Move>> {
    let mut scratch = position.clone();
    let mut keyed = moves
        .into_iter()
        .map(|mv| classify_move(&mut scratch, mv).map(|class| (class, mv)))
        .collect::<ChessResult<Vec<_>>>()?;

    keyed.sort_by_key(|&(class, _)| class);
    Ok(keyed.into_iter().map(|(_, mv)| mv).collect())
}
