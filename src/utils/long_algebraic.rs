//! Long algebraic move text (`e2e4`, `e7e8q`).
//!
//! Parsing is context-free; [`resolve_long_algebraic`] additionally checks the
//! text against a position and fills in the default queen promotion.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{PieceKind, Position};
use crate::moves::chess_move::Move;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

pub fn move_to_long_algebraic(mv: Move) -> String {
    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(mv.from));
    out.push_str(&square_to_algebraic(mv.to));
    if let Some(promotion) = mv.promotion {
        out.push(promotion.letter());
    }
    out
}

pub fn parse_long_algebraic(text: &str) -> ChessResult<Move> {
    let text = text.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessError::InvalidMoveText(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])
        .map_err(|_| ChessError::InvalidMoveText(text.to_owned()))?;
    let to = algebraic_to_square(&text[2..4])
        .map_err(|_| ChessError::InvalidMoveText(text.to_owned()))?;

    let promotion = match text[4..].chars().next() {
        None => None,
        Some(ch) => Some(char_to_promotion(ch).ok_or_else(|| {
            ChessError::InvalidMoveText(format!("{text}: invalid promotion piece '{ch}'"))
        })?),
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Parse move text and check it against the pieces of `position`.
///
/// The origin must hold a piece of the side to move. A pawn reaching the last
/// rank without a promotion letter promotes to a queen. Whether the move is
/// legal is left to `Position::apply_move`.
pub fn resolve_long_algebraic(text: &str, position: &Position) -> ChessResult<Move> {
    let mv = parse_long_algebraic(text)?;
    let piece = position
        .piece_at(mv.from)
        .ok_or_else(|| ChessError::InvalidMoveText(format!("{text}: no piece on {}", mv.from)))?;

    if piece.color != position.side_to_move() {
        return Err(ChessError::InvalidMoveText(format!(
            "{text}: piece on {} does not belong to the side to move",
            mv.from
        )));
    }

    let reaches_last_rank =
        piece.kind == PieceKind::Pawn && mv.to.rank() == piece.color.promotion_rank();
    match (reaches_last_rank, mv.promotion) {
        (true, None) => Ok(Move::with_promotion(mv.from, mv.to, PieceKind::Queen)),
        (false, Some(_)) => Err(ChessError::InvalidMoveText(format!(
            "{text}: only a pawn reaching the last rank may promote"
        ))),
        _ => Ok(mv),
    }
}

fn char_to_promotion(ch: char) -> Option<PieceKind> {
    match PieceKind::from_letter(ch)? {
        kind @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen) => {
            Some(kind)
        }
        _ => None,
    }
}
