//! Full legal move generation pipeline.
//!
//! Collects piece-wise pseudo-legal moves, then plays each one on a single
//! scratch copy of the position and keeps it only if the mover's king is not
//! attacked afterwards. Pins and check evasions need no separate rule: the
//! resulting position is tested exactly.

use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::moves::piece_moves::{generate_pseudo_legal_moves, moves_for_piece};

impl Position {
    /// Legal moves of `color`, in generation order.
    ///
    /// For the side not to move the en-passant target is not offered.
    #[inline]
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        generate_legal_moves(self, color)
    }

    /// True if `color` has at least one legal move.
    pub fn has_legal_move(&self, color: Color) -> bool {
        let mut pseudo = Vec::with_capacity(64);
        generate_pseudo_legal_moves(self, color, &mut pseudo);
        let mut scratch = scratch_for(self, color);
        pseudo.into_iter().any(|mv| leaves_king_safe(&mut scratch, mv, color))
    }
}

pub fn generate_legal_moves(position: &Position, color: Color) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal_moves(position, color, &mut pseudo);

    let mut scratch = scratch_for(position, color);
    pseudo.retain(|&mv| leaves_king_safe(&mut scratch, mv, color));
    pseudo
}

/// Legal moves of the piece on `square`, empty if there is none.
pub fn legal_moves_from(position: &Position, square: Square) -> Vec<Move> {
    let Some(piece) = position.piece_at(square) else {
        return Vec::new();
    };

    let allow_en_passant = piece.color == position.side_to_move();
    let targets = moves_for_piece(position, piece, square, allow_en_passant).targets;
    let mut scratch = scratch_for(position, piece.color);
    let mut legal = Vec::new();

    for to in squares_of(targets) {
        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            legal.extend(
                PieceKind::PROMOTIONS
                    .into_iter()
                    .map(|promotion| Move::with_promotion(square, to, promotion)),
            );
        } else {
            legal.push(Move::new(square, to));
        }
    }

    legal.retain(|&mv| leaves_king_safe(&mut scratch, mv, piece.color));
    legal
}

#[inline]
fn scratch_for(position: &Position, color: Color) -> Position {
    let mut scratch = position.clone();
    scratch.pass_turn_to(color);
    scratch
}

#[inline]
fn leaves_king_safe(scratch: &mut Position, mv: Move, color: Color) -> bool {
    match scratch.make_move(mv) {
        Ok(undo) => {
            let safe = !scratch.is_in_check(color);
            scratch.unmake_move(undo);
            safe
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(moves: &[Move]) -> Vec<String> {
        moves.iter().map(Move::to_string).collect()
    }

    #[test]
    fn start_position_has_twenty_moves_for_both_sides() {
        let position = Position::new_game();
        assert_eq!(position.legal_moves(Color::White).len(), 20);
        assert_eq!(position.legal_moves(Color::Black).len(), 20);
    }

    #[test]
    fn pinned_piece_may_only_move_along_the_pin() {
        // Bishop e2 is pinned by the rook on e8; rook d2 is free.
        let position =
            Position::from_fen("4r1k1/8/8/8/8/8/3RB3/4K3 w - - 0 1").expect("FEN should parse");
        let bishop_moves = legal_moves_from(&position, "e2".parse().expect("e2"));
        assert!(bishop_moves.is_empty());

        let rook_moves = legal_moves_from(&position, "d2".parse().expect("d2"));
        assert!(!rook_moves.is_empty());
    }

    #[test]
    fn check_must_be_answered() {
        let position =
            Position::from_fen("4k3/8/8/8/8/8/3q4/R3K3 w Q - 0 1").expect("FEN should parse");
        let moves = texts(&position.legal_moves(Color::White));
        assert_eq!(moves, vec!["e1f1", "e1d2"]);
    }

    #[test]
    fn en_passant_is_only_offered_to_the_side_to_move() {
        let position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        assert!(texts(&position.legal_moves(Color::White)).contains(&"e5d6".to_owned()));

        let black_to_move =
            Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        assert!(texts(&black_to_move.legal_moves(Color::Black)).contains(&"d4e3".to_owned()));
        assert!(!texts(&black_to_move.legal_moves(Color::White)).is_empty());
    }

    #[test]
    fn en_passant_exposing_the_king_is_illegal() {
        // Capturing on d6 would open the fifth rank to the rook on h5.
        let position =
            Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").expect("FEN should parse");
        assert!(!texts(&position.legal_moves(Color::White)).contains(&"e5d6".to_owned()));
    }

    #[test]
    fn has_legal_move_agrees_with_generation() {
        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(!stalemate.has_legal_move(Color::Black));
        assert!(stalemate.legal_moves(Color::Black).is_empty());
        assert!(Position::new_game().has_legal_move(Color::White));
    }
}
