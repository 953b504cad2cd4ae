//! King-safety terms.
//!
//! Outside the endgame a king is penalised for standing near the centre and
//! for enemy pieces close by that hit its zone, and rewarded for a pawn
//! shield. In the endgame only the king's safe mobility counts.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::attack_set;
use crate::moves::attack_tables::king_attacks;
use crate::moves::chess_move::Move;
use crate::search::board_scoring::EvaluatorWeights;

const CENTER: [(u8, u8); 4] = [(3, 3), (4, 3), (3, 4), (4, 4)];

/// Manhattan distance from `square` to the nearest of d4, e4, d5, e5.
#[inline]
pub fn center_distance(square: Square) -> u8 {
    CENTER
        .iter()
        .map(|&(file, rank)| square.file().abs_diff(file) + square.rank().abs_diff(rank))
        .min()
        .unwrap_or(0)
}

/// Enemy non-king pieces within two squares of `color`'s king that attack the
/// king or one of its neighbouring squares.
pub fn nearby_attackers(position: &Position, color: Color) -> u32 {
    let king = position.king_square(color);
    let zone = king_attacks(king) | king.bit();
    let enemy = color.opposite();
    let occupied = position.occupied();

    PieceKind::ALL
        .into_iter()
        .filter(|&kind| kind != PieceKind::King)
        .flat_map(|kind| {
            squares_of(position.pieces(enemy, kind)).map(move |square| (Piece::new(kind, enemy), square))
        })
        .filter(|&(piece, square)| {
            square.distance(king) <= 2 && attack_set(piece, square, occupied) & zone != 0
        })
        .count() as u32
}

/// True when a friendly pawn stands directly in front of the king and is the
/// only friendly pawn on its file.
pub fn has_pawn_shield(position: &Position, color: Color) -> bool {
    let pawns = position.pieces(color, PieceKind::Pawn);
    let king = position.king_square(color);
    king.offset(0, color.forward()).is_some_and(|front| {
        let on_file = squares_of(pawns).filter(|sq| sq.file() == front.file()).count();
        pawns & front.bit() != 0 && on_file == 1
    })
}

/// King safety of `color` in millipawns; positive is good for `color`.
///
/// `own_moves` are `color`'s legal moves, used for endgame king mobility.
pub fn king_safety_score(
    position: &Position,
    color: Color,
    weights: &EvaluatorWeights,
    endgame: bool,
    own_moves: &[Move],
) -> i32 {
    let king = position.king_square(color);

    if endgame {
        let steps = own_moves
            .iter()
            .filter(|mv| mv.from == king && mv.from.distance(mv.to) == 1)
            .count() as i32;
        return weights.king_endgame_mobility * steps;
    }

    let centralization = 2 - i32::from(center_distance(king).min(2));
    let shield = if has_pawn_shield(position, color) {
        weights.king_shield
    } else {
        0
    };

    shield
        - weights.king_center * centralization
        - weights.king_attacker * nearby_attackers(position, color) as i32
}
