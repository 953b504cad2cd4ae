use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// Squares a piece on `square` attacks given `occupancy`. Slider rays include
/// their first blocker of either color.
#[inline]
pub fn attack_set(piece: Piece, square: Square, occupancy: Bitboard) -> Bitboard {
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(piece.color, square),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, occupancy),
        PieceKind::Rook => rook_attacks(square, occupancy),
        PieceKind::Queen => queen_attacks(square, occupancy),
        PieceKind::King => king_attacks(square),
    }
}

pub fn is_square_attacked(position: &Position, square: Square, attacker_color: Color) -> bool {
    attackers_to_square_with(position, square, attacker_color, position.occupied()) != 0
}

/// Squares of `attacker_color` pieces that reach `square`.
#[inline]
pub fn attackers_to_square(position: &Position, square: Square, attacker_color: Color) -> Bitboard {
    attackers_to_square_with(position, square, attacker_color, position.occupied())
}

/// Same as [`attackers_to_square`] with a caller-provided occupancy, e.g. with
/// a moving king lifted off the board.
pub fn attackers_to_square_with(
    position: &Position,
    square: Square,
    attacker_color: Color,
    occupancy: Bitboard,
) -> Bitboard {
    let by = |kind: PieceKind| position.pieces(attacker_color, kind);
    let diagonal = by(PieceKind::Bishop) | by(PieceKind::Queen);
    let orthogonal = by(PieceKind::Rook) | by(PieceKind::Queen);

    // A pawn of `attacker_color` attacks `square` iff a defender pawn on
    // `square` would attack the pawn's square.
    (pawn_attacks(attacker_color.opposite(), square) & by(PieceKind::Pawn))
        | (knight_attacks(square) & by(PieceKind::Knight))
        | (king_attacks(square) & by(PieceKind::King))
        | (bishop_attacks(square, occupancy) & diagonal)
        | (rook_attacks(square, occupancy) & orthogonal)
}

/// Recompute the per-color attacker and defender caches.
///
/// `attackers[c]` holds the opposing pieces that reach `c`'s king.
/// `defenders[c]` holds `c`'s pieces that protect one of `c`'s own pieces
/// currently attacking the opposing king.
pub fn refresh_check_caches(position: &mut Position) {
    for color in Color::BOTH {
        let king = position.king_squares[color.index()];
        position.attackers[color.index()] = attackers_to_square(position, king, color.opposite());
    }

    for color in Color::BOTH {
        let checkers = position.attackers[color.opposite().index()];
        position.defenders[color.index()] = squares_of(checkers)
            .fold(0u64, |acc, checker| acc | attackers_to_square(position, checker, color));
    }
}
