//! Per-piece pseudo-legal move generation.
//!
//! Each piece yields its destination squares together with the friendly
//! squares it defends. Own-king safety is not considered here; the legal
//! move generator filters that by playing the move on a scratch position.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::{attack_set, is_square_attacked};
use crate::moves::attack_tables::{king_attacks, pawn_attacks};
use crate::moves::chess_move::Move;

/// Destinations of one piece and the friendly pieces it protects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceMoves {
    pub targets: Bitboard,
    pub defended: Bitboard,
}

/// Pseudo-legal moves of the piece on `square`, `None` if it is empty.
///
/// En passant is only offered when the piece belongs to the side to move.
pub fn piece_moves(position: &Position, square: Square) -> Option<PieceMoves> {
    let piece = position.piece_at(square)?;
    let allow_en_passant = piece.color == position.side_to_move();
    Some(moves_for_piece(position, piece, square, allow_en_passant))
}

pub(crate) fn moves_for_piece(
    position: &Position,
    piece: Piece,
    square: Square,
    allow_en_passant: bool,
) -> PieceMoves {
    let own = position.occupancy(piece.color);
    match piece.kind {
        PieceKind::Pawn => pawn_moves(position, piece.color, square, allow_en_passant),
        PieceKind::King => {
            let reach = king_attacks(square);
            PieceMoves {
                targets: (reach & !own) | castling_targets(position, piece.color, square),
                defended: reach & own,
            }
        }
        _ => {
            let reach = attack_set(piece, square, position.occupied());
            PieceMoves {
                targets: reach & !own,
                defended: reach & own,
            }
        }
    }
}

fn pawn_moves(position: &Position, color: Color, square: Square, allow_en_passant: bool) -> PieceMoves {
    let occupied = position.occupied();
    let enemy = position.occupancy(color.opposite());
    let diagonals = pawn_attacks(color, square);
    let mut targets = diagonals & enemy;

    if let Some(single) = square.offset(0, color.forward()) {
        if occupied & single.bit() == 0 {
            targets |= single.bit();

            if square.rank() == color.pawn_start_rank() && position.is_unmoved(square) {
                if let Some(double) = single.offset(0, color.forward()) {
                    if occupied & double.bit() == 0 {
                        targets |= double.bit();
                    }
                }
            }
        }
    }

    if allow_en_passant {
        if let Some(target) = position.en_passant_target() {
            let victim = Square::from_coords(target.file(), square.rank());
            let victim_is_enemy_pawn = victim.is_some_and(|victim| {
                position.pieces(color.opposite(), PieceKind::Pawn) & victim.bit() != 0
            });
            if diagonals & target.bit() != 0 && victim_is_enemy_pawn {
                targets |= target.bit();
            }
        }
    }

    PieceMoves {
        targets,
        defended: diagonals & position.occupancy(color),
    }
}

/// King destinations reachable by castling.
fn castling_targets(position: &Position, color: Color, king_square: Square) -> Bitboard {
    let home = Square::E1.offset(0, color.home_rank() as i8);
    if home != Some(king_square) || !position.is_unmoved(king_square) || position.is_in_check(color) {
        return 0;
    }

    let rooks = position.pieces(color, PieceKind::Rook);
    let enemy = color.opposite();
    let mut targets = 0u64;

    for side in CastleSide::BOTH {
        let rook_home = side.rook_home(color);
        let available = position.castling_rights().has(color, side)
            && rooks & rook_home.bit() != 0
            && position.is_unmoved(rook_home)
            && position.occupied() & side.between_mask(color) == 0
            && side
                .king_path(color)
                .iter()
                .all(|&sq| !is_square_attacked(position, sq, enemy));

        if available {
            targets |= side.king_target(color).bit();
        }
    }

    targets
}

/// Append every pseudo-legal move of `color` to `out`.
///
/// Order: piece kind pawn to king, origin squares ascending, targets ascending,
/// promotions expanded knight, bishop, rook, queen.
pub fn generate_pseudo_legal_moves(position: &Position, color: Color, out: &mut Vec<Move>) {
    let allow_en_passant = color == position.side_to_move();

    for kind in PieceKind::ALL {
        let piece = Piece::new(kind, color);
        for from in squares_of(position.pieces(color, kind)) {
            let moves = moves_for_piece(position, piece, from, allow_en_passant);
            for to in squares_of(moves.targets) {
                if kind == PieceKind::Pawn && to.rank() == color.promotion_rank() {
                    for promotion in PieceKind::PROMOTIONS {
                        out.push(Move::with_promotion(from, to, promotion));
                    }
                } else {
                    out.push(Move::new(from, to));
                }
            }
        }
    }
}
