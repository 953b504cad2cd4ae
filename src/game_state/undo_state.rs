use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;

/// Single undo record for `make_move` / `unmake_move`.
///
/// Holds everything `make_move` overwrites so the position can be restored
/// bit-for-bit, including the derived caches and the hash key.
#[derive(Debug, Clone)]
pub struct UndoState {
    pub mv: Move,
    pub moved_piece: PieceKind,
    /// Piece left on the destination; differs from `moved_piece` on promotion.
    pub placed_piece: PieceKind,
    pub captured: Option<(PieceKind, Square)>,
    /// Rook origin and destination when the move castled.
    pub rook_move: Option<(Square, Square)>,

    pub prev_side_to_move: Color,
    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_target: Option<Square>,
    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
    pub prev_unmoved: Bitboard,

    pub prev_king_squares: [Square; 2],
    pub prev_attackers: [Bitboard; 2],
    pub prev_defenders: [Bitboard; 2],

    pub prev_zobrist_key: u64,
    pub prev_result: Option<GameResult>,
}

impl UndoState {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        matches!(self.captured, Some((_, square)) if square != self.mv.to)
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        self.rook_move.is_some()
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.placed_piece != self.moved_piece
    }
}
