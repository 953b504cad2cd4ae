//! Core board state representation.
//!
//! `Position` is the central model. It stores piece bitboards, occupancy
//! caches, turn/state flags, clocks, the unmoved-piece mask, check caches and
//! the hash history used for repetition. Every later state of a game is
//! produced by `apply_move` on a copy; `make_move` / `unmake_move` work in
//! place on scratch copies (see `move_generation::legal_move_apply`).

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::refresh_check_caches;
use crate::moves::chess_move::Move;
use crate::search::zobrist::{compute_zobrist_key, piece_square_key};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;
use crate::utils::long_algebraic::resolve_long_algebraic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    // [color][piece_kind]
    pub(crate) pieces: [[Bitboard; 6]; 2],

    // Occupancy caches.
    pub(crate) occupancy_by_color: [Bitboard; 2],
    pub(crate) occupancy_all: Bitboard,

    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_target: Option<Square>,

    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,

    // Set while the piece that started on that square has not moved.
    pub(crate) unmoved: Bitboard,

    // Derived caches, indexed by color.
    pub(crate) king_squares: [Square; 2],
    pub(crate) attackers: [Bitboard; 2],
    pub(crate) defenders: [Bitboard; 2],

    pub(crate) zobrist_key: u64,
    pub(crate) history: Vec<u64>,

    pub(crate) result: Option<GameResult>,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,

            halfmove_clock: 0,
            fullmove_number: 1,

            unmoved: 0,

            king_squares: [Square::E1, Square::E8],
            attackers: [0; 2],
            defenders: [0; 2],

            zobrist_key: 0,
            history: Vec::new(),

            result: None,
        }
    }
}

impl Position {
    /// Empty board with White to move. Only useful as a builder base; it holds
    /// no kings and so does not satisfy the position invariants.
    #[inline]
    pub(crate) fn new_empty() -> Self {
        Self::default()
    }

    /// Standard starting position, equal to parsing
    /// [`STARTING_POSITION_FEN`](crate::game_state::chess_rules::STARTING_POSITION_FEN).
    pub fn new_game() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut position = Self::new_empty();
        for color in Color::BOTH {
            for (file, kind) in (0u8..).zip(BACK_RANK) {
                if let Some(square) = Square::from_coords(file, color.home_rank()) {
                    position.pieces[color.index()][kind.index()] |= square.bit();
                }
                if let Some(square) = Square::from_coords(file, color.pawn_start_rank()) {
                    position.pieces[color.index()][PieceKind::Pawn.index()] |= square.bit();
                }
            }
        }
        position.castling_rights = CastlingRights::ALL;
        position.refresh_derived();
        position.unmoved = position.occupancy_all;
        position
    }

    #[inline]
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    /// Resolve move text such as `e2e4` or `e7e8q` against this position.
    #[inline]
    pub fn parse_move(&self, text: &str) -> ChessResult<Move> {
        resolve_long_algebraic(text, self)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn zobrist_key(&self) -> u64 {
        self.zobrist_key
    }

    /// Keys of the positions that preceded this one, oldest first. Positions
    /// produced by `apply_move` keep only the keys back to the last
    /// irreversible move.
    #[inline]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Drop history keys older than the halfmove clock; no repetition can
    /// reach past a capture or pawn move.
    pub(crate) fn trim_history(&mut self) {
        let keep = usize::from(self.halfmove_clock).min(self.history.len());
        self.history.drain(..self.history.len() - keep);
    }

    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    /// Squares of opposing pieces that currently reach `color`'s king.
    #[inline]
    pub fn attackers(&self, color: Color) -> Bitboard {
        self.attackers[color.index()]
    }

    /// Squares of `color`'s pieces defending its own pieces that attack the
    /// opposing king.
    #[inline]
    pub fn defenders(&self, color: Color) -> Bitboard {
        self.defenders[color.index()]
    }

    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.attackers[color.index()] != 0
    }

    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy_all
    }

    /// True while the piece that stood on `square` at setup has not moved.
    #[inline]
    pub fn is_unmoved(&self, square: Square) -> bool {
        self.unmoved & square.bit() != 0
    }

    #[inline]
    pub fn unmoved_mask(&self) -> Bitboard {
        self.unmoved
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let mask = square.bit();
        if self.occupancy_all & mask == 0 {
            return None;
        }
        let color = if self.occupancy_by_color[Color::White.index()] & mask != 0 {
            Color::White
        } else {
            Color::Black
        };
        PieceKind::ALL
            .into_iter()
            .find(|kind| self.pieces[color.index()][kind.index()] & mask != 0)
            .map(|kind| Piece::new(kind, color))
    }

    /// Number of pieces of `kind` of both colors.
    #[inline]
    pub fn count(&self, kind: PieceKind) -> u32 {
        (self.pieces[0][kind.index()] | self.pieces[1][kind.index()]).count_ones()
    }

    /// Fails with `InvariantViolation` unless each color has exactly one king
    /// and no square holds two pieces.
    pub fn check_invariants(&self) -> ChessResult<()> {
        for color in Color::BOTH {
            let kings = self.pieces[color.index()][PieceKind::King.index()].count_ones();
            if kings != 1 {
                return Err(ChessError::InvariantViolation(format!(
                    "{color} has {kings} kings, expected exactly one"
                )));
            }
        }

        let boards = self.pieces.iter().flatten();
        let placed: u32 = boards.clone().map(|bb| bb.count_ones()).sum();
        let covered = boards.fold(0u64, |acc, bb| acc | bb);
        if placed != covered.count_ones() {
            return Err(ChessError::InvariantViolation(format!(
                "{} squares hold more than one piece",
                placed - covered.count_ones()
            )));
        }
        Ok(())
    }

    /// Toggle one piece in or out of the board, keeping occupancy and the
    /// hash key in step.
    #[inline]
    pub(crate) fn toggle_piece(&mut self, color: Color, kind: PieceKind, square: Square) {
        let bit = square.bit();
        self.pieces[color.index()][kind.index()] ^= bit;
        self.occupancy_by_color[color.index()] ^= bit;
        self.occupancy_all ^= bit;
        self.zobrist_key ^= piece_square_key(color, kind, square);
    }

    /// Recompute every derived field from the bitboards and state flags.
    pub(crate) fn refresh_derived(&mut self) {
        for color in Color::BOTH {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .fold(0u64, |acc, bb| acc | bb);
            let kings = self.pieces[color.index()][PieceKind::King.index()];
            if kings != 0 {
                self.king_squares[color.index()] = Square::from_lowest_bit(kings);
            }
        }
        self.occupancy_all = self.occupancy_by_color[0] | self.occupancy_by_color[1];
        self.zobrist_key = compute_zobrist_key(self);
        refresh_check_caches(self);
    }

    /// The same position with colors exchanged and ranks flipped.
    ///
    /// History is dropped because the mirrored keys differ; a set result is
    /// carried over with the loser swapped.
    pub fn mirrored(&self) -> Position {
        let mut mirror = Position::new_empty();
        for color in Color::BOTH {
            for kind in PieceKind::ALL {
                for square in squares_of(self.pieces(color, kind)) {
                    mirror.pieces[color.opposite().index()][kind.index()] |=
                        square.flip_rank().bit();
                }
            }
        }
        mirror.side_to_move = self.side_to_move.opposite();
        mirror.castling_rights = self.castling_rights.swapped();
        mirror.en_passant_target = self.en_passant_target.map(Square::flip_rank);
        mirror.halfmove_clock = self.halfmove_clock;
        mirror.fullmove_number = self.fullmove_number;
        mirror.unmoved = squares_of(self.unmoved).fold(0, |acc, sq| acc | sq.flip_rank().bit());
        mirror.result = self.result.map(|result| match result {
            GameResult::Checkmate { loser } => GameResult::Checkmate {
                loser: loser.opposite(),
            },
            draw => draw,
        });
        mirror.refresh_derived();
        mirror
    }
}
