//! Core value types: squares, colors, piece kinds, castling rights and results.
//!
//! Squares are indexed `rank * 8 + file` with a1 = 0 and h8 = 63. Piece sets
//! are carried as 64-bit bitboards using the same indexing.

use std::fmt;
use std::str::FromStr;

use crate::errors::ChessError;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

pub use crate::game_state::position::Position;
pub use crate::game_state::undo_state::UndoState;

/// Set of squares, one bit per square index.
pub type Bitboard = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    #[inline]
    pub const fn new(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    /// Lowest set square of a bitboard. The caller guarantees `bb != 0`.
    #[inline]
    pub(crate) const fn from_lowest_bit(bb: Bitboard) -> Self {
        Square(bb.trailing_zeros() as u8)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    #[inline]
    pub const fn bit(self) -> Bitboard {
        1u64 << self.0
    }

    /// Square reached by stepping `file_delta`/`rank_delta`, if still on the board.
    #[inline]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Square((rank * 8 + file) as u8))
        }
    }

    /// Vertical mirror: a1 <-> a8, e2 <-> e7.
    #[inline]
    pub const fn flip_rank(self) -> Square {
        Square(self.0 ^ 56)
    }

    #[inline]
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// Chebyshev (king-step) distance.
    #[inline]
    pub fn distance(self, other: Square) -> u8 {
        self.file()
            .abs_diff(other.file())
            .max(self.rank().abs_diff(other.rank()))
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&square_to_algebraic(*self))
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        algebraic_to_square(s)
    }
}

/// Iterate the squares of a bitboard from a1 upwards.
#[inline]
pub fn squares_of(bb: Bitboard) -> impl Iterator<Item = Square> {
    let mut rest = bb;
    std::iter::from_fn(move || {
        if rest == 0 {
            None
        } else {
            let sq = Square::from_lowest_bit(rest);
            rest &= rest - 1;
            Some(sq)
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step of this color's pawns.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// +1 for White, -1 for Black; used to fold per-side terms into white-minus-black.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Promotion choices, in the order move generation emits them.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn is_minor(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop)
    }

    /// Lowercase letter used by FEN and move text.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    #[inline]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A piece's identity. Where it stands and whether it has moved are owned by
/// the [`Position`] holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN letter: uppercase for White.
    #[inline]
    pub const fn fen_char(self) -> char {
        let lower = self.kind.letter();
        match self.color {
            Color::White => lower.to_ascii_uppercase(),
            Color::Black => lower,
        }
    }

    #[inline]
    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else if ch.is_ascii_lowercase() {
            Color::Black
        } else {
            return None;
        };
        PieceKind::from_letter(ch).map(|kind| Piece::new(kind, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    /// Rook home square for this side and color.
    #[inline]
    pub const fn rook_home(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::KingSide) => Square::H1,
            (Color::White, CastleSide::QueenSide) => Square::A1,
            (Color::Black, CastleSide::KingSide) => Square::H8,
            (Color::Black, CastleSide::QueenSide) => Square::A8,
        }
    }

    /// King destination when castling.
    #[inline]
    pub const fn king_target(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::KingSide) => Square::G1,
            (Color::White, CastleSide::QueenSide) => Square::C1,
            (Color::Black, CastleSide::KingSide) => Square::G8,
            (Color::Black, CastleSide::QueenSide) => Square::C8,
        }
    }

    /// Rook destination when castling.
    #[inline]
    pub const fn rook_target(self, color: Color) -> Square {
        match (color, self) {
            (Color::White, CastleSide::KingSide) => Square::F1,
            (Color::White, CastleSide::QueenSide) => Square::D1,
            (Color::Black, CastleSide::KingSide) => Square::F8,
            (Color::Black, CastleSide::QueenSide) => Square::D8,
        }
    }

    /// Squares strictly between king and rook; all must be empty.
    #[inline]
    pub const fn between_mask(self, color: Color) -> Bitboard {
        let base = match self {
            CastleSide::KingSide => (1u64 << 5) | (1u64 << 6),
            CastleSide::QueenSide => (1u64 << 1) | (1u64 << 2) | (1u64 << 3),
        };
        match color {
            Color::White => base,
            Color::Black => base << 56,
        }
    }

    /// Squares the king crosses or lands on; none may be attacked.
    #[inline]
    pub const fn king_path(self, color: Color) -> [Square; 2] {
        match (color, self) {
            (Color::White, CastleSide::KingSide) => [Square::F1, Square::G1],
            (Color::White, CastleSide::QueenSide) => [Square::D1, Square::C1],
            (Color::Black, CastleSide::KingSide) => [Square::F8, Square::G8],
            (Color::Black, CastleSide::QueenSide) => [Square::D8, Square::C8],
        }
    }

    #[inline]
    const fn flag(self, color: Color) -> u8 {
        match (color, self) {
            (Color::White, CastleSide::KingSide) => 1 << 0,
            (Color::White, CastleSide::QueenSide) => 1 << 1,
            (Color::Black, CastleSide::KingSide) => 1 << 2,
            (Color::Black, CastleSide::QueenSide) => 1 << 3,
        }
    }
}

/// The four independent castling flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0x0F);

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & side.flag(color) != 0
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= side.flag(color);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !side.flag(color);
    }

    #[inline]
    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Packed 4-bit form, used for hashing.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Rights with the colors exchanged.
    pub fn swapped(self) -> CastlingRights {
        CastlingRights(((self.0 & 0b0011) << 2) | ((self.0 & 0b1100) >> 2))
    }
}

/// Terminal state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// `loser` is the side to move that has been checkmated.
    Checkmate { loser: Color },
    Stalemate,
    InsufficientMaterial,
    Repetition,
    FiftyMoveRule,
}

impl GameResult {
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::Checkmate { loser } => Some(loser.opposite()),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_draw(self) -> bool {
        !matches!(self, GameResult::Checkmate { .. })
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Checkmate { loser: Color::Black } => f.write_str("1-0 (checkmate)"),
            GameResult::Checkmate { loser: Color::White } => f.write_str("0-1 (checkmate)"),
            GameResult::Stalemate => f.write_str("1/2-1/2 (stalemate)"),
            GameResult::InsufficientMaterial => f.write_str("1/2-1/2 (insufficient material)"),
            GameResult::Repetition => f.write_str("1/2-1/2 (threefold repetition)"),
            GameResult::FiftyMoveRule => f.write_str("1/2-1/2 (fifty-move rule)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates_round_trip_through_index_and_text() {
        for sq in Square::all() {
            let again = Square::from_coords(sq.file(), sq.rank()).expect("coords in range");
            assert_eq!(again, sq);
            let text = sq.to_string();
            assert_eq!(text.parse::<Square>().expect("text should parse"), sq);
        }
        assert_eq!("e4".parse::<Square>().expect("e4"), Square::from_coords(4, 3).expect("e4"));
        assert!(Square::from_coords(8, 0).is_none());
        assert!(Square::new(64).is_none());
    }

    #[test]
    fn square_offset_stays_on_board() {
        assert_eq!(Square::A1.offset(-1, 0), None);
        assert_eq!(Square::A1.offset(1, 2), Square::from_coords(1, 2));
        assert_eq!(Square::H8.offset(0, 1), None);
        assert_eq!(Square::E1.flip_rank(), Square::E8);
    }

    #[test]
    fn castling_rights_flags_are_independent() {
        let mut rights = CastlingRights::ALL;
        rights.revoke(Color::White, CastleSide::QueenSide);
        assert!(rights.has(Color::White, CastleSide::KingSide));
        assert!(!rights.has(Color::White, CastleSide::QueenSide));
        assert!(rights.has(Color::Black, CastleSide::QueenSide));
        rights.revoke_all(Color::Black);
        assert!(!rights.has(Color::Black, CastleSide::KingSide));
        assert!(rights.swapped().has(Color::Black, CastleSide::KingSide));
        assert!(!rights.swapped().has(Color::White, CastleSide::KingSide));
    }

    #[test]
    fn squares_of_walks_every_set_bit() {
        let bb = Square::A1.bit() | Square::E8.bit() | Square::H1.bit();
        let squares: Vec<Square> = squares_of(bb).collect();
        assert_eq!(squares, vec![Square::A1, Square::H1, Square::E8]);
    }

    #[test]
    fn checkmate_result_names_the_winner() {
        let result = GameResult::Checkmate { loser: Color::White };
        assert_eq!(result.winner(), Some(Color::Black));
        assert!(!result.is_draw());
        assert!(GameResult::Stalemate.is_draw());
    }
}
