//! Pawn-structure classification and scoring.
//!
//! Each color's pawns are sorted into isolated, doubled, backward and passed
//! sets plus same-file chains. The evaluator weighs them per color and folds
//! the result into White minus Black.

use crate::game_state::chess_types::*;
use crate::moves::attack_tables::pawn_attacks;
use crate::search::board_scoring::EvaluatorWeights;

const FILE_A: Bitboard = 0x0101_0101_0101_0101;

#[inline]
const fn file_mask(file: u8) -> Bitboard {
    FILE_A << file
}

#[inline]
fn adjacent_files_mask(file: u8) -> Bitboard {
    let left = if file > 0 { file_mask(file - 1) } else { 0 };
    let right = if file < 7 { file_mask(file + 1) } else { 0 };
    left | right
}

/// Squares strictly in front of `square` from `color`'s point of view, on all
/// ranks of the board.
#[inline]
fn ranks_ahead_mask(color: Color, square: Square) -> Bitboard {
    let rank = u32::from(square.rank());
    match color {
        Color::White if rank < 7 => !0u64 << ((rank + 1) * 8),
        Color::Black if rank > 0 => !0u64 >> ((8 - rank) * 8),
        _ => 0,
    }
}

/// Classified pawns of one color, as square sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PawnStructure {
    pub isolated: Bitboard,
    pub doubled: Bitboard,
    pub backward: Bitboard,
    pub passed: Bitboard,
    /// Lengths of same-file runs of three or more pawns on consecutive ranks.
    pub chains: Vec<u32>,
}

pub fn analyze_pawns(position: &Position, color: Color) -> PawnStructure {
    let own = position.pieces(color, PieceKind::Pawn);
    let enemy = position.pieces(color.opposite(), PieceKind::Pawn);
    let mut structure = PawnStructure::default();

    for file in 0..8u8 {
        let on_file = own & file_mask(file);
        if on_file.count_ones() > 1 {
            structure.doubled |= on_file;
        }
        structure.chains.extend(chain_lengths(on_file));
    }

    for square in squares_of(own) {
        let neighbours = own & adjacent_files_mask(square.file());
        let ahead = ranks_ahead_mask(color, square);

        if neighbours == 0 {
            structure.isolated |= square.bit();
        } else if neighbours & !ahead == 0 && stop_square_is_attacked(color, square, enemy) {
            structure.backward |= square.bit();
        }

        let front_span = (file_mask(square.file()) | adjacent_files_mask(square.file())) & ahead;
        if enemy & front_span == 0 {
            structure.passed |= square.bit();
        }
    }

    structure
}

#[inline]
fn stop_square_is_attacked(color: Color, square: Square, enemy_pawns: Bitboard) -> bool {
    square
        .offset(0, color.forward())
        .is_some_and(|stop| pawn_attacks(color, stop) & enemy_pawns != 0)
}

fn chain_lengths(on_file: Bitboard) -> Vec<u32> {
    let mut chains = Vec::new();
    let mut run = 0u32;
    for rank in 0..8u32 {
        if on_file & (0xFFu64 << (rank * 8)) != 0 {
            run += 1;
        } else {
            if run >= 3 {
                chains.push(run);
            }
            run = 0;
        }
    }
    if run >= 3 {
        chains.push(run);
    }
    chains
}

/// Pawn-structure score of `color` in millipawns; positive is good for `color`.
pub fn pawn_structure_score(position: &Position, color: Color, weights: &EvaluatorWeights) -> i32 {
    let structure = analyze_pawns(position, color);
    let per_member = weights.pawn_category + weights.pawn_per_pawn;
    let count = |bb: Bitboard| bb.count_ones() as i32;

    let penalties = count(structure.isolated) + count(structure.doubled) + count(structure.backward);
    let chains: i32 = structure.chains.iter().map(|&len| len as i32).sum();

    per_member * (count(structure.passed) - penalties) + weights.pawn_chain * chains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(squares: &[&str]) -> Bitboard {
        squares
            .iter()
            .map(|s| s.parse::<Square>().expect("square should parse"))
            .fold(0, |acc, sq| acc | sq.bit())
    }

    #[test]
    fn start_position_has_no_weaknesses() {
        let structure = analyze_pawns(&Position::new_game(), Color::White);
        assert_eq!(structure, PawnStructure::default());
    }

    #[test]
    fn isolated_and_doubled_pawns() {
        let position =
            Position::from_fen("4k3/pppp4/8/8/8/7P/P6P/4K3 w - - 0 1").expect("FEN should parse");
        let structure = analyze_pawns(&position, Color::White);
        assert_eq!(structure.isolated, bits(&["a2", "h2", "h3"]));
        assert_eq!(structure.doubled, bits(&["h2", "h3"]));
    }

    #[test]
    fn passed_pawn_has_no_enemy_pawn_in_front() {
        let position =
            Position::from_fen("4k3/p7/8/3P4/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let white = analyze_pawns(&position, Color::White);
        assert_eq!(white.passed, bits(&["d5"]));
        let black = analyze_pawns(&position, Color::Black);
        assert_eq!(black.passed, bits(&["a7"]));
    }

    #[test]
    fn backward_pawn_needs_advanced_neighbours_and_an_attacked_stop_square() {
        // d2 trails c3 and e3, and the black pawn on e4 covers d3.
        let position =
            Position::from_fen("4k3/8/8/8/4p3/2P1P3/3P4/4K3 w - - 0 1").expect("FEN should parse");
        let structure = analyze_pawns(&position, Color::White);
        assert_eq!(structure.backward, bits(&["d2"]));
    }

    #[test]
    fn three_stacked_pawns_form_a_chain() {
        let position =
            Position::from_fen("4k3/8/8/8/P7/P7/P7/4K3 w - - 0 1").expect("FEN should parse");
        let structure = analyze_pawns(&position, Color::White);
        assert_eq!(structure.chains, vec![3]);
        assert_eq!(structure.doubled.count_ones(), 3);
    }

    #[test]
    fn score_weighs_every_category() {
        let weights = EvaluatorWeights::default();
        let position =
            Position::from_fen("4k3/8/8/8/P7/P7/P7/4K3 w - - 0 1").expect("FEN should parse");
        // Three pawns that are isolated, doubled and passed, one chain of three.
        let expected = 750 * (3 - 3 - 3) + 500 * 3;
        assert_eq!(pawn_structure_score(&position, Color::White, &weights), expected);
    }
}
