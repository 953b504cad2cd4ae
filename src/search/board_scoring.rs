//! Pluggable board evaluation interfaces and the standard evaluator.
//!
//! Search stays modular by delegating static position scoring to
//! [`BoardScorer`]. Scores are integers in millipawns, positive favouring
//! White, so a colour-mirrored position negates exactly.

use crate::game_state::chess_types::*;
use crate::move_generation::game_termination::classify_with_moves;
use crate::moves::chess_move::Move;
use crate::search::game_phase::{game_phase, GamePhase};
use crate::search::king_safety::king_safety_score;
use crate::search::pawn_structure::pawn_structure_score;
use crate::search::piece_square_tables::piece_square_balance;

pub const MILLIPAWNS_PER_PAWN: i32 = 1000;
/// Checkmate value: one million pawns.
pub const MATE_SCORE: i32 = 1_000_000 * MILLIPAWNS_PER_PAWN;
/// Scores beyond this magnitude are mates, shifted by at most the search ply.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 10_000;
/// Bound strictly wider than any evaluation.
pub const SCORE_INFINITY: i32 = 1_500_000_000;

pub trait BoardScorer: Send + Sync {
    /// White-positive score in millipawns.
    fn score_millipawns(&self, position: &Position) -> i32;

    /// White-positive score in pawns.
    fn score(&self, position: &Position) -> f64 {
        f64::from(self.score_millipawns(position)) / f64::from(MILLIPAWNS_PER_PAWN)
    }
}

/// White-positive value of a finished game.
#[inline]
pub fn terminal_millipawns(result: GameResult) -> i32 {
    match result {
        GameResult::Checkmate { loser } => -loser.sign() * MATE_SCORE,
        _ => 0,
    }
}

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

/// Weights of the standard evaluator, in millipawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorWeights {
    /// Indexed by `PieceKind::index()`.
    pub material: [i32; 6],
    /// Per legal move; each promotion square counts once.
    pub mobility: i32,
    /// Per pawn in a weakness or passed-pawn category.
    pub pawn_category: i32,
    /// Extra per-pawn adjustment on top of `pawn_category`.
    pub pawn_per_pawn: i32,
    /// Per pawn in a same-file chain of three or more.
    pub pawn_chain: i32,
    /// Per step of king centralization (0 to 2).
    pub king_center: i32,
    pub king_attacker: i32,
    pub king_shield: i32,
    /// Per safe king step in the endgame.
    pub king_endgame_mobility: i32,
    /// Per piece-square table unit.
    pub piece_square: i32,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            material: [1000, 3000, 3000, 5000, 9000, 0],
            mobility: 100,
            pawn_category: 500,
            pawn_per_pawn: 250,
            pawn_chain: 500,
            king_center: 100,
            king_attacker: 200,
            king_shield: 150,
            king_endgame_mobility: 50,
            piece_square: 5,
        }
    }
}

/// Per-term view of one evaluation, White minus Black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationBreakdown {
    pub phase: GamePhase,
    pub material: i32,
    pub mobility: i32,
    pub pawn_structure: i32,
    pub king_safety: i32,
    pub positional: i32,
}

impl EvaluationBreakdown {
    #[inline]
    pub fn total(&self) -> i32 {
        self.material + self.mobility + self.pawn_structure + self.king_safety + self.positional
    }
}

/// Material only. Cheap enough for exhaustive search tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub fn material_balance(position: &Position, values: &[i32; 6]) -> i32 {
        PieceKind::ALL
            .into_iter()
            .map(|kind| {
                let white = position.pieces(Color::White, kind).count_ones() as i32;
                let black = position.pieces(Color::Black, kind).count_ones() as i32;
                (white - black) * values[kind.index()]
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score_millipawns(&self, position: &Position) -> i32 {
        let side = position.side_to_move();
        let result = position
            .result()
            .or_else(|| classify_with_moves(position, position.has_legal_move(side)));
        match result {
            Some(result) => terminal_millipawns(result),
            None => Self::material_balance(position, &EvaluatorWeights::default().material),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator {
    pub weights: EvaluatorWeights,
}

impl StandardEvaluator {
    pub fn new(weights: EvaluatorWeights) -> Self {
        Self { weights }
    }

    /// Non-terminal evaluation split by term. Both colors' moves are
    /// enumerated without touching `position`.
    pub fn breakdown(&self, position: &Position) -> EvaluationBreakdown {
        let white_moves = position.legal_moves(Color::White);
        let black_moves = position.legal_moves(Color::Black);
        self.breakdown_with_moves(position, &white_moves, &black_moves)
    }

    fn breakdown_with_moves(
        &self,
        position: &Position,
        white_moves: &[Move],
        black_moves: &[Move],
    ) -> EvaluationBreakdown {
        let w = &self.weights;
        let phase = game_phase(position);
        let endgame = phase == GamePhase::Endgame;

        let mobility = w.mobility * (mobility_count(white_moves) - mobility_count(black_moves));
        let pawn_structure = pawn_structure_score(position, Color::White, w)
            - pawn_structure_score(position, Color::Black, w);
        let king_safety = king_safety_score(position, Color::White, w, endgame, white_moves)
            - king_safety_score(position, Color::Black, w, endgame, black_moves);

        EvaluationBreakdown {
            phase,
            material: MaterialScorer::material_balance(position, &w.material),
            mobility,
            pawn_structure,
            king_safety,
            positional: w.piece_square * piece_square_balance(position),
        }
    }
}

impl BoardScorer for StandardEvaluator {
    fn score_millipawns(&self, position: &Position) -> i32 {
        let white_moves = position.legal_moves(Color::White);
        let black_moves = position.legal_moves(Color::Black);

        let side_moves = match position.side_to_move() {
            Color::White => &white_moves,
            Color::Black => &black_moves,
        };
        let result = position
            .result()
            .or_else(|| classify_with_moves(position, !side_moves.is_empty()));
        if let Some(result) = result {
            return terminal_millipawns(result);
        }

        self.breakdown_with_moves(position, &white_moves, &black_moves)
            .total()
    }
}

/// Legal destinations, counting each promotion square once.
#[inline]
fn mobility_count(moves: &[Move]) -> i32 {
    moves
        .iter()
        .filter(|mv| matches!(mv.promotion, None | Some(PieceKind::Queen)))
        .count() as i32
}
