//! Random-move engine.
//!
//! Selects uniformly from legal moves and is primarily used for diagnostics,
//! integration testing, and low-strength gameplay.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{parse_option, Engine, EngineOutput, GoParams};
use crate::errors::ChessResult;
use crate::game_state::chess_types::Position;

pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Reproducible move choices for tests and matches.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "Amsel Random"
    }

    fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        if name.eq_ignore_ascii_case("Seed") {
            self.rng = StdRng::seed_from_u64(parse_option(name, value)?);
        }
        Ok(())
    }

    fn choose_move(&mut self, position: &Position, params: &GoParams) -> ChessResult<EngineOutput> {
        let legal_moves = if position.is_game_over() {
            Vec::new()
        } else {
            position.legal_moves(position.side_to_move())
        };

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info string random_engine legal_moves {}",
            legal_moves.len()
        ));

        if let Some(depth) = params.depth {
            out.info_lines
                .push(format!("info string random_engine requested_depth {depth}"));
        }

        out.best_move = legal_moves.as_slice().choose(&mut self.rng).copied();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_engine_picks_a_legal_move() {
        let game = Position::new_game();
        let mut engine = RandomEngine::new();
        let out = engine
            .choose_move(&game, &GoParams::default())
            .expect("engine should choose a move");
        let best = out.best_move.expect("start position has moves");
        assert!(game.apply_move(best).is_ok());
        assert!(out.info_lines.iter().any(|l| l.contains("legal_moves 20")));
    }

    #[test]
    fn seeded_engines_repeat_their_choices() {
        let game = Position::new_game();
        let mut first = RandomEngine::with_seed(7);
        let mut second = RandomEngine::new();
        second.set_option("Seed", "7").expect("seed option should parse");

        for _ in 0..5 {
            let a = first.choose_move(&game, &GoParams::default()).expect("move");
            let b = second.choose_move(&game, &GoParams::default()).expect("move");
            assert_eq!(a.best_move, b.best_move);
        }
    }

    #[test]
    fn finished_game_yields_no_move() {
        let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("FEN should parse");
        let out = RandomEngine::with_seed(1)
            .choose_move(&mate, &GoParams::default())
            .expect("engine should answer");
        assert_eq!(out.best_move, None);
    }
}
