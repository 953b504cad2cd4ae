//! Alpha-beta engine.
//!
//! Wraps the root-parallel alpha-beta search behind the [`Engine`] trait and
//! exposes a direct `find_best_move` for callers that only need a move.

use log::debug;
use rayon::ThreadPool;

use crate::engines::engine_trait::{parse_option, parse_switch, Engine, EngineOutput, GoParams};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Position;
use crate::moves::chess_move::Move;
use crate::search::alpha_beta::{search_with_state, SearchConfig, SearchResult};
use crate::search::board_scoring::{
    is_mate_score, BoardScorer, StandardEvaluator, MATE_SCORE,
};
use crate::search::iterative_deepening::iterative_deepening_with_state;
use crate::search::threading::{SearchLimits, SharedSearchState, ThreadingConfig, ThreadingModel};

pub struct AlphaBetaEngine<S: BoardScorer = StandardEvaluator> {
    scorer: S,
    config: SearchConfig,
    pool: Option<ThreadPool>,
}

impl AlphaBetaEngine<StandardEvaluator> {
    pub fn new(default_depth: u8) -> Self {
        Self {
            scorer: StandardEvaluator::default(),
            config: SearchConfig {
                max_depth: default_depth.max(1),
                ..SearchConfig::default()
            },
            pool: None,
        }
    }
}

impl Default for AlphaBetaEngine<StandardEvaluator> {
    fn default() -> Self {
        Self::new(SearchConfig::default().max_depth)
    }
}

impl<S: BoardScorer> AlphaBetaEngine<S> {
    pub fn with_scorer(scorer: S, config: SearchConfig) -> ChessResult<Self> {
        Ok(Self {
            scorer,
            pool: config.threading.build_pool()?,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Best move at a fixed `depth` (at least one ply).
    ///
    /// Fails with [`ChessError::NoLegalMoves`] when the game is already over.
    pub fn find_best_move(&self, position: &Position, depth: u8) -> ChessResult<Move> {
        self.search(position, depth)?
            .best_move
            .ok_or(ChessError::NoLegalMoves)
    }

    /// Fixed-depth search with this engine's configuration.
    pub fn search(&self, position: &Position, depth: u8) -> ChessResult<SearchResult> {
        let config = SearchConfig {
            max_depth: depth.max(1),
            ..self.config
        };
        let shared = SharedSearchState::new(config.limits);
        search_with_state(position, &config, &self.scorer, &shared, self.pool.as_ref())
    }

    fn set_threads(&mut self, threads: usize) -> ChessResult<()> {
        self.config.threading = if threads > 1 {
            ThreadingConfig::root_split(threads)
        } else {
            ThreadingConfig {
                model: ThreadingModel::SingleThreaded,
                requested_threads: 1,
            }
        };
        self.pool = self.config.threading.build_pool()?;
        Ok(())
    }
}

/// UCI-style score text: centipawns, or moves to mate.
fn score_text(score: i32) -> String {
    if is_mate_score(score) {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {}", score / 10)
    }
}

impl<S: BoardScorer> Engine for AlphaBetaEngine<S> {
    fn name(&self) -> &str {
        "Amsel AlphaBeta"
    }

    fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        if name.eq_ignore_ascii_case("Depth") {
            let depth: u8 = parse_option(name, value)?;
            self.config.max_depth = depth.max(1);
        } else if name.eq_ignore_ascii_case("Threads") {
            self.set_threads(parse_option(name, value)?)?;
        } else if name.eq_ignore_ascii_case("MoveTime") {
            let ms: u64 = parse_option(name, value)?;
            self.config.limits.time_budget_ms = (ms > 0).then_some(ms);
        } else if name.eq_ignore_ascii_case("NodeLimit") {
            let nodes: u64 = parse_option(name, value)?;
            self.config.limits.node_budget = (nodes > 0).then_some(nodes);
        } else if name.eq_ignore_ascii_case("MoveOrdering") {
            self.config.move_ordering = parse_switch(name, value)?;
        } else if name.eq_ignore_ascii_case("CrossBranchPruning") {
            self.config.cross_branch_pruning = parse_switch(name, value)?;
        } else {
            debug!("ignoring unknown option {name}={value}");
        }
        Ok(())
    }

    fn choose_move(&mut self, position: &Position, params: &GoParams) -> ChessResult<EngineOutput> {
        let config = SearchConfig {
            max_depth: params.depth.unwrap_or(self.config.max_depth).max(1),
            limits: SearchLimits {
                node_budget: params.nodes.or(self.config.limits.node_budget),
                time_budget_ms: params.movetime_ms.or(self.config.limits.time_budget_ms),
            },
            ..self.config
        };
        let shared = SharedSearchState::new(config.limits);
        let result =
            iterative_deepening_with_state(position, &config, &self.scorer, &shared, self.pool.as_ref())?;

        let elapsed_ms = shared.elapsed().as_millis() as u64;
        let nps = result.nodes.saturating_mul(1000) / elapsed_ms.max(1);

        let mut out = EngineOutput {
            best_move: result.best_move,
            info_lines: Vec::new(),
        };
        out.info_lines.push(format!(
            "info depth {} score {} nodes {} time {} nps {}",
            result.reached_depth,
            score_text(result.score),
            result.nodes,
            elapsed_ms,
            nps
        ));
        if let Some(best) = result.best_move {
            out.info_lines.push(format!("info pv {best}"));
        }
        out.info_lines.push(format!(
            "info string alpha_beta_engine threads {} move_ordering {} cross_branch_pruning {}",
            config.threading.normalized_threads(),
            config.move_ordering,
            config.cross_branch_pruning
        ));
        if result.interrupted {
            out.info_lines.push(format!(
                "info string alpha_beta_engine interrupted target_depth {}",
                config.max_depth
            ));
        }
        Ok(out)
    }
}
