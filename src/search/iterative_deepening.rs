//! Iterative deepening driver over the alpha-beta root search.
//!
//! Searches depth 1, 2, ... up to the configured limit and reports the last
//! iteration that finished. A budget firing mid-iteration keeps the previous
//! iteration's answer.

use log::info;
use rayon::ThreadPool;

use crate::errors::ChessResult;
use crate::game_state::chess_types::Position;
use crate::search::alpha_beta::{search_depth, SearchConfig, SearchResult};
use crate::search::board_scoring::{is_mate_score, BoardScorer};
use crate::search::threading::SharedSearchState;

pub fn iterative_deepening_search<S: BoardScorer + ?Sized>(
    position: &Position,
    config: &SearchConfig,
    scorer: &S,
) -> ChessResult<SearchResult> {
    let shared = SharedSearchState::new(config.limits);
    let pool = config.threading.build_pool()?;
    iterative_deepening_with_state(position, config, scorer, &shared, pool.as_ref())
}

pub fn iterative_deepening_with_state<S: BoardScorer + ?Sized>(
    position: &Position,
    config: &SearchConfig,
    scorer: &S,
    shared: &SharedSearchState,
    pool: Option<&ThreadPool>,
) -> ChessResult<SearchResult> {
    if config.max_depth == 0 {
        let outcome = search_depth(position, 0, config, scorer, shared, pool)?;
        return Ok(SearchResult {
            best_move: outcome.best_move,
            score: outcome.score,
            nodes: shared.nodes(),
            reached_depth: 0,
            interrupted: false,
        });
    }

    let mut result = SearchResult::default();

    for depth in 1..=config.max_depth {
        let outcome = search_depth(position, depth, config, scorer, shared, pool)?;

        if !outcome.completed {
            result.interrupted = true;
            if result.reached_depth == 0 {
                result.best_move = outcome.best_move;
                result.score = outcome.score;
            }
            break;
        }

        result.best_move = outcome.best_move;
        result.score = outcome.score;
        result.reached_depth = depth;

        // Nothing to deepen: the root is terminal or the outcome is forced.
        if outcome.best_move.is_none() || is_mate_score(outcome.score) {
            break;
        }
    }

    result.nodes = shared.nodes();
    info!(
        "iterative deepening reached depth {} of {} score {} nodes {} in {:?}{}",
        result.reached_depth,
        config.max_depth,
        result.score,
        result.nodes,
        shared.elapsed(),
        if result.interrupted { " (interrupted)" } else { "" }
    );
    Ok(result)
}
