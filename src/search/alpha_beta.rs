//! Depth-bounded negamax alpha-beta search with root parallelism.
//!
//! Every node owns its position: children are clones with one move made, so
//! nothing below the root is shared between workers. Root moves run either in
//! order on the calling thread or spread over a rayon pool; in both cases one
//! reducer picks the best completed root move, ties going to the earlier move
//! in search order. That keeps sequential and parallel searches in agreement.
//!
//! Scores inside the search are millipawns from the side to move's point of
//! view. Mate scores are pulled towards zero by the ply at which the mate
//! happens so that quicker mates compare higher.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::move_generation::game_termination::classify_with_moves;
use crate::moves::chess_move::Move;
use crate::search::board_scoring::{
    terminal_millipawns, BoardScorer, MATE_THRESHOLD, SCORE_INFINITY,
};
use crate::search::move_ordering::order_moves;
use crate::search::threading::{SearchLimits, SharedSearchState, ThreadingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub threading: ThreadingConfig,
    /// Captures, checks and threats first at every node.
    pub move_ordering: bool,
    /// Let parallel root workers narrow their window with the best exact
    /// score any worker has completed so far.
    pub cross_branch_pruning: bool,
    pub limits: SearchLimits,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            threading: ThreadingConfig::default(),
            move_ordering: true,
            cross_branch_pruning: false,
            limits: SearchLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Millipawns from the side to move's point of view.
    pub score: i32,
    pub nodes: u64,
    /// Deepest fully completed iteration.
    pub reached_depth: u8,
    /// A time or node budget (or an external stop) cut the search short.
    pub interrupted: bool,
}

/// Why a subtree was abandoned.
#[derive(Debug)]
enum SearchAbort {
    /// Budget, external stop or a mate found elsewhere at the root.
    Stopped,
    Fault(ChessError),
}

impl From<ChessError> for SearchAbort {
    fn from(err: ChessError) -> Self {
        SearchAbort::Fault(err)
    }
}

type NodeResult = Result<i32, SearchAbort>;

/// Pulls a mate score towards zero by `ply`; other scores pass through.
#[inline]
fn relative_to_ply(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

#[inline]
fn terminal_score(result: GameResult, side: Color, ply: i32) -> i32 {
    relative_to_ply(side.sign() * terminal_millipawns(result), ply)
}

#[inline]
fn leaf_score<S: BoardScorer + ?Sized>(scorer: &S, position: &Position, ply: i32) -> i32 {
    relative_to_ply(
        position.side_to_move().sign() * scorer.score_millipawns(position),
        ply,
    )
}

#[inline]
fn node_result(position: &Position, moves: &[Move]) -> Option<GameResult> {
    position
        .result()
        .or_else(|| classify_with_moves(position, !moves.is_empty()))
}

#[inline]
fn child_position(position: &Position, mv: Move) -> ChessResult<Position> {
    let mut child = position.clone();
    child.make_move(mv)?;
    child.trim_history();
    child.check_invariants()?;
    Ok(child)
}

struct NodeContext<'a, S: ?Sized> {
    scorer: &'a S,
    shared: &'a SharedSearchState,
    mate_found: &'a AtomicBool,
    move_ordering: bool,
}

impl<S: BoardScorer + ?Sized> NodeContext<'_, S> {
    #[inline]
    fn enter(&self) -> Result<(), SearchAbort> {
        if self.mate_found.load(Ordering::Relaxed) || !self.shared.enter_node() {
            return Err(SearchAbort::Stopped);
        }
        Ok(())
    }

    fn ordered(&self, position: &Position, moves: Vec<Move>) -> ChessResult<Vec<Move>> {
        if self.move_ordering {
            order_moves(position, moves)
        } else {
            Ok(moves)
        }
    }

    fn negamax(
        &self,
        position: &Position,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: i32,
    ) -> NodeResult {
        self.enter()?;

        if depth == 0 {
            return Ok(leaf_score(self.scorer, position, ply));
        }

        let side = position.side_to_move();
        let moves = position.legal_moves(side);
        if let Some(result) = node_result(position, &moves) {
            return Ok(terminal_score(result, side, ply));
        }

        let mut best = -SCORE_INFINITY;
        for mv in self.ordered(position, moves)? {
            let child = child_position(position, mv)?;
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1)?;
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        Ok(best)
    }
}

/// Exhaustive negamax without pruning, ordering or budgets. Same leaf and
/// terminal scoring as the alpha-beta search, so both agree on the root score.
pub fn minimax_score<S: BoardScorer + ?Sized>(
    position: &Position,
    depth: u8,
    scorer: &S,
) -> ChessResult<i32> {
    minimax(position, depth, 0, scorer)
}

fn minimax<S: BoardScorer + ?Sized>(
    position: &Position,
    depth: u8,
    ply: i32,
    scorer: &S,
) -> ChessResult<i32> {
    if depth == 0 {
        return Ok(leaf_score(scorer, position, ply));
    }

    let side = position.side_to_move();
    let moves = position.legal_moves(side);
    if let Some(result) = node_result(position, &moves) {
        return Ok(terminal_score(result, side, ply));
    }

    let mut best = -SCORE_INFINITY;
    for mv in moves {
        let child = child_position(position, mv)?;
        best = best.max(-minimax(&child, depth - 1, ply + 1, scorer)?);
    }
    Ok(best)
}

/// One finished root move.
#[derive(Debug, Clone, Copy)]
struct RootBranch {
    index: usize,
    mv: Move,
    score: i32,
    /// False when the score is only an upper bound from a narrowed window.
    exact: bool,
}

/// Outcome of searching the root to one depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepthOutcome {
    pub best_move: Option<Move>,
    pub score: i32,
    /// Every root move finished, or a mate cut the rest off.
    pub completed: bool,
}

/// Raises `bound` to `score` unless it already holds something higher.
fn raise_bound(bound: &AtomicI32, score: i32) {
    let mut current = bound.load(Ordering::Relaxed);
    while score > current {
        match bound.compare_exchange_weak(current, score, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(observed) => current = observed,
        }
    }
}

/// Searches the root of `position` to `depth`.
pub(crate) fn search_depth<S: BoardScorer + ?Sized>(
    position: &Position,
    depth: u8,
    config: &SearchConfig,
    scorer: &S,
    shared: &SharedSearchState,
    pool: Option<&ThreadPool>,
) -> ChessResult<DepthOutcome> {
    let side = position.side_to_move();
    let moves = position.legal_moves(side);

    if let Some(result) = node_result(position, &moves) {
        shared.enter_node();
        return Ok(DepthOutcome {
            best_move: None,
            score: terminal_score(result, side, 0),
            completed: true,
        });
    }
    if depth == 0 {
        shared.enter_node();
        return Ok(DepthOutcome {
            best_move: None,
            score: leaf_score(scorer, position, 0),
            completed: true,
        });
    }

    let mate_found = AtomicBool::new(false);
    let ctx = NodeContext {
        scorer,
        shared,
        mate_found: &mate_found,
        move_ordering: config.move_ordering,
    };
    let moves = ctx.ordered(position, moves)?;

    let branches = if !shared.enter_node() {
        Vec::new()
    } else if let Some(pool) = pool {
        search_root_parallel(&ctx, position, &moves, depth, config.cross_branch_pruning, pool)?
    } else {
        search_root_sequential(&ctx, position, &moves, depth)?
    };

    let interrupted = shared.should_stop();
    if interrupted {
        warn!(
            "search stopped at depth {depth} after {} of {} root moves",
            branches.len(),
            moves.len()
        );
    }

    let best = branches
        .iter()
        .filter(|branch| branch.exact)
        .fold(None::<RootBranch>, |best, &branch| match best {
            Some(current)
                if current.score > branch.score
                    || (current.score == branch.score && current.index < branch.index) =>
            {
                Some(current)
            }
            _ => Some(branch),
        });

    Ok(match best {
        Some(branch) => DepthOutcome {
            best_move: Some(branch.mv),
            score: branch.score,
            completed: !interrupted,
        },
        None => DepthOutcome {
            best_move: moves.first().copied(),
            score: leaf_score(scorer, position, 0),
            completed: false,
        },
    })
}

fn search_root_sequential<S: BoardScorer + ?Sized>(
    ctx: &NodeContext<'_, S>,
    position: &Position,
    moves: &[Move],
    depth: u8,
) -> ChessResult<Vec<RootBranch>> {
    let mut branches = Vec::with_capacity(moves.len());
    let mut alpha = -SCORE_INFINITY;

    for (index, &mv) in moves.iter().enumerate() {
        let child = child_position(position, mv)?;
        let score = match ctx.negamax(&child, depth - 1, -SCORE_INFINITY, -alpha, 1) {
            Ok(value) => -value,
            Err(SearchAbort::Stopped) => break,
            Err(SearchAbort::Fault(err)) => return Err(err),
        };
        debug!("depth {depth} root move {mv} score {score}");

        branches.push(RootBranch {
            index,
            mv,
            score,
            exact: score > alpha,
        });
        alpha = alpha.max(score);

        if score >= MATE_THRESHOLD {
            debug!("mate found with {mv}, skipping {} root moves", moves.len() - index - 1);
            break;
        }
    }

    Ok(branches)
}

fn search_root_parallel<S: BoardScorer + ?Sized>(
    ctx: &NodeContext<'_, S>,
    position: &Position,
    moves: &[Move],
    depth: u8,
    cross_branch_pruning: bool,
    pool: &ThreadPool,
) -> ChessResult<Vec<RootBranch>> {
    let bound = AtomicI32::new(-SCORE_INFINITY);

    let outcomes: Vec<Result<RootBranch, SearchAbort>> = pool.install(|| {
        moves
            .par_iter()
            .enumerate()
            .map(|(index, &mv)| -> Result<RootBranch, SearchAbort> {
                // One below the shared bound so a move tying the best so far
                // still comes back exact.
                let alpha = match bound.load(Ordering::Relaxed) {
                    b if cross_branch_pruning && b > -SCORE_INFINITY => b - 1,
                    _ => -SCORE_INFINITY,
                };

                let child = child_position(position, mv)?;
                let score = -ctx.negamax(&child, depth - 1, -SCORE_INFINITY, -alpha, 1)?;
                let exact = score > alpha;
                debug!("depth {depth} root move {mv} score {score}");

                if exact {
                    raise_bound(&bound, score);
                    if score >= MATE_THRESHOLD {
                        ctx.mate_found.store(true, Ordering::Relaxed);
                    }
                }
                Ok(RootBranch {
                    index,
                    mv,
                    score,
                    exact,
                })
            })
            .collect()
    });

    let mut branches = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(branch) => branches.push(branch),
            Err(SearchAbort::Stopped) => {}
            Err(SearchAbort::Fault(err)) => return Err(err),
        }
    }
    Ok(branches)
}

/// Fixed-depth search to `config.max_depth`.
pub fn search<S: BoardScorer + ?Sized>(
    position: &Position,
    config: &SearchConfig,
    scorer: &S,
) -> ChessResult<SearchResult> {
    let shared = SharedSearchState::new(config.limits);
    let pool = config.threading.build_pool()?;
    search_with_state(position, config, scorer, &shared, pool.as_ref())
}

/// Fixed-depth search with caller-owned stop state and pool.
pub fn search_with_state<S: BoardScorer + ?Sized>(
    position: &Position,
    config: &SearchConfig,
    scorer: &S,
    shared: &SharedSearchState,
    pool: Option<&ThreadPool>,
) -> ChessResult<SearchResult> {
    let outcome = search_depth(position, config.max_depth, config, scorer, shared, pool)?;
    let result = SearchResult {
        best_move: outcome.best_move,
        score: outcome.score,
        nodes: shared.nodes(),
        reached_depth: if outcome.completed { config.max_depth } else { 0 },
        interrupted: !outcome.completed,
    };

    info!(
        "search depth {} best {} score {} nodes {} in {:?}",
        config.max_depth,
        result.best_move.map_or_else(|| "none".to_string(), |mv| mv.to_string()),
        result.score,
        result.nodes,
        shared.elapsed()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::board_scoring::{MaterialScorer, StandardEvaluator, MATE_SCORE};

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("FEN should parse")
    }

    fn config(depth: u8) -> SearchConfig {
        SearchConfig {
            max_depth: depth,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn search_depth_zero_returns_eval_only() {
        let result = search(&Position::new_game(), &config(0), &MaterialScorer)
            .expect("search should run");
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0);
        assert_eq!(result.reached_depth, 0);
        assert!(!result.interrupted);
    }

    #[test]
    fn search_takes_the_hanging_queen() {
        let game = position("4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1");
        let result = search(&game, &config(2), &MaterialScorer).expect("search should run");
        let best = result.best_move.expect("best move should exist");
        assert_eq!(best.to, "e2".parse::<Square>().expect("e2"));
        assert_eq!(result.reached_depth, 2);
    }

    #[test]
    fn search_finds_mate_in_one() {
        let game = position("6k1/5Q2/6K1/8/8/8/8/8 w - - 0 1");
        let result = search(&game, &config(1), &MaterialScorer).expect("search should run");

        let best = result.best_move.expect("best move should exist");
        let next = game.apply_move(best).expect("best move should apply");
        assert_eq!(
            next.result(),
            Some(GameResult::Checkmate {
                loser: Color::Black
            })
        );
        assert_eq!(result.score, MATE_SCORE - 1);
    }

    #[test]
    fn quicker_mate_scores_higher() {
        let game = position("6k1/5Q2/6K1/8/8/8/8/8 w - - 0 1");
        let deep = search(&game, &config(3), &MaterialScorer).expect("search should run");
        assert_eq!(deep.score, MATE_SCORE - 1);
    }

    #[test]
    fn finished_game_has_no_best_move() {
        let mate = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let result = search(&mate, &config(2), &MaterialScorer).expect("search should run");
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -MATE_SCORE);
    }

    #[test]
    fn alpha_beta_matches_minimax() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ];
        for fen in fens {
            let game = position(fen);
            for depth in 1..=2 {
                let exhaustive = minimax_score(&game, depth, &MaterialScorer).expect("minimax");
                let pruned = search(&game, &config(depth), &MaterialScorer).expect("search");
                assert_eq!(pruned.score, exhaustive, "{fen} at depth {depth}");
            }
        }
    }

    #[test]
    fn move_ordering_never_changes_the_score() {
        let game = position("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let evaluator = StandardEvaluator::default();
        let ordered = search(&game, &config(2), &evaluator).expect("search");
        let unordered = search(
            &game,
            &SearchConfig {
                move_ordering: false,
                ..config(2)
            },
            &evaluator,
        )
        .expect("search");
        assert_eq!(ordered.score, unordered.score);
    }

    #[test]
    fn parallel_root_agrees_with_sequential() {
        let game = position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let sequential = search(&game, &config(2), &MaterialScorer).expect("search");
        for cross_branch_pruning in [false, true] {
            let parallel = search(
                &game,
                &SearchConfig {
                    threading: ThreadingConfig::root_split(4),
                    cross_branch_pruning,
                    ..config(2)
                },
                &MaterialScorer,
            )
            .expect("search");
            assert_eq!(parallel.best_move, sequential.best_move);
            assert_eq!(parallel.score, sequential.score);
        }
    }

    #[test]
    fn expired_deadline_falls_back_to_first_ordered_move() {
        let game = Position::new_game();
        let result = search(
            &game,
            &SearchConfig {
                limits: SearchLimits {
                    node_budget: None,
                    time_budget_ms: Some(0),
                },
                ..config(3)
            },
            &MaterialScorer,
        )
        .expect("search should still answer");

        assert!(result.interrupted);
        assert_eq!(result.reached_depth, 0);
        let first = order_moves(&game, game.legal_moves(Color::White))
            .expect("ordering")
            .first()
            .copied();
        assert_eq!(result.best_move, first);
    }

    /// Start position with a black bishop stacked on the b8 knight. The root
    /// still generates moves, but every child fails the invariant check.
    fn stacked_piece_position() -> Position {
        let mut game = Position::new_game();
        game.pieces[Color::Black.index()][PieceKind::Bishop.index()] |= Square::B8.bit();
        game
    }

    #[test]
    fn corrupted_children_fail_the_search_in_every_threading_mode() {
        let game = stacked_piece_position();
        assert!(!game.legal_moves(Color::White).is_empty());

        for threading in [ThreadingConfig::default(), ThreadingConfig::root_split(4)] {
            for cross_branch_pruning in [false, true] {
                let outcome = search(
                    &game,
                    &SearchConfig {
                        threading,
                        cross_branch_pruning,
                        ..config(2)
                    },
                    &MaterialScorer,
                );
                assert!(
                    matches!(outcome, Err(ChessError::InvariantViolation(_))),
                    "{threading:?} pruning {cross_branch_pruning}: {outcome:?}"
                );
            }
        }
    }

    #[test]
    fn minimax_reports_corrupted_children() {
        let outcome = minimax_score(&stacked_piece_position(), 1, &MaterialScorer);
        assert!(matches!(outcome, Err(ChessError::InvariantViolation(_))));
    }

    #[test]
    fn raise_bound_is_monotonic() {
        let bound = AtomicI32::new(-SCORE_INFINITY);
        raise_bound(&bound, 10);
        raise_bound(&bound, 5);
        assert_eq!(bound.load(Ordering::Relaxed), 10);
    }
}
