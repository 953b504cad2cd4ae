mod common;

use amsel_chess::engines::engine_alpha_beta::AlphaBetaEngine;
use amsel_chess::game_state::chess_types::*;
use amsel_chess::search::alpha_beta::{minimax_score, search, SearchConfig};
use amsel_chess::search::board_scoring::{MaterialScorer, StandardEvaluator, MATE_THRESHOLD};
use amsel_chess::search::threading::ThreadingConfig;

use common::{position, positions};

fn config(depth: u8) -> SearchConfig {
    SearchConfig {
        max_depth: depth,
        ..SearchConfig::default()
    }
}

#[test]
fn alpha_beta_equals_minimax_up_to_depth_three() {
    for fen in [positions::ENDGAME_ROOKS, positions::MATE_IN_1_BLACK] {
        let game = position(fen);
        for depth in 1..=3 {
            let exhaustive = minimax_score(&game, depth, &MaterialScorer).expect("minimax");
            let pruned = search(&game, &config(depth), &MaterialScorer).expect("search");
            assert_eq!(pruned.score, exhaustive, "{fen} at depth {depth}");
        }
    }
}

#[test]
fn alpha_beta_equals_minimax_with_the_full_evaluator() {
    let evaluator = StandardEvaluator::default();
    for fen in [positions::STARTING, positions::ITALIAN] {
        let game = position(fen);
        let exhaustive = minimax_score(&game, 2, &evaluator).expect("minimax");
        let pruned = search(&game, &config(2), &evaluator).expect("search");
        assert_eq!(pruned.score, exhaustive, "{fen}");
    }
}

#[test]
fn parallel_and_sequential_searches_agree() {
    let evaluator = StandardEvaluator::default();
    for fen in [positions::ITALIAN, positions::KIWIPETE, positions::ENDGAME_ROOKS] {
        let game = position(fen);
        let sequential = search(&game, &config(2), &evaluator).expect("search");
        let parallel = search(
            &game,
            &SearchConfig {
                threading: ThreadingConfig::root_split(4),
                ..config(2)
            },
            &evaluator,
        )
        .expect("search");

        assert_eq!(parallel.best_move, sequential.best_move, "{fen}");
        assert_eq!(parallel.score, sequential.score, "{fen}");
    }
}

#[test]
fn engine_finds_back_rank_mates_for_both_sides() {
    let engine = AlphaBetaEngine::new(3);
    for (fen, expected) in [
        (positions::MATE_IN_1_WHITE, "e1e8"),
        (positions::MATE_IN_1_BLACK, "e8e1"),
    ] {
        let game = position(fen);
        let best = engine.find_best_move(&game, 2).expect("a move exists");
        assert_eq!(best.to_string(), expected);

        let result = engine.search(&game, 2).expect("search");
        assert!(result.score >= MATE_THRESHOLD, "{fen}: {}", result.score);
        assert!(game
            .apply_move(best)
            .expect("best move applies")
            .result()
            .is_some_and(|r| r.winner() == Some(game.side_to_move())));
    }
}
