use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use amsel_chess::game_state::chess_types::Position;
use amsel_chess::search::alpha_beta::{search, SearchConfig};
use amsel_chess::search::board_scoring::{BoardScorer, StandardEvaluator};
use amsel_chess::search::threading::ThreadingConfig;

const POSITIONS: &[(&str, &str)] = &[
    (
        "startpos",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "italian",
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    ),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("rook_endgame", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
];

fn selected_depth() -> u8 {
    match std::env::var("AMSEL_BENCH_SUITE") {
        Ok(value) if value.eq_ignore_ascii_case("standard") => 4,
        _ => 3,
    }
}

fn bench_evaluation(c: &mut Criterion) {
    let evaluator = StandardEvaluator::default();
    let mut group = c.benchmark_group("evaluation");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for (name, fen) in POSITIONS {
        let game = Position::from_fen(fen).expect("benchmark FEN should parse");
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| black_box(evaluator.score_millipawns(black_box(&game))));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let depth = selected_depth();
    let evaluator = StandardEvaluator::default();
    let threads = std::thread::available_parallelism().map_or(2, |n| n.get()).max(2);

    let mut group = c.benchmark_group(format!("search_d{depth}"));
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for (name, fen) in POSITIONS {
        let game = Position::from_fen(fen).expect("benchmark FEN should parse");
        let sequential = SearchConfig {
            max_depth: depth,
            ..SearchConfig::default()
        };
        let parallel = SearchConfig {
            threading: ThreadingConfig::root_split(threads),
            ..sequential
        };

        // Both modes must agree before their timings mean anything.
        let expected = search(&game, &sequential, &evaluator).expect("search should run");
        let threaded = search(&game, &parallel, &evaluator).expect("search should run");
        assert_eq!(expected.best_move, threaded.best_move, "{name}");

        for (mode, config) in [("sequential", sequential), ("parallel", parallel)] {
            group.bench_function(BenchmarkId::new(mode, name), |b| {
                b.iter(|| {
                    let result = search(black_box(&game), &config, &evaluator)
                        .expect("search benchmark run should succeed");
                    black_box(result.score)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(search_benches, bench_evaluation, bench_search);
criterion_main!(search_benches);
