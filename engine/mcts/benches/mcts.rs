//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full MCTS search with varying simulation counts
//! - Oracle-guided search versus rollout ("classic") search
//! - Tree operations (selection, backpropagation, policy extraction)
//! - Search from different positions (opening, midgame)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::Game;
use games_connect4::Connect4;
use games_pylos::Pylos;
use mcts::{
    run_mcts, MctsConfig, MctsTree, OracleEvaluator, RolloutEvaluator, UniformEvaluator,
    UniformOracle,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Connect4 position after playing a sequence of columns.
fn connect4_after(moves: &[usize]) -> Connect4 {
    let mut game = Connect4::new();
    for &col in moves {
        game.step(col).unwrap();
    }
    game
}

// =============================================================================
// Full MCTS Search Benchmarks
// =============================================================================

fn bench_mcts_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_simulations");

    for sims in [16, 64, 128, 256] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("connect4", sims), &sims, |b, &sims| {
            let oracle = UniformOracle::new(7);
            let evaluator = OracleEvaluator::new(&oracle);
            let config = MctsConfig::for_testing().with_simulations(sims);
            let mut game = Connect4::new();

            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(42);
                black_box(run_mcts(&mut game, &evaluator, config.clone(), &mut rng).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_evaluators(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_evaluators");
    let config = MctsConfig::for_testing().with_simulations(64);

    group.bench_function("uniform", |b| {
        let evaluator = UniformEvaluator::new();
        let mut game = Connect4::new();
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(7);
            black_box(run_mcts(&mut game, &evaluator, config.clone(), &mut rng).unwrap())
        });
    });

    group.bench_function("rollout", |b| {
        let evaluator = RolloutEvaluator::new();
        let mut game = Connect4::new();
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(7);
            black_box(run_mcts(&mut game, &evaluator, config.clone(), &mut rng).unwrap())
        });
    });

    group.finish();
}

fn bench_game_positions(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_positions");
    let evaluator = UniformEvaluator::new();
    let config = MctsConfig::for_testing().with_simulations(128);

    let positions: [(&str, Vec<usize>); 2] = [
        ("opening", vec![]),
        ("midgame", vec![3, 3, 2, 4, 2, 2, 4, 1, 5, 0]),
    ];

    for (name, moves) in positions {
        group.bench_function(BenchmarkId::new("connect4", name), |b| {
            let mut game = connect4_after(&moves);
            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(1);
                black_box(run_mcts(&mut game, &evaluator, config.clone(), &mut rng).unwrap())
            });
        });
    }

    group.bench_function(BenchmarkId::new("pylos", "opening"), |b| {
        let mut game = Pylos::new();
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(1);
            black_box(run_mcts(&mut game, &evaluator, config.clone(), &mut rng).unwrap())
        });
    });

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

/// Build a two-level tree with `width` children per node.
fn build_tree(width: usize) -> MctsTree {
    let mut tree = MctsTree::new();
    let root = tree.root();
    let prior = 1.0 / width as f32;
    for a in 0..width {
        let child = tree.add_child(root, a, prior);
        for b in 0..width {
            let grandchild = tree.add_child(child, b, prior);
            tree.backpropagate(grandchild, if (a + b) % 2 == 0 { 1.0 } else { -1.0 });
        }
    }
    tree
}

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    for width in [7, 30] {
        let tree = build_tree(width);
        group.bench_with_input(BenchmarkId::new("select_child", width), &tree, |b, tree| {
            b.iter(|| black_box(tree.select_child(tree.root(), 1.5)))
        });
        group.bench_with_input(BenchmarkId::new("root_policy", width), &tree, |b, tree| {
            b.iter(|| black_box(tree.root_policy(width)))
        });
    }

    group.bench_function("backpropagate_depth_2", |b| {
        let mut tree = build_tree(7);
        let leaf = tree.get(tree.get(tree.root()).children[3].1).children[4].1;
        b.iter(|| tree.backpropagate(black_box(leaf), 0.5))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mcts_search_simulations,
    bench_evaluators,
    bench_game_positions,
    bench_tree_operations
);
criterion_main!(benches);
