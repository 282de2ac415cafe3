// ========================================================================================
//
//                      Selection and scoring benchmark
//
// ========================================================================================
//
// Measures the O(n * W) portfolio table across batch sizes and week budgets, and the
// sequential versus rayon scoring paths on one large batch.
//
// ========================================================================================

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use idearank::model::Model;
use idearank::pipeline::Pipeline;
use idearank::portfolio::{KnapsackItem, solve};
use idearank::types::Idea;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// --- Benchmark Tuning Parameters ---

/// Batch sizes for the selection table.
const IDEA_COUNTS: [usize; 3] = [50, 200, 1000];
/// Week budgets: a quarter, a year and the default ceiling.
const BUDGETS: [usize; 3] = [13, 52, 4096];
/// Ideas scored per iteration in the pipeline group.
const SCORING_BATCH: usize = 20_000;

fn random_items(rng: &mut StdRng, n: usize) -> Vec<KnapsackItem> {
    (0..n)
        .map(|_| KnapsackItem {
            weeks: rng.gen_range(1.0..26.0),
            value: rng.gen_range(0.0..250_000.0),
        })
        .collect()
}

fn random_ideas(rng: &mut StdRng, n: usize) -> Vec<Idea> {
    (0..n)
        .map(|_| {
            Idea::new(
                rng.r#gen(),
                rng.r#gen(),
                rng.gen_range(0.0..100_000.0),
                rng.gen_range(1.0..26.0),
                rng.r#gen(),
            )
        })
        .collect()
}

fn bench_selection(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut group = c.benchmark_group("knapsack_solve");
    for &n in &IDEA_COUNTS {
        let items = random_items(&mut rng, n);
        for &budget in &BUDGETS {
            group.throughput(Throughput::Elements((n * (budget + 1)) as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("n{n}"), budget),
                &budget,
                |b, &capacity| b.iter(|| solve(black_box(&items), capacity)),
            );
        }
    }
    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let ideas = random_ideas(&mut rng, SCORING_BATCH);
    let model = Model::embedded_default();

    let mut group = c.benchmark_group("score_all");
    group.throughput(Throughput::Elements(SCORING_BATCH as u64));
    group.bench_function("sequential", |b| {
        let pipeline = Pipeline::new(&model, 1.0).with_parallel_threshold(usize::MAX);
        b.iter(|| pipeline.score_all(black_box(&ideas)))
    });
    group.bench_function("parallel", |b| {
        let pipeline = Pipeline::new(&model, 1.0).with_parallel_threshold(0);
        b.iter(|| pipeline.score_all(black_box(&ideas)))
    });
    group.finish();
}

criterion_group!(benches, bench_selection, bench_scoring);
criterion_main!(benches);
