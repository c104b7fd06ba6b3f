//! Matchmaker throughput benchmark: enqueue a population of players with
//! normally-distributed ratings and time one full matching pass.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::Rng;

use pvp_core::matchmaking::{MatchRequest, Matchmaker};

fn build_matchmaker(population: usize) -> Matchmaker {
    let mm = Matchmaker::new();
    let mut rng = rand::thread_rng();
    for i in 0..population {
        let rating = 1200 + rng.gen_range(-400..=400);
        mm.enqueue(MatchRequest {
            player_id: format!("player-{i}"),
            rating,
            enqueue_time: 0.0,
            preferred_region: "any".to_string(),
        });
    }
    mm
}

fn bench_run_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matchmaker_run_matching");
    for &population in &[64usize, 512, 2048] {
        group.bench_function(format!("population_{population}"), |b| {
            b.iter_batched(
                || build_matchmaker(population),
                |mm| {
                    black_box(mm.run_matching(30.0));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run_matching);
criterion_main!(benches);
