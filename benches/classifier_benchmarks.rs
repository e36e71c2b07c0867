//! # Fraudbayes Performance Benchmarks
//!
//! Measures the two hot paths against an in-memory counting source:
//! - Classification (joint scoring with and without the count memo)
//! - K2 structure learning
//!

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::num::NonZeroUsize;

use fraudbayes::{
    learn_structure, Classifier, ClassifierConfig, DomainRegistry, GreedyForward,
    MemoryCounts,
};

/// Creates a synthetic transaction table for benchmarking.
///
/// Deterministic structure for reproducibility: codes are derived from the
/// row index with prime multipliers, and fraud is biased toward high amounts.
fn create_synthetic_dataset(num_rows: usize) -> (DomainRegistry, MemoryCounts) {
    let registry = DomainRegistry::from_mappings([
        ("age", vec!["1", "2", "3", "4", "5"]),
        ("gender", vec!["M", "F"]),
        ("category", vec!["travel", "health", "tech", "food"]),
        ("amount_bin", vec!["very_low", "low", "medium", "high"]),
        ("fraud", vec!["no", "yes"]),
    ])
    .unwrap();

    let mut counts = MemoryCounts::default();
    for i in 0..num_rows {
        let age = (i * 7) % 5;
        let gender = (i * 3) % 2;
        let category = (i * 11) % 4;
        let amount = (i * 13) % 4;
        let fraud = usize::from(amount == 3 && i % 5 == 0);
        counts.push(vec![age, gender, category, amount, fraud]);
    }
    (registry, counts)
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for size in [1_000usize, 10_000, 100_000] {
        let (registry, counts) = create_synthetic_dataset(size);

        let cached = Classifier::new(
            registry.clone(),
            counts.clone(),
            ClassifierConfig::default(),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("cached", size), &size, |b, _| {
            b.iter(|| {
                let outcome = cached
                    .classify(black_box([
                        ("age", "2"),
                        ("gender", "F"),
                        ("category", "travel"),
                        ("amount_bin", "high"),
                    ]))
                    .unwrap();
                black_box(outcome.score)
            })
        });

        let uncached = Classifier::new(
            registry,
            counts,
            ClassifierConfig {
                cache_capacity: None,
                ..ClassifierConfig::default()
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("uncached", size), &size, |b, _| {
            b.iter(|| {
                let outcome = uncached
                    .classify(black_box([
                        ("age", "2"),
                        ("gender", "F"),
                        ("category", "travel"),
                        ("amount_bin", "high"),
                    ]))
                    .unwrap();
                black_box(outcome.score)
            })
        });
    }

    group.finish();
}

fn bench_structure_learning(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure_learning");
    group.sample_size(10);

    let order = ["age", "gender", "category", "amount_bin", "fraud"];
    for size in [1_000usize, 10_000] {
        let (registry, counts) = create_synthetic_dataset(size);
        let classifier = Classifier::new(
            registry,
            counts,
            ClassifierConfig {
                cache_capacity: NonZeroUsize::new(50_000),
                ..ClassifierConfig::default()
            },
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("k2_greedy_u2", size), &size, |b, _| {
            b.iter(|| {
                let strategy = GreedyForward { max_parents: 2 };
                let hypothesis = learn_structure(
                    classifier.counts(),
                    classifier.registry(),
                    1.0,
                    &strategy,
                    black_box(&order),
                )
                .unwrap();
                black_box(hypothesis)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classification, bench_structure_learning);
criterion_main!(benches);
