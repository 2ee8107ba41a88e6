use codeplag::{
    extract, CanonicalFeatures, Comparator, CompareConfig, CorpusOrchestrator, ExtractConfig,
    Language, RunConfig, SourceUnit,
};
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A Python work with `blocks` loop bodies; `seed` varies the literals.
fn synthetic_work(origin: &str, blocks: usize, seed: usize) -> SourceUnit {
    let body: String = (0..blocks)
        .map(|i| {
            format!(
                "    for j in range({n}):\n        if j % {m} == 0:\n            acc += j * {k}\n        else:\n            acc -= 1\n",
                n = i + seed,
                m = (i % 5) + 2,
                k = seed,
            )
        })
        .collect();
    SourceUnit::new(
        origin,
        Language::Py,
        format!("def work(acc):\n{body}    return acc\n"),
    )
    .expect("valid unit")
}

fn features(blocks: usize, seed: usize) -> CanonicalFeatures {
    extract(&synthetic_work("bench.py", blocks, seed), &ExtractConfig::default())
        .expect("extract should succeed")
}

/// Fast vs precise metric as works grow
fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    let comparator = Comparator::new(CompareConfig::default()).expect("valid config");

    for blocks in [10usize, 50, 200] {
        let a = features(blocks, 3);
        let b = features(blocks, 7);
        group.throughput(Throughput::Elements(a.head_sequence.len() as u64));

        group.bench_with_input(BenchmarkId::new("fast", blocks), &blocks, |bench, _| {
            bench.iter(|| comparator.fast(black_box(&a), black_box(&b)))
        });
        group.bench_with_input(BenchmarkId::new("precise", blocks), &blocks, |bench, _| {
            bench.iter(|| comparator.precise(black_box(&a), black_box(&b)))
        });
    }

    group.finish();
}

/// Extraction cost per language backend input size
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let cfg = ExtractConfig::default();

    for blocks in [10usize, 100] {
        let unit = synthetic_work("bench.py", blocks, 1);
        group.throughput(Throughput::Bytes(unit.text().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &unit, |bench, unit| {
            bench.iter(|| extract(black_box(unit), &cfg))
        });
    }

    group.finish();
}

/// Whole many_to_many run, extraction and scheduling included
fn bench_corpus(c: &mut Criterion) {
    let mut group = c.benchmark_group("corpus_many_to_many");
    group.sample_size(10);
    let orchestrator = CorpusOrchestrator::new(
        ExtractConfig::default(),
        CompareConfig::default(),
        RunConfig::default(),
    )
    .expect("valid config");

    for works in [10usize, 40] {
        let units: Vec<SourceUnit> = (0..works)
            .map(|i| synthetic_work(&format!("w{i}.py"), 20, i))
            .collect();
        group.throughput(Throughput::Elements((works * (works - 1) / 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(works), &units, |bench, units| {
            bench.iter(|| orchestrator.many_to_many(units.clone()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_metrics, bench_extract, bench_corpus);
criterion_main!(benches);
