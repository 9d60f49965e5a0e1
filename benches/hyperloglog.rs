use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nostr_hll::{HyperLogLog, KEY_LEN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Update and estimate are benchmarked at cardinalities doubling from 1
/// up to `MAX_CARDINALITY`.
const MAX_CARDINALITY: usize = 65_536;

criterion_group!(benches, benchmark);
criterion_main!(benches);

fn random_keys(n: usize) -> Vec<[u8; KEY_LEN]> {
    let mut rng = StdRng::seed_from_u64(45);
    (0..n).map(|_| rng.gen()).collect()
}

fn benchmark(c: &mut Criterion) {
    let cardinalities: Vec<usize> = (0..usize::BITS)
        .map(|exp| 1usize << exp)
        .take_while(|&n| n <= MAX_CARDINALITY)
        .collect();
    let keys = random_keys(MAX_CARDINALITY);

    let mut group = c.benchmark_group("update");
    for &cardinality in &cardinalities {
        group.throughput(Throughput::Elements(cardinality as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(cardinality),
            &keys[..cardinality],
            |b, keys| {
                b.iter(|| {
                    let mut counter = HyperLogLog::new(8).unwrap();
                    for key in keys {
                        counter.update(black_box(key));
                    }
                    counter
                })
            },
        );
    }
    group.finish();

    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));
    for &cardinality in &cardinalities {
        let mut counter = HyperLogLog::new(8).unwrap();
        for key in &keys[..cardinality] {
            counter.update(key);
        }
        group.bench_with_input(
            BenchmarkId::from_parameter(cardinality),
            &counter,
            |b, counter| b.iter(|| black_box(counter).estimate()),
        );
    }
    group.finish();

    let mut group = c.benchmark_group("merge");
    group.throughput(Throughput::Elements(1));
    let mut lhs = HyperLogLog::new(8).unwrap();
    let mut rhs = HyperLogLog::new(8).unwrap();
    for pair in keys.chunks(2) {
        lhs.update(&pair[0]);
        rhs.update(&pair[1]);
    }
    group.bench_function("saturated_counters", |b| {
        b.iter(|| {
            let mut merged = lhs.clone();
            merged.merge(black_box(&rhs));
            merged
        })
    });
    group.finish();
}
