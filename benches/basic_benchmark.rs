use criterion::measurement::WallTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput};

use metastable::id::Id;
use metastable::snowball::{Color, Instance, Tally};

pub fn run_instance_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("instance_benchmark");
    let iterations = vec![100, 1000, 10000];

    transition_benchmark(&mut group, iterations.clone());
    flip_flop_benchmark(&mut group, iterations.clone());

    group.finish();
}

pub fn run_tally_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally_benchmark");
    let samples = vec![10, 20, 100];

    tally_benchmark(&mut group, samples);

    group.finish();
}

fn transition_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("transition", i), i, |b, i| {
            b.iter(|| {
                // never decides, so every round goes through the full transition
                let mut instance = Instance::new(*i as usize + 1);
                for _ in 0..*i {
                    instance.transition(black_box(Some(Color(1))));
                }
                instance.snapshot()
            })
        });
    }
}

fn flip_flop_benchmark(group: &mut BenchmarkGroup<WallTime>, iterations: Vec<u64>) {
    for i in iterations.iter() {
        group.throughput(Throughput::Elements(*i));
        group.bench_with_input(BenchmarkId::new("flip_flop", i), i, |b, i| {
            b.iter(|| {
                let mut instance = Instance::new(3);
                for round in 0..*i {
                    let result = match round % 3 {
                        0 => Some(Color(1)),
                        1 => Some(Color(2)),
                        _ => None,
                    };
                    instance.transition(black_box(result));
                }
                instance.snapshot()
            })
        });
    }
}

fn tally_benchmark(group: &mut BenchmarkGroup<WallTime>, samples: Vec<usize>) {
    for k in samples.iter() {
        let responders: Vec<Id> = (0..*k).map(|i| Id::new(&i.to_le_bytes())).collect();
        group.throughput(Throughput::Elements(*k as u64));
        group.bench_with_input(BenchmarkId::new("tally", k), k, |b, k| {
            b.iter(|| {
                let mut tally = Tally::new((*k * 4 + 4) / 5);
                for (i, responder) in responders.iter().enumerate() {
                    let _ = tally.insert(*responder, Color((i % 3 == 0) as u32));
                }
                tally.decide()
            })
        });
    }
}

criterion_group!(benches, run_instance_benchmark, run_tally_benchmark);
criterion_main!(benches);
