//! Performance benchmarks for evograph

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evograph::graph::{MutationConfig, Network};
use evograph::sample::xor_samples;
use evograph::{Config, Trainer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn grown_network(mutations: usize) -> Network {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let config = MutationConfig::default();

    let mut net = Network::new(8, 4, &mut rng);
    for _ in 0..mutations {
        net.mutate(&mut rng, &config);
    }
    net
}

fn benchmark_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed");
    let inputs = [0.5f64; 8];

    for mutations in [0, 50, 200].iter() {
        let mut net = grown_network(*mutations);

        group.bench_with_input(
            BenchmarkId::new("mutations", mutations),
            mutations,
            |b, _| {
                b.iter(|| {
                    net.feed(black_box(&inputs)).unwrap();
                    net.output()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_mutation(c: &mut Criterion) {
    let config = MutationConfig::default();

    c.bench_function("mutate_grown_network", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let net = grown_network(100);
        b.iter(|| {
            let mut clone = net.clone();
            for _ in 0..3 {
                clone.mutate(&mut rng, &config);
            }
            clone
        });
    });
}

fn benchmark_structural_hash(c: &mut Criterion) {
    let net = grown_network(200);

    c.bench_function("structural_hash", |b| {
        b.iter(|| black_box(&net).structural_hash());
    });
}

fn benchmark_xor_generation(c: &mut Criterion) {
    let samples = xor_samples();

    c.bench_function("xor_train_short", |b| {
        b.iter(|| {
            let mut config = Config::default();
            config.population.size = 16;
            config.population.survivors = 4;
            config.evolution.epochs = 3;
            config.runtime.seed = Some(1);
            config.runtime.workers = 2;

            let mut trainer = Trainer::new(config).unwrap();
            let population = trainer.initial_population();
            trainer.train(population, &samples).unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_feed,
    benchmark_mutation,
    benchmark_structural_hash,
    benchmark_xor_generation
);
criterion_main!(benches);
