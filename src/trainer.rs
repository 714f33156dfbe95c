//! Generational population trainer.
//!
//! Runs the `Evaluating -> Selecting -> Refilling -> Deduplicating` loop:
//! concurrent fitness evaluation on a fixed-size worker pool, truncation
//! selection, clone-and-mutate refill, and structural-hash deduplication.
//! Mutation happens strictly after the evaluation barrier, single-threaded,
//! so evaluation and mutation never overlap on the same network.

use crate::config::Config;
use crate::error::EngineError;
use crate::graph::Network;
use crate::sample::Sample;
use crate::stats::{GenerationStats, StatsHistory};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashSet;

/// Bound on refill/dedup rounds within one generation. Mutated clones almost
/// always hash fresh, so hitting this means the mutation weights are
/// degenerate; the trainer then continues with a smaller population.
const MAX_REFILL_ROUNDS: usize = 32;

/// Drives a population of networks through generations of mutation and
/// truncation selection until one fits the sample set or the epoch budget
/// runs out.
pub struct Trainer {
    config: Config,
    pool: rayon::ThreadPool,
    rng: ChaCha8Rng,
    seed: u64,
    /// Per-generation statistics of the current run.
    pub history: StatsHistory,
}

impl Trainer {
    /// Build a trainer with its worker pool and seeded rng.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.runtime.workers)
            .build()?;

        let seed = config
            .runtime
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        Ok(Self {
            config,
            pool,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            history: StatsHistory::new(0),
        })
    }

    /// Seed of the mutation rng, for reproducing a run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Build the initial population: minimal fully connected networks, each
    /// pre-seeded with a single growth mutation so the first generation
    /// already carries some structural variety. An add that lands on an
    /// existing edge falls back to a split, so every network grows.
    pub fn initial_population(&mut self) -> Vec<Network> {
        let shape = self.config.network.clone();
        let mut population = Vec::with_capacity(self.config.population.size);

        for _ in 0..self.config.population.size {
            let mut net = Network::new(shape.num_inputs, shape.num_outputs, &mut self.rng);
            let added = self.rng.gen_ratio(1, 10) && net.add_random_edge(&mut self.rng);
            if !added {
                net.split_random_edge(&mut self.rng);
            }
            population.push(net);
        }

        population
    }

    /// Evolve the population against the sample set.
    ///
    /// Returns the final population sorted best-first, cleaned with
    /// `dedup_edges` and `remove_dead_ends` and re-evaluated. Terminates on
    /// a perfect score (zero error, only after at least one full generation)
    /// or when the epoch budget is exhausted.
    pub fn train(
        &mut self,
        mut population: Vec<Network>,
        samples: &[Sample],
    ) -> Result<Vec<Network>, EngineError> {
        if population.is_empty() {
            return Err(EngineError::EmptyPopulation);
        }
        if samples.is_empty() {
            return Err(EngineError::EmptySampleSet);
        }

        let target = self.config.population.size;
        let survivors = self.config.population.survivors;
        let prune_interval = self.config.evolution.prune_interval;

        info!(
            "training {} networks ({} survivors per generation) on {} samples, seed {}",
            population.len(),
            survivors,
            samples.len(),
            self.seed
        );

        let mut culled_last = 0;

        for epoch in 0..self.config.evolution.epochs {
            // Periodic structural cleanup across the whole population.
            if prune_interval > 0 && epoch > 0 && epoch % prune_interval == 0 {
                for net in &mut population {
                    net.dedup_edges();
                    net.remove_dead_ends();
                }
            }

            self.evaluate(&mut population, samples)?;
            self.rank(&mut population);

            let stats = GenerationStats::capture(epoch, &population, culled_last);
            if epoch % self.config.logging.stats_interval == 0 {
                info!("{}", stats.summary());
            } else {
                debug!("{}", stats.summary());
            }
            self.history.push(stats);

            if epoch > 0 && population[0].total_error == 0.0 {
                info!("perfect score reached at epoch {epoch}");
                break;
            }

            population.truncate(survivors);

            culled_last = 0;
            for round in 0..MAX_REFILL_ROUNDS {
                self.refill(&mut population, target);
                culled_last += Self::dedup(&mut population);
                if population.len() >= target {
                    break;
                }
                if round + 1 == MAX_REFILL_ROUNDS {
                    warn!(
                        "population stuck at {} of {} after dedup, continuing short",
                        population.len(),
                        target
                    );
                }
            }
        }

        // Final cleanup changes semantics (duplicate edges contribute twice
        // to a reduction), so errors are recomputed before the final ranking.
        for net in &mut population {
            net.dedup_edges();
            net.remove_dead_ends();
        }
        self.evaluate(&mut population, samples)?;
        self.rank(&mut population);

        info!(
            "training done: best error {:.5} with {} edges",
            population[0].total_error,
            population[0].edge_count()
        );

        Ok(population)
    }

    /// Dispatch every network to the worker pool exactly once and block
    /// until all evaluations complete. Each worker touches only its own
    /// network's cached error fields.
    fn evaluate(
        &self,
        population: &mut [Network],
        samples: &[Sample],
    ) -> Result<(), EngineError> {
        self.pool.install(|| {
            population
                .par_iter_mut()
                .try_for_each(|net| net.update_total_error(samples))
        })
    }

    /// Sort the population descending by performance. The exploration roll
    /// happens per network and generation, so occasionally a large,
    /// low-error individual outranks the usual size-penalized order.
    fn rank(&mut self, population: &mut Vec<Network>) {
        let explore_rate = self.config.evolution.explore_rate;

        let mut scored: Vec<(f64, Network)> = population
            .drain(..)
            .map(|net| {
                let explore = explore_rate > 0.0 && self.rng.gen_bool(explore_rate);
                (net.performance(explore), net)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        population.extend(scored.into_iter().map(|(_, net)| net));
    }

    /// Refill the population to `target` by cloning survivors round-robin
    /// and mutating each clone 1..=max_mutations times. Survivors themselves
    /// occasionally pick up a light mutation in place.
    fn refill(&mut self, population: &mut Vec<Network>, target: usize) {
        let survivors = population.len();
        debug_assert!(survivors > 0);

        let mutation = self.config.mutation.clone();
        let survivor_mutation_rate = self.config.evolution.survivor_mutation_rate;

        let mut parent = 0;
        while population.len() < target {
            let mut clone = population[parent % survivors].clone();

            let count = self.rng.gen_range(1..=mutation.max_mutations);
            for _ in 0..count {
                clone.mutate(&mut self.rng, &mutation);
            }

            if survivor_mutation_rate > 0.0 && self.rng.gen_bool(survivor_mutation_rate) {
                population[parent % survivors].mutate(&mut self.rng, &mutation);
            }

            population.push(clone);
            parent += 1;
        }
    }

    /// Keep one representative per structural hash, preferring the earlier
    /// (better-ranked) individual. Returns the number of discards.
    fn dedup(population: &mut Vec<Network>) -> usize {
        let before = population.len();

        let mut seen = HashSet::with_capacity(population.len());
        population.retain(|net| seen.insert(net.structural_hash()));

        before - population.len()
    }
}
