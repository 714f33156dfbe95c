//! # evograph
//!
//! Evolving computational-graph engine: weight-agnostic networks whose
//! topology and per-node operators are evolved, not trained by gradient
//! descent, to fit a labeled sample set.
//!
//! ## Features
//!
//! - **Structural evolution**: add/remove/split-edge mutations plus edge
//!   dedup and dead-end pruning, all preserving single-pass evaluability
//! - **Parallel**: fitness evaluation fans out over a rayon worker pool
//! - **Diverse**: populations deduplicated by canonical structural hash
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded mutation sequences (evaluation noise from the
//!   Gauss operator stays intentionally random)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evograph::{Config, Trainer};
//! use evograph::sample::xor_samples;
//!
//! let mut config = Config::default();
//! config.runtime.seed = Some(42);
//!
//! let mut trainer = Trainer::new(config).unwrap();
//! let population = trainer.initial_population();
//! let result = trainer.train(population, &xor_samples()).unwrap();
//!
//! let best = &result[0];
//! println!("error: {}, edges: {}", best.total_error, best.edge_count());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use evograph::Config;
//!
//! let mut config = Config::default();
//! config.population.size = 128;
//! config.evolution.epochs = 500;
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod mnist;
pub mod sample;
pub mod stats;
pub mod trainer;

// Re-export main types
pub use config::Config;
pub use error::EngineError;
pub use graph::{MutationConfig, Network, Operator};
pub use sample::Sample;
pub use trainer::Trainer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_xor_run() {
        let mut config = Config::default();
        config.population.size = 12;
        config.population.survivors = 4;
        config.evolution.epochs = 3;
        config.runtime.seed = Some(1);
        config.runtime.workers = 2;

        let mut trainer = Trainer::new(config).unwrap();
        let population = trainer.initial_population();
        let result = trainer.train(population, &sample::xor_samples()).unwrap();

        assert!(!result.is_empty());
        assert!(result[0].is_valid());
    }
}
