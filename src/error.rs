//! Error taxonomy for the engine.
//!
//! Argument errors (wrong vector shapes) are surfaced to the caller.
//! Mutation-operator precondition violations are programmer errors and panic
//! instead: a network whose invariants are broken cannot be repaired
//! generically, so the engine fails fast rather than resume on a corrupted
//! graph.

use thiserror::Error;

/// Errors surfaced by the graph engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `feed` was called with a vector of the wrong length.
    #[error("input size mismatch: network has {expected} inputs, got {got}")]
    InputSize { expected: usize, got: usize },

    /// A sample's target vector does not match the network's output count.
    #[error("target size mismatch: network has {expected} outputs, got {got}")]
    TargetSize { expected: usize, got: usize },

    /// The trainer was handed an empty initial population.
    #[error("cannot train an empty population")]
    EmptyPopulation,

    /// The trainer was handed an empty sample set.
    #[error("cannot train without samples")]
    EmptySampleSet,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The evaluation worker pool could not be built.
    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
