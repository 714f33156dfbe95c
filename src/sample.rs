//! Training samples.

use serde::{Deserialize, Serialize};

/// One labeled training example: fixed-length input and target vectors.
/// Immutable once built; the engine never takes ownership of sample data
/// beyond reading it during evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub inputs: Vec<f64>,
    pub targets: Vec<f64>,
}

impl Sample {
    pub fn new(inputs: Vec<f64>, targets: Vec<f64>) -> Self {
        Self { inputs, targets }
    }
}

/// The canonical XOR set in [-1, 1] encoding, the smallest problem the
/// engine can meaningfully evolve against.
pub fn xor_samples() -> Vec<Sample> {
    vec![
        Sample::new(vec![-1.0, -1.0], vec![-1.0]),
        Sample::new(vec![-1.0, 1.0], vec![1.0]),
        Sample::new(vec![1.0, -1.0], vec![1.0]),
        Sample::new(vec![1.0, 1.0], vec![-1.0]),
    ]
}

/// Index of the largest value, used to turn one-hot outputs into labels.
pub fn max_index(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;

    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best = idx;
        }
    }

    best
}
