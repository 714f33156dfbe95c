//! Network arena, single-pass evaluation and fitness.

use crate::error::EngineError;
use crate::graph::node::{Node, Operator};
use crate::sample::Sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An evolvable computational graph.
///
/// Nodes live in an ordered arena: the first `num_inputs` entries are
/// constant (input) nodes, the last `num_outputs` entries are computation
/// nodes, and everything in between is an interior computation node
/// introduced by mutation. Input references are arena indices, and every
/// mutation preserves the topological invariant that a node only references
/// strictly earlier positions. Evaluation is therefore a single
/// left-to-right pass with no sorting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    num_inputs: usize,
    num_outputs: usize,
    /// Sum of squared errors over the last evaluated sample set.
    pub total_error: f64,
    /// `total_error` divided by the sample count of the last evaluation.
    pub average_error: f64,
}

impl Network {
    /// Create a minimal fully connected network: every output node gets a
    /// random operator and reads every input node.
    pub fn new<R: Rng>(num_inputs: usize, num_outputs: usize, rng: &mut R) -> Self {
        assert!(
            num_inputs > 0 && num_outputs > 0,
            "network needs at least one input and one output"
        );

        let mut nodes = Vec::with_capacity(num_inputs + num_outputs);
        for _ in 0..num_inputs {
            nodes.push(Node::constant());
        }
        for _ in 0..num_outputs {
            nodes.push(Node::computation(rng, (0..num_inputs).collect()));
        }

        Self {
            nodes,
            num_inputs,
            num_outputs,
            total_error: 0.0,
            average_error: 0.0,
        }
    }

    /// Like [`Network::new`] but with a fixed operator on every output node.
    /// Handy for deterministic setups.
    pub fn new_with_operator(num_inputs: usize, num_outputs: usize, op: Operator) -> Self {
        assert!(
            num_inputs > 0 && num_outputs > 0,
            "network needs at least one input and one output"
        );

        let mut nodes = Vec::with_capacity(num_inputs + num_outputs);
        for _ in 0..num_inputs {
            nodes.push(Node::constant());
        }
        for _ in 0..num_outputs {
            nodes.push(Node::Computation {
                op,
                inputs: (0..num_inputs).collect(),
                value: 0.0,
            });
        }

        Self {
            nodes,
            num_inputs,
            num_outputs,
            total_error: 0.0,
            average_error: 0.0,
        }
    }

    /// Number of input (constant) nodes.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Number of output nodes.
    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Read-only view of the node arena, in evaluation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges (sum of all input-list lengths).
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.inputs().len()).sum()
    }

    /// Feed an input vector through the network.
    ///
    /// Sets the constant nodes in position order, then recomputes every
    /// computation node left to right. Relies on the topological invariant;
    /// fails only on an input length mismatch.
    pub fn feed(&mut self, inputs: &[f64]) -> Result<(), EngineError> {
        if inputs.len() != self.num_inputs {
            return Err(EngineError::InputSize {
                expected: self.num_inputs,
                got: inputs.len(),
            });
        }

        for (node, &value) in self.nodes.iter_mut().zip(inputs) {
            match node {
                Node::Constant { value: v } => *v = value,
                Node::Computation { .. } => unreachable!("input prefix holds constant nodes only"),
            }
        }

        // Reused per node to avoid reallocating the value-gather buffer.
        let mut scratch = Vec::new();

        for idx in self.num_inputs..self.nodes.len() {
            let value = match &self.nodes[idx] {
                Node::Computation { op, inputs, .. } => {
                    debug_assert!(inputs.iter().all(|&i| i < idx));
                    scratch.clear();
                    scratch.extend(inputs.iter().map(|&i| self.nodes[i].value()));
                    op.apply(&scratch)
                }
                Node::Constant { .. } => unreachable!("constant nodes never sit past the inputs"),
            };

            if let Node::Computation { value: v, .. } = &mut self.nodes[idx] {
                *v = value;
            }
        }

        Ok(())
    }

    /// Cached values of the output nodes, in order.
    pub fn output(&self) -> Vec<f64> {
        self.nodes[self.nodes.len() - self.num_outputs..]
            .iter()
            .map(Node::value)
            .collect()
    }

    /// Squared distance of the network output from the sample targets.
    pub fn sample_error(&mut self, sample: &Sample) -> Result<f64, EngineError> {
        if sample.targets.len() != self.num_outputs {
            return Err(EngineError::TargetSize {
                expected: self.num_outputs,
                got: sample.targets.len(),
            });
        }

        self.feed(&sample.inputs)?;

        let error = self
            .output()
            .iter()
            .zip(&sample.targets)
            .map(|(out, target)| (out - target).powi(2))
            .sum();

        Ok(error)
    }

    /// Evaluate the whole sample set, caching `total_error` and
    /// `average_error`. Called exactly once per network per generation by the
    /// trainer's worker pool.
    pub fn update_total_error(&mut self, samples: &[Sample]) -> Result<(), EngineError> {
        let mut sum = 0.0;
        for sample in samples {
            sum += self.sample_error(sample)?;
        }

        self.total_error = sum;
        self.average_error = sum / samples.len().max(1) as f64;

        Ok(())
    }

    /// Check structural well-formedness: constant nodes exactly fill the
    /// input prefix, at least `num_outputs` computation nodes follow, and
    /// every input reference points strictly backwards.
    pub fn is_valid(&self) -> bool {
        if self.nodes.len() < self.num_inputs + self.num_outputs {
            return false;
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            if node.is_constant() != (idx < self.num_inputs) {
                return false;
            }
            if node.inputs().iter().any(|&i| i >= idx) {
                return false;
            }
        }

        true
    }

    /// Fitness scalar, higher is better, 1.0 at zero error.
    ///
    /// The regular score penalizes structural size so that, at equal error,
    /// smaller graphs rank first. With `explore` the size penalty is dropped
    /// and the score ranks on raw error alone; the trainer rolls that chance
    /// per network to keep some pressure towards larger structures that have
    /// not paid off yet.
    pub fn performance(&self, explore: bool) -> f64 {
        if explore {
            1.0 / (self.total_error + 1.0)
        } else {
            1.0 / (self.total_error * self.edge_count() as f64 + 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_minimal_network_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let net = Network::new(4, 2, &mut rng);

        assert_eq!(net.num_inputs(), 4);
        assert_eq!(net.num_outputs(), 2);
        assert_eq!(net.node_count(), 6);
        // Fully connected skeleton: every output reads every input.
        assert_eq!(net.edge_count(), 8);
        for node in &net.nodes()[4..] {
            assert_eq!(node.inputs(), &[0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_identity_network_sums_inputs() {
        let mut net = Network::new_with_operator(2, 1, Operator::Identity);
        net.feed(&[3.0, 4.0]).unwrap();
        assert_eq!(net.output(), vec![7.0]);
    }

    #[test]
    fn test_feed_rejects_wrong_input_size() {
        let mut net = Network::new_with_operator(2, 1, Operator::Identity);
        let err = net.feed(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InputSize {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_evaluation_deterministic_without_gauss() {
        let mut net = Network::new_with_operator(3, 2, Operator::Tanh);
        net.feed(&[0.1, -0.4, 0.7]).unwrap();
        let first = net.output();
        net.feed(&[0.1, -0.4, 0.7]).unwrap();
        assert_eq!(net.output(), first);
    }

    #[test]
    fn test_sample_error_squared_distance() {
        let mut net = Network::new_with_operator(2, 1, Operator::Identity);
        let sample = Sample::new(vec![1.0, 2.0], vec![1.0]);
        // Output is 3.0, target 1.0 -> squared error 4.0.
        assert_eq!(net.sample_error(&sample).unwrap(), 4.0);

        let bad = Sample::new(vec![1.0, 2.0], vec![1.0, 2.0]);
        assert!(matches!(
            net.sample_error(&bad),
            Err(EngineError::TargetSize { .. })
        ));
    }

    #[test]
    fn test_update_total_error_sums_samples() {
        let mut net = Network::new_with_operator(2, 1, Operator::Identity);
        let samples = vec![
            Sample::new(vec![1.0, 0.0], vec![0.0]), // error 1.0
            Sample::new(vec![1.0, 1.0], vec![0.0]), // error 4.0
        ];

        net.update_total_error(&samples).unwrap();
        assert_eq!(net.total_error, 5.0);
        assert_eq!(net.average_error, 2.5);
    }

    #[test]
    fn test_performance_prefers_low_error_then_small_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut a = Network::new(2, 1, &mut rng);
        let mut b = Network::new(2, 1, &mut rng);

        a.total_error = 0.5;
        b.total_error = 2.0;
        assert!(a.performance(false) > b.performance(false));
        assert!(a.performance(true) > b.performance(true));

        // Equal error: the denser graph scores lower unless exploring.
        let mut dense = a.clone();
        if let Node::Computation { inputs, .. } = &mut dense.nodes[2] {
            inputs.push(0); // duplicate edge, size penalty only
        }
        dense.total_error = a.total_error;
        assert!(a.performance(false) > dense.performance(false));
        assert_eq!(a.performance(true), dense.performance(true));
    }

    #[test]
    fn test_perfect_score_is_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut net = Network::new(2, 1, &mut rng);
        net.total_error = 0.0;
        assert_eq!(net.performance(false), 1.0);
        assert_eq!(net.performance(true), 1.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut net = Network::new_with_operator(2, 1, Operator::Identity);
        let mut clone = net.clone();

        clone.feed(&[5.0, 5.0]).unwrap();
        if let Node::Computation { inputs, .. } = &mut clone.nodes[2] {
            inputs.clear();
        }

        // Original is untouched by feeding or mutating the clone.
        net.feed(&[3.0, 4.0]).unwrap();
        assert_eq!(net.output(), vec![7.0]);
        assert_eq!(net.nodes[2].inputs(), &[0, 1]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let net = Network::new(3, 2, &mut rng);

        let bytes = bincode::serialize(&net).unwrap();
        let restored: Network = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.num_inputs(), net.num_inputs());
        assert_eq!(restored.num_outputs(), net.num_outputs());
        assert_eq!(restored.edge_count(), net.edge_count());
    }
}
