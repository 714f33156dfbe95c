//! Node arena entries and the closed operator set.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Reduction operator applied by a computation node.
///
/// The set is closed and every variant carries a stable small id used for
/// structural hashing and display, never for control flow. All operators are
/// reductions over an unordered multiset of input values; apart from [`Operator::Max`]
/// they reduce by summation first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Negated sum of the inputs.
    Negate,
    /// Hyperbolic tangent of the input sum.
    Tanh,
    /// Exponential-linear variant: the sum for non-negative sums, a guarded
    /// `-ln(-sum)` otherwise.
    Elu,
    /// Sine of the input sum.
    Sine,
    /// Plain input sum.
    Identity,
    /// Input sum plus a fresh unit-normal noise sample per evaluation.
    Gauss,
    /// Maximum input value (0.0 when there are no inputs).
    Max,
}

/// Floor for the `-ln(-sum)` branch of [`Operator::Elu`], keeping the
/// operator finite for negative sums arbitrarily close to zero.
const ELU_LOG_FLOOR: f64 = 1e-12;

impl Operator {
    /// Every operator, in id order.
    pub const ALL: [Operator; 7] = [
        Operator::Negate,
        Operator::Tanh,
        Operator::Elu,
        Operator::Sine,
        Operator::Identity,
        Operator::Gauss,
        Operator::Max,
    ];

    /// Stable id used for hashing and display.
    #[inline]
    pub fn id(self) -> u8 {
        match self {
            Operator::Negate => 0,
            Operator::Tanh => 1,
            Operator::Elu => 2,
            Operator::Sine => 3,
            Operator::Identity => 4,
            Operator::Gauss => 5,
            Operator::Max => 6,
        }
    }

    /// Human-readable name for exports and logs.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Negate => "negate",
            Operator::Tanh => "tanh",
            Operator::Elu => "elu",
            Operator::Sine => "sine",
            Operator::Identity => "identity",
            Operator::Gauss => "gauss",
            Operator::Max => "max",
        }
    }

    /// Pick an operator uniformly from the closed set.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Apply the reduction to the given input values.
    ///
    /// Total over the reals for every variant: an empty input list reduces to
    /// 0.0 (empty sum, and the empty maximum is pinned to it; a non-empty
    /// maximum is the true maximum even when every input is negative). Gauss
    /// draws its noise from the thread rng, so its output varies between
    /// passes.
    pub fn apply(self, values: &[f64]) -> f64 {
        let sum: f64 = values.iter().sum();

        match self {
            Operator::Negate => -sum,
            Operator::Tanh => sum.tanh(),
            Operator::Elu => {
                if sum < 0.0 {
                    -(-sum).max(ELU_LOG_FLOOR).ln()
                } else {
                    sum
                }
            }
            Operator::Sine => sum.sin(),
            Operator::Identity => sum,
            Operator::Gauss => {
                let noise: f64 = rand::thread_rng().sample(StandardNormal);
                sum + noise
            }
            Operator::Max => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                }
            }
        }
    }

    /// Whether the operator produces the same value for the same inputs.
    /// Only Gauss is non-deterministic per evaluation.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Operator::Gauss)
    }
}

/// A single arena entry of a [`Network`](crate::graph::Network).
///
/// Input references are positional indices into the owning network's node
/// arena, which makes a derived deep clone fully independent: there is no
/// pointer identity to rewire. The owning network maintains the topological
/// invariant that every referenced index is strictly smaller than the
/// referencing node's own position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Node {
    /// Input node whose value is set externally before each evaluation pass.
    Constant { value: f64 },
    /// Derived node: operator over the cached values of its inputs.
    Computation {
        op: Operator,
        inputs: Vec<usize>,
        value: f64,
    },
}

impl Node {
    /// Fresh constant node with value 0.0.
    pub fn constant() -> Self {
        Node::Constant { value: 0.0 }
    }

    /// Fresh computation node with a random operator and the given inputs.
    pub fn computation<R: Rng>(rng: &mut R, inputs: Vec<usize>) -> Self {
        Node::Computation {
            op: Operator::random(rng),
            inputs,
            value: 0.0,
        }
    }

    /// Last computed (or externally set) value. No side effects.
    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            Node::Constant { value } => *value,
            Node::Computation { value, .. } => *value,
        }
    }

    /// Whether this is an input node.
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant { .. })
    }

    /// Input index list for computation nodes, empty for constants.
    pub fn inputs(&self) -> &[usize] {
        match self {
            Node::Constant { .. } => &[],
            Node::Computation { inputs, .. } => inputs,
        }
    }
}
