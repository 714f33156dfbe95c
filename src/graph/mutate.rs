//! Structural mutation operators.
//!
//! Every operator keeps the arena topologically ordered: new nodes are
//! inserted after all of their inputs and before any consumer, so evaluation
//! stays a single left-to-right pass. Eligibility is checked up front via
//! weight conditioning; an operator that still finds an empty candidate set
//! has been called on a corrupted graph and panics.

use crate::graph::network::Network;
use crate::graph::node::Node;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The five structural mutations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    AddEdge,
    SplitEdge,
    RemoveEdge,
    DedupEdges,
    RemoveDeadEnds,
}

/// Relative weights for picking a mutation, plus the per-clone budget.
///
/// Growth mutations (add, split) default to a higher weight than removal and
/// cleanup so the population trends towards richer structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MutationConfig {
    pub add_edge_weight: f64,
    pub split_edge_weight: f64,
    pub remove_edge_weight: f64,
    pub dedup_edges_weight: f64,
    pub remove_dead_ends_weight: f64,
    /// A mutated clone receives between 1 and this many mutations.
    pub max_mutations: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            add_edge_weight: 4.0,
            split_edge_weight: 4.0,
            remove_edge_weight: 1.0,
            dedup_edges_weight: 0.5,
            remove_dead_ends_weight: 0.5,
            max_mutations: 3,
        }
    }
}

impl MutationConfig {
    /// Pick a mutation kind by weight. Edge removal and splitting are only
    /// eligible when the network has at least one edge.
    pub fn choose<R: Rng>(&self, rng: &mut R, has_edges: bool) -> MutationKind {
        let choices = [
            (MutationKind::AddEdge, self.add_edge_weight),
            (
                MutationKind::SplitEdge,
                if has_edges { self.split_edge_weight } else { 0.0 },
            ),
            (
                MutationKind::RemoveEdge,
                if has_edges { self.remove_edge_weight } else { 0.0 },
            ),
            (MutationKind::DedupEdges, self.dedup_edges_weight),
            (MutationKind::RemoveDeadEnds, self.remove_dead_ends_weight),
        ];

        let dist = WeightedIndex::new(choices.iter().map(|(_, w)| *w))
            .expect("at least one mutation weight must be > 0");
        choices[dist.sample(rng)].0
    }
}

impl Network {
    /// Apply one weighted-random mutation.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R, config: &MutationConfig) {
        match config.choose(rng, self.edge_count() > 0) {
            MutationKind::AddEdge => {
                self.add_random_edge(rng);
            }
            MutationKind::SplitEdge => self.split_random_edge(rng),
            MutationKind::RemoveEdge => self.remove_random_edge(rng),
            MutationKind::DedupEdges => self.dedup_edges(),
            MutationKind::RemoveDeadEnds => self.remove_dead_ends(),
        }
    }

    /// Add an edge from a random earlier node to a random computation node.
    ///
    /// Sources are inputs and non-output computation nodes, destinations any
    /// computation node at a strictly later position. No-op (returning
    /// `false`) when the picked edge already exists.
    pub fn add_random_edge<R: Rng>(&mut self, rng: &mut R) -> bool {
        let first_output = self.nodes.len() - self.num_outputs();

        let dst = rng.gen_range(self.num_inputs()..self.nodes.len());
        let src = rng.gen_range(0..dst.min(first_output));
        debug_assert!(src < dst);

        match &mut self.nodes[dst] {
            Node::Computation { inputs, .. } => {
                if inputs.contains(&src) {
                    return false;
                }
                inputs.push(src);
                true
            }
            Node::Constant { .. } => unreachable!("destinations are computation nodes"),
        }
    }

    /// Remove one random input reference from a random computation node that
    /// has at least one.
    ///
    /// An input-less computation node stays legal (it evaluates the empty
    /// reduction), so no repair pass follows.
    ///
    /// # Panics
    ///
    /// Panics when no node has any inputs; callers gate on
    /// [`Network::edge_count`].
    pub fn remove_random_edge<R: Rng>(&mut self, rng: &mut R) {
        let dst = self.random_edge_destination(rng);

        if let Node::Computation { inputs, .. } = &mut self.nodes[dst] {
            let slot = rng.gen_range(0..inputs.len());
            inputs.remove(slot);
        }
    }

    /// Split one random edge `source -> destination` by routing it through a
    /// fresh interior node with a random operator.
    ///
    /// The new node's sole input is the original source; the destination's
    /// direct reference to the source is replaced by the new node. The node
    /// is inserted at the first position strictly after its source
    /// (immediately after the input block when the source is an input node),
    /// which is how the graph grows in depth.
    ///
    /// # Panics
    ///
    /// Panics when no node has any inputs; callers gate on
    /// [`Network::edge_count`].
    pub fn split_random_edge<R: Rng>(&mut self, rng: &mut R) {
        let dst = self.random_edge_destination(rng);

        let (src, slot) = {
            let inputs = self.nodes[dst].inputs();
            let slot = rng.gen_range(0..inputs.len());
            (inputs[slot], slot)
        };

        // First legal arena position after the source.
        let pos = if src < self.num_inputs() {
            self.num_inputs()
        } else {
            src + 1
        };
        debug_assert!(pos <= dst);

        let node = Node::computation(rng, vec![src]);
        self.insert_node(pos, node);

        // The insertion shifted the destination (and any of its references
        // at or past `pos`) one slot to the right; the source sits before
        // `pos` and kept its index.
        if let Node::Computation { inputs, .. } = &mut self.nodes[dst + 1] {
            inputs[slot] = pos;
        }
    }

    /// Collapse every input list to its set of distinct sources.
    ///
    /// Order is irrelevant: all operators reduce over an unordered multiset.
    /// Idempotent.
    pub fn dedup_edges(&mut self) {
        for node in &mut self.nodes {
            if let Node::Computation { inputs, .. } = node {
                let mut seen = HashSet::with_capacity(inputs.len());
                inputs.retain(|&src| seen.insert(src));
            }
        }
    }

    /// Remove interior nodes that no other node references, repeating until
    /// a fixed point: pruning a dead node can orphan its own inputs.
    /// Input and output nodes are never removed.
    pub fn remove_dead_ends(&mut self) {
        loop {
            let first_output = self.nodes.len() - self.num_outputs();

            let mut referenced = vec![false; self.nodes.len()];
            for node in &self.nodes {
                for &src in node.inputs() {
                    referenced[src] = true;
                }
            }

            let dead: Vec<usize> = (self.num_inputs()..first_output)
                .filter(|&idx| !referenced[idx])
                .collect();
            if dead.is_empty() {
                return;
            }

            self.remove_nodes(&dead);
        }
    }

    /// Random computation node with at least one input.
    fn random_edge_destination<R: Rng>(&self, rng: &mut R) -> usize {
        let candidates: Vec<usize> = (self.num_inputs()..self.nodes.len())
            .filter(|&idx| !self.nodes[idx].inputs().is_empty())
            .collect();
        assert!(
            !candidates.is_empty(),
            "edge mutation requested on a network without edges"
        );

        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Insert a node at `pos`, renumbering every stored index at or past the
    /// insertion point.
    fn insert_node(&mut self, pos: usize, node: Node) {
        for existing in &mut self.nodes {
            if let Node::Computation { inputs, .. } = existing {
                for src in inputs {
                    if *src >= pos {
                        *src += 1;
                    }
                }
            }
        }
        self.nodes.insert(pos, node);
    }

    /// Remove the given (sorted, interior) positions, renumbering every
    /// surviving input reference.
    fn remove_nodes(&mut self, dead: &[usize]) {
        let mut remap = vec![usize::MAX; self.nodes.len()];
        let mut next = 0;
        let mut dead_iter = dead.iter().peekable();

        for old in 0..self.nodes.len() {
            if dead_iter.peek() == Some(&&old) {
                dead_iter.next();
                continue;
            }
            remap[old] = next;
            next += 1;
        }

        let mut idx = 0;
        self.nodes.retain(|_| {
            let keep = remap[idx] != usize::MAX;
            idx += 1;
            keep
        });

        for node in &mut self.nodes {
            if let Node::Computation { inputs, .. } = node {
                for src in inputs {
                    debug_assert!(remap[*src] != usize::MAX, "removed a referenced node");
                    *src = remap[*src];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Operator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_in_one_out() -> Network {
        Network::new_with_operator(2, 1, Operator::Identity)
    }

    #[test]
    fn test_add_random_edge_is_noop_on_existing() {
        // The minimal 2x1 network already has both possible edges.
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut net = two_in_one_out();

        for _ in 0..50 {
            assert!(!net.add_random_edge(&mut rng));
        }
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn test_remove_random_edge_removes() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut net = two_in_one_out();

        net.remove_random_edge(&mut rng);
        assert_eq!(net.edge_count(), 1);
        net.remove_random_edge(&mut rng);
        assert_eq!(net.edge_count(), 0);

        // Input-less outputs still evaluate (empty reduction).
        net.feed(&[1.0, 2.0]).unwrap();
        assert_eq!(net.output(), vec![0.0]);
    }

    #[test]
    #[should_panic(expected = "without edges")]
    fn test_edge_mutation_on_empty_graph_panics() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut net = two_in_one_out();
        net.remove_random_edge(&mut rng);
        net.remove_random_edge(&mut rng);

        net.split_random_edge(&mut rng);
    }

    #[test]
    fn test_split_adds_exactly_one_node() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut net = two_in_one_out();

        net.split_random_edge(&mut rng);

        assert_eq!(net.node_count(), 4);
        assert_eq!(net.num_inputs(), 2);
        assert_eq!(net.num_outputs(), 1);
        assert!(net.is_valid());

        // The interior node sits right after the input block and reads one
        // input; the output now reads the other input plus the new node.
        let interior = &net.nodes()[2];
        assert_eq!(interior.inputs().len(), 1);
        assert!(interior.inputs()[0] < 2);
        assert_eq!(net.nodes()[3].inputs().len(), 2);
        assert!(net.nodes()[3].inputs().contains(&2));
    }

    #[test]
    fn test_split_preserves_identity_semantics() {
        // Splitting with an identity interior node keeps the sum unchanged.
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut net = two_in_one_out();
        net.split_random_edge(&mut rng);

        if let Node::Computation { op, .. } = &mut net.nodes[2] {
            *op = Operator::Identity;
        }

        net.feed(&[3.0, 4.0]).unwrap();
        assert_eq!(net.output(), vec![7.0]);
    }

    #[test]
    fn test_dedup_edges_idempotent() {
        let mut net = two_in_one_out();
        if let Node::Computation { inputs, .. } = &mut net.nodes[2] {
            *inputs = vec![0, 1, 0, 1, 0];
        }

        net.dedup_edges();
        assert_eq!(net.edge_count(), 2);

        let snapshot: Vec<Vec<usize>> =
            net.nodes().iter().map(|n| n.inputs().to_vec()).collect();
        net.dedup_edges();
        let again: Vec<Vec<usize>> =
            net.nodes().iter().map(|n| n.inputs().to_vec()).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_remove_dead_ends_fixed_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut net = two_in_one_out();

        // Grow a chain of interior nodes, then orphan it at the output.
        net.split_random_edge(&mut rng);
        net.split_random_edge(&mut rng);
        let before = net.node_count();
        if let Node::Computation { inputs, .. } = net.nodes.last_mut().unwrap() {
            inputs.retain(|&src| src < 2);
        }

        net.remove_dead_ends();
        assert!(net.node_count() < before);
        assert!(net.is_valid());

        // Fixed point: a second pass removes nothing.
        let count = net.node_count();
        net.remove_dead_ends();
        assert_eq!(net.node_count(), count);

        // Inputs and outputs survive even when unused.
        assert_eq!(net.num_inputs(), 2);
        assert_eq!(net.num_outputs(), 1);
    }

    #[test]
    fn test_remove_dead_ends_never_touches_io_nodes() {
        let mut net = two_in_one_out();
        if let Node::Computation { inputs, .. } = &mut net.nodes[2] {
            inputs.clear();
        }

        net.remove_dead_ends();
        // Both constants are unreferenced but must stay.
        assert_eq!(net.node_count(), 3);
    }

    #[test]
    fn test_topological_invariant_under_mutation_storm() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = MutationConfig::default();

        for seed in 0..20 {
            let mut net = Network::new(3, 2, &mut rng);
            let mut storm = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..200 {
                net.mutate(&mut storm, &config);
                assert!(net.is_valid(), "invariant broken (seed {seed})");
            }

            // The mutated graph still evaluates in a single pass.
            net.feed(&[0.5, -0.5, 0.25]).unwrap();
            assert_eq!(net.output().len(), 2);
        }
    }

    #[test]
    fn test_mutation_weights_skip_edge_ops_without_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let config = MutationConfig::default();

        for _ in 0..200 {
            let kind = config.choose(&mut rng, false);
            assert!(!matches!(
                kind,
                MutationKind::SplitEdge | MutationKind::RemoveEdge
            ));
        }
    }
}
