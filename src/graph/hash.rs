//! Canonical structural hash for population deduplication.

use crate::graph::network::Network;
use crate::graph::node::Node;
use std::fmt::Write;

impl Network {
    /// Canonical encoding of the network's topology and operator assignment:
    /// input/output counts, then per computation node in arena order its
    /// operator id and positional input indices.
    ///
    /// Two networks with identical topology and operators hash equal
    /// regardless of how they were built; clones always hash equal to their
    /// original. The encoding is positional, so graphs that are isomorphic
    /// only under a node reordering hash differently and survive dedup as
    /// separate individuals. That under-deduplication is accepted: the hash
    /// is a diversity key, not an isomorphism test.
    pub fn structural_hash(&self) -> String {
        let mut out = String::with_capacity(8 + self.node_count() * 8);
        let _ = write!(out, "{}x{}", self.num_inputs(), self.num_outputs());

        for node in self.nodes() {
            if let Node::Computation { op, inputs, .. } = node {
                let _ = write!(out, "|{}:", op.id());
                for (pos, src) in inputs.iter().enumerate() {
                    if pos > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{src}");
                }
            }
        }

        out
    }
}
