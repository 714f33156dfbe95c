//! Evolving computational graphs.
//!
//! Implements weight-agnostic networks as ordered node arenas with:
//! - A closed operator set with stable ids
//! - Single-pass topological evaluation
//! - Structural mutations (add/remove/split edges, dedup, dead-end pruning)
//! - A canonical structural hash for population deduplication
//! - Read-only topology export

mod export;
mod hash;
mod mutate;
mod network;
mod node;

pub use export::{NodeInfo, Topology};
pub use mutate::{MutationConfig, MutationKind};
pub use network::Network;
pub use node::{Node, Operator};
