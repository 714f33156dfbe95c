//! Read-only topology export for external renderers.
//!
//! The engine exposes the ordered node list with operator ids and positional
//! input indices; turning that into files is the caller's business. The dot
//! renderer below only builds a string.

use crate::graph::network::Network;
use crate::graph::node::{Node, Operator};
use serde::Serialize;
use std::fmt::Write;

/// Snapshot of one arena entry.
#[derive(Clone, Debug, Serialize)]
pub struct NodeInfo {
    /// Operator id and name; `None` for input nodes.
    pub op: Option<(u8, &'static str)>,
    /// Positional indices of the node's inputs.
    pub inputs: Vec<usize>,
    /// Cached value from the last evaluation.
    pub value: f64,
}

/// Read-only traversal of a network's structure.
#[derive(Clone, Debug, Serialize)]
pub struct Topology {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub edge_count: usize,
    pub nodes: Vec<NodeInfo>,
}

impl Network {
    /// Capture the current topology for rendering or inspection.
    pub fn topology(&self) -> Topology {
        let nodes = self
            .nodes()
            .iter()
            .map(|node| match node {
                Node::Constant { value } => NodeInfo {
                    op: None,
                    inputs: Vec::new(),
                    value: *value,
                },
                Node::Computation { op, inputs, value } => NodeInfo {
                    op: Some((op.id(), op.name())),
                    inputs: inputs.clone(),
                    value: *value,
                },
            })
            .collect();

        Topology {
            num_inputs: self.num_inputs(),
            num_outputs: self.num_outputs(),
            edge_count: self.edge_count(),
            nodes,
        }
    }
}

fn glyph(op_id: u8) -> &'static str {
    match Operator::ALL.get(op_id as usize) {
        Some(Operator::Negate) => "±",
        Some(Operator::Tanh) => "∫",
        Some(Operator::Elu) => "⦧",
        Some(Operator::Sine) => "∿",
        Some(Operator::Identity) => "⦿",
        Some(Operator::Gauss) => "≈",
        Some(Operator::Max) => "⩓",
        None => "?",
    }
}

impl Topology {
    /// Render the topology as a Graphviz digraph. `label` annotates the
    /// whole graph (typically performance and edge count).
    pub fn to_dot(&self, label: Option<&str>) -> String {
        let mut out = String::from("digraph network {\n\trankdir=LR\n");
        if let Some(label) = label {
            let _ = writeln!(out, "\tlabel=\"{}\"", label.replace('"', "'"));
        }

        let first_output = self.nodes.len() - self.num_outputs;
        for (idx, node) in self.nodes.iter().enumerate() {
            match node.op {
                None => {
                    let _ = writeln!(
                        out,
                        "\tn{idx} [shape=box, label=\"in{idx} {:.3}\"]",
                        node.value
                    );
                }
                Some((op_id, _)) => {
                    let style = if idx >= first_output {
                        ", style=filled, fillcolor=lightgray"
                    } else {
                        ""
                    };
                    let _ = writeln!(
                        out,
                        "\tn{idx} [label=\"{} {:.3}\"{style}]",
                        glyph(op_id),
                        node.value
                    );
                }
            }
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            for src in &node.inputs {
                let _ = writeln!(out, "\tn{src} -> n{idx}");
            }
        }

        out.push_str("}\n");
        out
    }
}
