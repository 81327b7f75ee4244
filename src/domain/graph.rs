//! Graph description handed to the external renderer.
//!
//! Walks a reduced, depth-annotated tree and emits one graph node per tree
//! node and one edge per surviving parent/child relation. The walk applies
//! the node budget again, independently of the reducer.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::color::depth_color;
use crate::domain::node::Node;
use crate::domain::reducer::NodeBudget;

/// Name of the emitted digraph.
pub const GRAPH_NAME: &str = "DecisionTree";

/// Rank direction of the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Top to bottom
    #[default]
    #[serde(rename = "TB")]
    TopDown,
    /// Left to right
    #[serde(rename = "LR")]
    LeftRight,
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDirection::TopDown => write!(f, "TB"),
            LayoutDirection::LeftRight => write!(f, "LR"),
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(LayoutDirection::TopDown),
            "LR" => Ok(LayoutDirection::LeftRight),
            other => Err(format!("unknown layout direction '{}' (expected TB or LR)", other)),
        }
    }
}

/// Graphviz layout engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    #[default]
    Dot,
    Neato,
    Fdp,
    Sfdp,
    Twopi,
    Circo,
}

impl LayoutEngine {
    pub const ALL: [LayoutEngine; 6] = [
        LayoutEngine::Dot,
        LayoutEngine::Neato,
        LayoutEngine::Fdp,
        LayoutEngine::Sfdp,
        LayoutEngine::Twopi,
        LayoutEngine::Circo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutEngine::Dot => "dot",
            LayoutEngine::Neato => "neato",
            LayoutEngine::Fdp => "fdp",
            LayoutEngine::Sfdp => "sfdp",
            LayoutEngine::Twopi => "twopi",
            LayoutEngine::Circo => "circo",
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|e| e.as_str()).collect();
                format!("unknown layout engine '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub fill_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Nodes and directed edges plus layout attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDescription {
    pub name: String,
    pub direction: LayoutDirection,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphDescription {
    /// Build the description from an annotated tree, emitting at most `max_nodes` nodes.
    pub fn from_tree(root: &Node, direction: LayoutDirection, max_nodes: Option<usize>) -> Self {
        let mut graph = Self {
            name: GRAPH_NAME.to_string(),
            direction,
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        let mut budget = NodeBudget::new(max_nodes);
        let mut stack: Vec<(&Node, Option<String>)> = vec![(root, None)];

        while let Some((node, parent_id)) = stack.pop() {
            if !budget.try_take() {
                debug!("graph: node budget exhausted after {} nodes", budget.used());
                break;
            }
            let id = format!("e{}", budget.used());
            graph.nodes.push(GraphNode {
                id: id.clone(),
                label: node.label(),
                fill_color: depth_color(node.depth),
            });
            if let Some(parent) = parent_id {
                graph.edges.push(GraphEdge {
                    from: parent,
                    to: id.clone(),
                });
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(id.clone())));
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Serialize as Graphviz DOT source.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_dot(&mut out);
        out
    }

    fn write_dot(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "digraph {} {{", quote(&self.name))?;
        writeln!(
            out,
            "  graph [rankdir={}, splines=ortho, nodesep=\"0.2\", ranksep=\"0.5\"];",
            self.direction
        )?;
        writeln!(out, "  node [shape=box];")?;
        for node in &self.nodes {
            writeln!(
                out,
                "  {} [label={}, shape=box, fontsize=10, fontname=\"Helvetica\", style=\"rounded,filled\", fillcolor={}];",
                node.id,
                quote(&node.label),
                quote(&node.fill_color)
            )?;
        }
        for edge in &self.edges {
            writeln!(out, "  {} -> {};", edge.from, edge.to)?;
        }
        writeln!(out, "}}")
    }
}

/// Quote a DOT string, escaping quotes and backslashes; newlines become `\n`.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => {}
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
