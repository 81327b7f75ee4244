//! Domain layer: the decision tree model and the reduction pipeline
//!
//! Pure and synchronous: no I/O, no CLI, no config loading.

pub mod collapse;
pub mod color;
pub mod depth;
pub mod error;
pub mod filter;
pub mod graph;
pub mod node;
pub mod reducer;

pub use collapse::{collapse_linear_chain, collapse_tree, CHAIN_SEPARATOR, MAX_CHAIN_FOLDS};
pub use color::depth_color;
pub use depth::{annotate_depths, max_depth, TreeStats};
pub use error::DomainError;
pub use filter::filter_children;
pub use graph::{GraphDescription, GraphEdge, GraphNode, LayoutDirection, LayoutEngine};
pub use node::{Amount, Node};
pub use reducer::{count_nodes, reduce, NodeBudget, ReduceOptions};
