//! Tree reduction: node budget, value and depth pruning, sibling filtering
//! and chain collapsing in one depth-first pass.
//!
//! The traversal runs on an explicit stack, so arbitrarily deep input cannot
//! exhaust the call stack. Visiting order is pre-order over the filtered
//! children, which makes budget truncation greedy: whatever is reached first
//! is kept.

use std::slice;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::collapse::fold_single_children;
use crate::domain::filter::{below_minimum, filter_children};
use crate::domain::node::Node;

/// Knobs for [`reduce`]. Every limit is optional and independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceOptions {
    /// Merge runs of single-child nodes
    pub collapse_chains: bool,
    /// Prune nodes whose amount is below this value
    pub min_amount: Option<f64>,
    /// Keep only the k highest-amount children per branching
    pub topk: Option<usize>,
    /// Deepest level kept (root is 0)
    pub max_depth: Option<usize>,
    /// Total number of nodes materialized
    pub max_nodes: Option<usize>,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            collapse_chains: true,
            min_amount: None,
            topk: None,
            max_depth: None,
            max_nodes: None,
        }
    }
}

impl ReduceOptions {
    /// Options that only copy the tree.
    pub fn passthrough() -> Self {
        Self {
            collapse_chains: false,
            ..Self::default()
        }
    }
}

/// Shared node counter for one traversal.
#[derive(Debug, Clone)]
pub struct NodeBudget {
    used: usize,
    limit: Option<usize>,
}

impl NodeBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { used: 0, limit }
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.used >= limit)
    }

    /// Claim one slot; `false` when the budget is already spent.
    pub fn try_take(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

/// A node under construction plus the input children still to visit.
struct Frame<'a> {
    node: Node,
    pending: std::vec::IntoIter<&'a Node>,
    depth: usize,
}

impl<'a> Frame<'a> {
    /// Apply the budget, value and depth checks; `None` rejects the node.
    fn admit(
        source: &'a Node,
        depth: usize,
        opts: &ReduceOptions,
        budget: &mut NodeBudget,
    ) -> Option<Self> {
        if budget.is_exhausted() {
            trace!("reject {:?}: node budget exhausted", source.action);
            return None;
        }
        if below_minimum(source, opts.min_amount) {
            trace!("reject {:?}: amount below minimum", source.action);
            return None;
        }
        if opts.max_depth.is_some_and(|max| depth > max) {
            return None;
        }
        budget.try_take();

        let pending = if opts.max_depth.is_some_and(|max| depth >= max) {
            // children would all fail the depth check
            Vec::new()
        } else {
            filter_children(&source.children, opts.min_amount, opts.topk)
        };
        Some(Self {
            node: source.shallow_copy(),
            pending: pending.into_iter(),
            depth,
        })
    }

    fn finish(mut self, collapse_chains: bool) -> Node {
        if collapse_chains {
            fold_single_children(&mut self.node);
        }
        self.node
    }
}

/// Produce a reduced copy of `root`.
///
/// Checks run in a fixed order at every node: budget, minimum amount, depth.
/// Survivors get their children filtered, visited in order, and (optionally)
/// folded. A rejected root yields an empty placeholder node.
#[instrument(level = "debug", skip(root), fields(root = %root.action))]
pub fn reduce(root: &Node, opts: &ReduceOptions) -> Node {
    let mut budget = NodeBudget::new(opts.max_nodes);
    let reduced = reduce_with_budget(root, opts, &mut budget);
    debug!("reduce: materialized {} nodes", budget.used());
    reduced
}

/// Same as [`reduce`], drawing from a caller-supplied budget.
pub fn reduce_with_budget(root: &Node, opts: &ReduceOptions, budget: &mut NodeBudget) -> Node {
    let Some(first) = Frame::admit(root, 0, opts, budget) else {
        debug!("reduce: root rejected, returning empty placeholder");
        return Node::default();
    };
    let mut stack = vec![first];

    loop {
        let Some(top) = stack.last_mut() else {
            return Node::default();
        };

        // stop descending into further siblings once the budget is spent
        let next = if budget.is_exhausted() {
            None
        } else {
            top.pending.next()
        };

        if let Some(child) = next {
            let depth = top.depth + 1;
            if let Some(frame) = Frame::admit(child, depth, opts, budget) {
                stack.push(frame);
            }
            continue;
        }

        let Some(frame) = stack.pop() else {
            return Node::default();
        };
        let node = frame.finish(opts.collapse_chains);
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => return node,
        }
    }
}

/// Number of nodes in a tree.
pub fn count_nodes(root: &Node) -> usize {
    let mut count = 0;
    let mut stack: Vec<slice::Iter<'_, Node>> = vec![slice::from_ref(root).iter()];
    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(node) => {
                count += 1;
                stack.push(node.children.iter());
            }
            None => {
                stack.pop();
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Node {
        Node::new("root").with_children(vec![Node::new("call")
            .with_amount(1.0)
            .with_children(vec![Node::new("raise").with_amount(2.0)])])
    }

    fn wide(n: usize) -> Node {
        Node::new("root").with_children(
            (0..n)
                .map(|i| Node::new(format!("c{}", i)).with_amount(i as f64))
                .collect(),
        )
    }

    #[test]
    fn given_single_child_chain_when_collapsing_then_one_node() {
        let reduced = reduce(&chain(), &ReduceOptions::default());
        assert_eq!(reduced.action, "root → call → raise");
        assert_eq!(reduced.amount_value(), Some(2.0));
        assert!(reduced.is_terminal());
    }

    #[test]
    fn given_passthrough_when_reducing_then_tree_is_copied() {
        let tree = chain();
        assert_eq!(reduce(&tree, &ReduceOptions::passthrough()), tree);
    }

    #[test]
    fn given_max_nodes_when_reducing_then_first_visited_win() {
        let opts = ReduceOptions {
            max_nodes: Some(3),
            ..ReduceOptions::passthrough()
        };
        let reduced = reduce(&wide(5), &opts);
        let actions: Vec<&str> = reduced.children.iter().map(|c| c.action.as_str()).collect();
        assert_eq!(actions, vec!["c0", "c1"]);
        assert_eq!(count_nodes(&reduced), 3);
    }

    #[test]
    fn given_zero_budget_when_reducing_then_empty_placeholder() {
        let opts = ReduceOptions {
            max_nodes: Some(0),
            ..ReduceOptions::default()
        };
        assert_eq!(reduce(&wide(3), &opts), Node::default());
    }

    #[test]
    fn given_root_below_minimum_when_reducing_then_empty_placeholder() {
        let root = Node::new("root").with_amount(0.5);
        let opts = ReduceOptions {
            min_amount: Some(1.0),
            ..ReduceOptions::default()
        };
        assert_eq!(reduce(&root, &opts), Node::default());
    }

    #[test]
    fn given_max_depth_zero_when_reducing_then_root_only() {
        let opts = ReduceOptions {
            max_depth: Some(0),
            ..ReduceOptions::passthrough()
        };
        let reduced = reduce(&wide(4), &opts);
        assert!(reduced.is_terminal());
        assert_eq!(reduced.action, "root");
    }

    #[test]
    fn given_collapse_and_parent_amount_when_child_has_none_then_adopts_absent() {
        let tree = Node::new("a")
            .with_amount(3.0)
            .with_children(vec![Node::new("b")]);
        let reduced = reduce(&tree, &ReduceOptions::default());
        assert_eq!(reduced.action, "a → b");
        assert_eq!(reduced.amount, None);
    }

    #[test]
    fn given_nested_tree_when_counting_then_counts_all() {
        assert_eq!(count_nodes(&chain()), 3);
        assert_eq!(count_nodes(&wide(4)), 5);
    }
}
