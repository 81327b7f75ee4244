//! Linear chain collapsing.
//!
//! A run of single-child nodes becomes one node labelled with the joined
//! actions of the run. The last node of the run supplies the amount and the
//! remaining children.

use itertools::Itertools;
use tracing::debug;

use crate::domain::node::Node;
use crate::domain::reducer::{reduce, ReduceOptions};

/// Separator between merged action labels.
pub const CHAIN_SEPARATOR: &str = " → ";

/// Upper bound on merges per chain; hitting it just stops merging.
pub const MAX_CHAIN_FOLDS: usize = 5000;

/// Merge the sole child into `node` until it has zero or several children.
///
/// Returns the number of merges performed.
pub fn fold_single_children(node: &mut Node) -> usize {
    let mut folds = 0;
    while node.children.len() == 1 {
        if folds >= MAX_CHAIN_FOLDS {
            debug!("fold cap reached at {:?}", node.action);
            break;
        }
        let Some(mut child) = node.children.pop() else {
            break;
        };
        node.action = format!("{}{}{}", node.action, CHAIN_SEPARATOR, child.action);
        node.amount = child.amount.take();
        node.children = std::mem::take(&mut child.children);
        folds += 1;
    }
    folds
}

/// Collapse the chain starting at `head` into a new node.
///
/// Only the head's own run is merged; the children it ends up with are
/// copied as they are.
pub fn collapse_linear_chain(head: &Node) -> Node {
    let mut run = vec![head];
    let mut tail = head;
    while let [only] = tail.children.as_slice() {
        if run.len() > MAX_CHAIN_FOLDS {
            debug!("fold cap reached at {:?}", head.action);
            break;
        }
        tail = only;
        run.push(tail);
    }

    Node {
        action: run.iter().map(|n| n.action.as_str()).join(CHAIN_SEPARATOR),
        amount: tail.amount.clone(),
        children: tail.children.clone(),
        depth: head.depth,
    }
}

/// Collapse every chain in the tree. Idempotent.
pub fn collapse_tree(root: &Node) -> Node {
    reduce(root, &ReduceOptions::default())
}
