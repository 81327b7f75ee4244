//! Depth annotation and tree statistics.

use std::fmt;

use crate::domain::node::Node;

/// Assign `depth` to every node: 0 at the root, parent + 1 below.
pub fn annotate_depths(root: &mut Node) {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        node.depth = depth;
        for child in node.children.iter_mut() {
            stack.push((child, depth + 1));
        }
    }
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total nodes
    pub nodes: usize,
    /// Terminal nodes
    pub leaves: usize,
    /// Number of levels (a lone root has 1)
    pub levels: usize,
}

impl TreeStats {
    pub fn of(root: &Node) -> Self {
        let mut stats = Self::default();
        let mut stack = vec![(root, 1usize)];
        while let Some((node, level)) = stack.pop() {
            stats.nodes += 1;
            stats.levels = stats.levels.max(level);
            if node.is_terminal() {
                stats.leaves += 1;
            }
            stack.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        stats
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, {} levels",
            self.nodes, self.leaves, self.levels
        )
    }
}

/// Deepest assigned depth in an annotated tree.
pub fn max_depth(root: &Node) -> usize {
    let mut deepest = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        deepest = deepest.max(node.depth);
        stack.extend(node.children.iter());
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::new("r").with_children(vec![
            Node::new("a").with_children(vec![Node::new("a1"), Node::new("a2")]),
            Node::new("b"),
        ])
    }

    #[test]
    fn given_tree_when_annotating_then_depths_follow_levels() {
        let mut tree = sample();
        annotate_depths(&mut tree);
        assert_eq!(tree.depth, 0);
        assert_eq!(tree.children[0].depth, 1);
        assert_eq!(tree.children[0].children[1].depth, 2);
        assert_eq!(tree.children[1].depth, 1);
        assert_eq!(max_depth(&tree), 2);
    }

    #[test]
    fn given_tree_when_computing_stats_then_counts_nodes_leaves_levels() {
        let stats = TreeStats::of(&sample());
        assert_eq!(
            stats,
            TreeStats {
                nodes: 5,
                leaves: 3,
                levels: 3
            }
        );
        assert_eq!(stats.to_string(), "5 nodes, 3 leaves, 3 levels");
    }
}
