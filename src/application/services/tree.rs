//! Tree loading and reduction service
//!
//! Reads a tree document, runs the reducer and the depth annotation, and
//! reports shape statistics before and after.

use std::path::Path;
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{annotate_depths, reduce, Node, ReduceOptions, TreeStats};
use crate::infrastructure::traits::FileSystem;

/// A reduced, depth-annotated tree ready for rendering.
#[derive(Debug, Clone)]
pub struct PreparedTree {
    /// Reduced tree with `depth` assigned on every node
    pub tree: Node,
    /// Shape of the input tree
    pub raw: TreeStats,
    /// Shape of the reduced tree
    pub reduced: TreeStats,
}

/// Service for loading and reducing decision trees.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and decode a tree document.
    ///
    /// An empty top-level list is fatal and reported before any traversal.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Node> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        let content = self.fs.read_to_string(path).with_path_context("read tree", path)?;
        let root = Node::from_json(&content)?;
        debug!("load: root action {:?}", root.action);
        Ok(root)
    }

    /// Reduce `root` and annotate depths.
    pub fn prepare(&self, root: &Node, opts: &ReduceOptions) -> PreparedTree {
        let raw = TreeStats::of(root);
        let mut tree = reduce(root, opts);
        annotate_depths(&mut tree);
        let reduced = TreeStats::of(&tree);
        info!("reduced tree from {} to {}", raw, reduced);
        PreparedTree { tree, raw, reduced }
    }

    /// Load and prepare in one step.
    pub fn load_prepared(&self, path: &Path, opts: &ReduceOptions) -> ApplicationResult<PreparedTree> {
        let root = self.load(path)?;
        Ok(self.prepare(&root, opts))
    }
}

/// Indented text view of a tree, one line per node.
pub fn to_text_tree(root: &Node) -> Tree<String> {
    fn line(node: &Node) -> String {
        match &node.amount {
            Some(amount) => format!("{} ({})", node.action, amount),
            None => node.action.clone(),
        }
    }

    // post-order over an explicit stack: children are built before their parent
    let mut finished: Vec<Tree<String>> = Vec::new();
    let mut stack: Vec<(&Node, bool)> = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            let leaves = finished.split_off(finished.len() - node.children.len());
            finished.push(Tree::new(line(node)).with_leaves(leaves));
        } else {
            stack.push((node, true));
            for child in node.children.iter().rev() {
                stack.push((child, false));
            }
        }
    }
    finished.pop().unwrap_or_else(|| Tree::new(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tree_when_rendering_text_then_lines_in_order() {
        let tree = Node::new("root").with_children(vec![
            Node::new("call").with_amount(1.0),
            Node::new("raise").with_text_amount("big"),
        ]);
        let text = to_text_tree(&tree).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "root");
        assert!(lines[1].ends_with("call (1.00)"));
        assert!(lines[2].ends_with("raise (big)"));
    }
}
