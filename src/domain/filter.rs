//! Sibling filtering: minimum amount and top-k selection.

use std::cmp::Ordering;

use crate::domain::node::Node;

/// Filter a sibling list, keeping survivors in their original relative order.
///
/// - `min_amount`: drops children whose amount parses to a value below it.
///   Children without a usable amount are always kept.
/// - `topk`: when positive and exceeded, keeps the `topk` highest amounts.
///   Missing amounts rank lowest; ties keep input order.
pub fn filter_children<'a>(
    children: &'a [Node],
    min_amount: Option<f64>,
    topk: Option<usize>,
) -> Vec<&'a Node> {
    let mut kept: Vec<&Node> = children
        .iter()
        .filter(|child| !below_minimum(child, min_amount))
        .collect();

    if let Some(k) = topk.filter(|&k| k > 0) {
        if kept.len() > k {
            kept = select_top(&kept, k);
        }
    }
    kept
}

/// True when the node carries a parseable amount strictly below `min_amount`.
pub fn below_minimum(node: &Node, min_amount: Option<f64>) -> bool {
    match (min_amount, node.amount_value()) {
        (Some(min), Some(value)) => value < min,
        _ => false,
    }
}

fn rank_key(node: &Node) -> f64 {
    node.amount_value().unwrap_or(f64::NEG_INFINITY)
}

/// Pick the `k` best-ranked entries, re-emitted by original index.
fn select_top<'a>(nodes: &[&'a Node], k: usize) -> Vec<&'a Node> {
    let mut ranked: Vec<usize> = (0..nodes.len()).collect();
    // stable: equal keys keep input order
    ranked.sort_by(|&a, &b| {
        rank_key(nodes[b])
            .partial_cmp(&rank_key(nodes[a]))
            .unwrap_or(Ordering::Equal)
    });

    let mut selected = vec![false; nodes.len()];
    for &idx in ranked.iter().take(k) {
        selected[idx] = true;
    }

    nodes
        .iter()
        .zip(selected)
        .filter_map(|(node, keep)| keep.then_some(*node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(nodes: &[&Node]) -> Vec<Option<f64>> {
        nodes.iter().map(|n| n.amount_value()).collect()
    }

    fn siblings(values: &[Option<f64>]) -> Vec<Node> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let node = Node::new(format!("a{}", i));
                match v {
                    Some(x) => node.with_amount(*x),
                    None => node,
                }
            })
            .collect()
    }

    #[test]
    fn given_topk_when_filtering_then_keeps_best_in_original_order() {
        let children = siblings(&[Some(1.0), Some(5.0), Some(3.0), None, Some(4.0)]);
        let kept = filter_children(&children, None, Some(2));
        assert_eq!(amounts(&kept), vec![Some(5.0), Some(4.0)]);
    }

    #[test]
    fn given_no_amounts_when_topk_then_keeps_first_k() {
        let children = siblings(&[None, None, None, None]);
        let kept = filter_children(&children, None, Some(2));
        let actions: Vec<&str> = kept.iter().map(|n| n.action.as_str()).collect();
        assert_eq!(actions, vec!["a0", "a1"]);
    }

    #[test]
    fn given_min_amount_when_filtering_then_absent_amounts_survive() {
        let children = siblings(&[Some(0.5), None, Some(2.0)]);
        let kept = filter_children(&children, Some(1000.0), None);
        assert_eq!(amounts(&kept), vec![None]);
    }

    #[test]
    fn given_unparseable_amount_when_min_amount_then_kept() {
        let children = vec![Node::new("x").with_text_amount("n/a"), Node::new("y").with_amount(0.1)];
        let kept = filter_children(&children, Some(1.0), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].action, "x");
    }

    #[test]
    fn given_zero_topk_when_filtering_then_noop() {
        let children = siblings(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(filter_children(&children, None, Some(0)).len(), 3);
    }

    #[test]
    fn given_empty_input_when_filtering_then_empty() {
        assert!(filter_children(&[], Some(1.0), Some(3)).is_empty());
    }

    #[test]
    fn given_ties_when_topk_then_earlier_sibling_wins() {
        let children = siblings(&[Some(2.0), Some(3.0), Some(2.0), Some(1.0)]);
        let kept = filter_children(&children, None, Some(2));
        let actions: Vec<&str> = kept.iter().map(|n| n.action.as_str()).collect();
        assert_eq!(actions, vec!["a0", "a1"]);
    }
}
