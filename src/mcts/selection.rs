//! Selection and backpropagation over a [`SearchTree`]
//!
//! Selection uses UCB1. An unvisited child scores `+∞`, so every child is tried
//! once before any exploitation happens; ties go to the first child in catalog
//! order.

use crate::mcts::node::{MCTSNode, NodeId, SearchTree};

/// UCB1 score of `child` under a parent visited `parent_visits` times
///
/// Formula: value_sum / n + c × sqrt(ln(N + 1) / n)
pub fn ucb_score(child: &MCTSNode, parent_visits: usize, exploration_constant: f64) -> f64 {
    if child.visit_count == 0 {
        return f64::INFINITY;
    }

    let visits = child.visit_count as f64;
    let exploitation = child.average_value();
    let exploration = exploration_constant * (((parent_visits + 1) as f64).ln() / visits).sqrt();
    exploitation + exploration
}

/// Selects the child with the highest UCB1 score
///
/// # Returns
/// The best child, or None if the node has no children
pub fn select_best_child(
    tree: &SearchTree,
    id: NodeId,
    exploration_constant: f64,
) -> Option<NodeId> {
    let node = tree.node(id);
    let mut best: Option<(NodeId, f64)> = None;

    for &child_id in &node.children {
        let score = ucb_score(tree.node(child_id), node.visit_count, exploration_constant);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child_id, score)),
        }
    }

    best.map(|(child_id, _)| child_id)
}

/// Descends from the root through best children until reaching a node without children
pub fn select_leaf(tree: &SearchTree, exploration_constant: f64) -> NodeId {
    let mut current = tree.root();
    while let Some(child) = select_best_child(tree, current, exploration_constant) {
        current = child;
    }
    current
}

/// Adds one visit and `reward` to `id` and every ancestor up to the root
pub fn backpropagate(tree: &mut SearchTree, id: NodeId, reward: f64) {
    let mut current = Some(id);
    while let Some(node_id) = current {
        let node = tree.node_mut(node_id);
        node.visit_count += 1;
        node.value_sum += reward;
        current = node.parent;
    }
}

/// Child with the most visits; ties go to the earliest child
pub fn most_visited_child(tree: &SearchTree, id: NodeId) -> Option<NodeId> {
    let mut best: Option<NodeId> = None;
    for &child_id in &tree.node(id).children {
        match best {
            Some(current) if tree.node(child_id).visit_count <= tree.node(current).visit_count => {}
            _ => best = Some(child_id),
        }
    }
    best
}

/// Follows most-visited children from `id` down to a leaf
pub fn principal_variation(tree: &SearchTree, id: NodeId) -> Vec<NodeId> {
    let mut path = vec![id];
    let mut current = id;
    while let Some(child) = most_visited_child(tree, current) {
        if tree.node(child).visit_count == 0 {
            break;
        }
        path.push(child);
        current = child;
    }
    path
}
