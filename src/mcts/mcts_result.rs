use crate::mcts::action::Action;
use crate::mcts::node::SearchTree;
use serde::{Deserialize, Serialize};

/// Per-node statistics kept for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub id: usize,
    pub parent: Option<usize>,
    pub depth: usize,
    /// Action leading to the node, `None` for the root
    pub action: Option<Action>,
    pub visit_count: usize,
    pub value_sum: f64,
    pub terminal: bool,
    /// Last trace entry of the node's state
    pub last_trace: Option<String>,
}

impl NodeReport {
    pub fn snapshot(tree: &SearchTree) -> Vec<NodeReport> {
        tree.iter()
            .map(|(id, node)| NodeReport {
                id: id.0,
                parent: node.parent.map(|p| p.0),
                depth: node.depth,
                action: node.action,
                visit_count: node.visit_count,
                value_sum: node.value_sum,
                terminal: node.is_terminal(),
                last_trace: node.state.trace().last().cloned(),
            })
            .collect()
    }
}

/// Outcome of one search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCTSResult {
    pub example_id: String,
    /// Trajectory of the most visited root child (empty when the root had none)
    pub actions: Vec<Action>,
    pub predicted_answer: Option<usize>,
    pub correct: bool,
    pub trace: Vec<String>,
    /// Whether the reported state is terminal
    pub terminal: bool,
    /// Most-visited path from the root, for diagnostics
    pub principal_variation: Vec<Action>,
    pub rollouts_completed: usize,
    pub cancelled: bool,
    /// Distinct state transitions derived, an upper bound on provider calls
    pub transitions_derived: usize,
    pub tree: Vec<NodeReport>,
}

impl MCTSResult {
    /// Sum of the visit counts of the root's children
    pub fn root_child_visits(&self) -> usize {
        self.tree
            .iter()
            .filter(|node| node.parent == Some(0))
            .map(|node| node.visit_count)
            .sum()
    }

    pub fn root(&self) -> Option<&NodeReport> {
        self.tree.first()
    }

    /// Reports of the direct children of `id`, in catalog order
    pub fn children_of(&self, id: usize) -> impl Iterator<Item = &NodeReport> {
        self.tree.iter().filter(move |node| node.parent == Some(id))
    }
}
