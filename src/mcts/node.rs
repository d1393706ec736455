//! MCTS tree storage
//!
//! Nodes live in one arena (`Vec<MCTSNode>`) owned by [`SearchTree`]. Children are
//! referenced by index and each node keeps the index of its parent, which is only
//! followed during backpropagation. Nodes are never removed while a search runs,
//! so every index stays valid for the whole run and for reporting afterwards.

use crate::mcts::action::Action;
use crate::mcts::state::SearchState;
use crate::mcts::transitions::Transitions;

/// Index of a node inside its [`SearchTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in the MCTS tree
#[derive(Debug, Clone)]
pub struct MCTSNode {
    /// Search state reached at this node
    pub state: SearchState,

    /// Action that led here from the parent, `None` at the root
    pub action: Option<Action>,

    /// Number of times this node has been visited
    pub visit_count: usize,

    /// Sum of all rewards backpropagated through this node
    pub value_sum: f64,

    /// Child nodes, in catalog order
    pub children: Vec<NodeId>,

    /// Parent node, used for backpropagation
    pub parent: Option<NodeId>,

    /// Distance from the root
    pub depth: usize,
}

impl MCTSNode {
    fn new(
        state: SearchState,
        action: Option<Action>,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Self {
        MCTSNode {
            state,
            action,
            visit_count: 0,
            value_sum: 0.0,
            children: Vec::new(),
            parent,
            depth,
        }
    }

    /// Returns the average value of this node
    pub fn average_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// Checks if this node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// Arena-backed search tree rooted at node 0
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<MCTSNode>,
}

impl SearchTree {
    pub fn new(root_state: SearchState) -> Self {
        Self {
            nodes: vec![MCTSNode::new(root_state, None, None, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order, paired with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Creates one child per available action of a non-terminal node.
    ///
    /// Expanding a node that already has children, or a terminal one, does nothing.
    /// Returns the number of children added.
    pub fn expand(&mut self, id: NodeId, transitions: &mut Transitions<'_>) -> usize {
        let node = self.node(id);
        if node.is_terminal() || !node.is_leaf() {
            return 0;
        }

        let parent_state = node.state.clone();
        let depth = node.depth + 1;
        let actions = parent_state.available_actions();

        let mut children = Vec::with_capacity(actions.len());
        for action in actions {
            let child_state = transitions.apply(&parent_state, action);
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(MCTSNode::new(child_state, Some(action), Some(id), depth));
            children.push(child_id);
        }

        let added = children.len();
        self.node_mut(id).children = children;
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example::Example;
    use crate::mcts::action::ActionCatalog;
    use crate::reasoning::scripted::ScriptedProvider;

    fn tree_for(example: Example) -> SearchTree {
        SearchTree::new(SearchState::new(example, ActionCatalog::default()))
    }

    fn full_example() -> Example {
        Example::new("n", "q", vec!["a".into(), "b".into()], 0)
            .with_hint("h")
            .with_image("1.png")
    }

    #[test]
    fn test_new_tree_has_unvisited_root() {
        let tree = tree_for(full_example());
        let root = tree.node(tree.root());

        assert_eq!(tree.len(), 1);
        assert!(root.is_leaf());
        assert!(root.action.is_none());
        assert!(root.parent.is_none());
        assert_eq!(root.visit_count, 0);
        assert_eq!(root.average_value(), 0.0);
    }

    #[test]
    fn test_expand_creates_children_in_catalog_order() {
        let provider = ScriptedProvider::silent();
        let mut transitions = Transitions::new(&provider);
        let mut tree = tree_for(full_example());

        let added = tree.expand(tree.root(), &mut transitions);
        assert_eq!(added, 3);

        let actions: Vec<Option<Action>> = tree
            .node(tree.root())
            .children
            .iter()
            .map(|&c| tree.node(c).action)
            .collect();
        assert_eq!(
            actions,
            vec![
                Some(Action::QaReasoning),
                Some(Action::MetaReasoning),
                Some(Action::PicReasoning)
            ]
        );
        for &child in &tree.node(tree.root()).children {
            let node = tree.node(child);
            assert_eq!(node.parent, Some(tree.root()));
            assert_eq!(node.depth, 1);
            assert_eq!(node.visit_count, 0);
            assert_eq!(node.value_sum, 0.0);
        }
    }

    #[test]
    fn test_expand_twice_is_a_noop() {
        let provider = ScriptedProvider::silent();
        let mut transitions = Transitions::new(&provider);
        let mut tree = tree_for(full_example());

        tree.expand(tree.root(), &mut transitions);
        let calls = provider.calls();
        assert_eq!(tree.expand(tree.root(), &mut transitions), 0);
        assert_eq!(tree.node(tree.root()).children.len(), 3);
        assert_eq!(tree.len(), 4);
        assert_eq!(provider.calls(), calls);
    }

    #[test]
    fn test_terminal_node_is_not_expanded() {
        let provider = ScriptedProvider::silent();
        let mut transitions = Transitions::new(&provider);
        let mut tree = tree_for(Example::new("n", "q", vec!["a".into()], 0));

        tree.expand(tree.root(), &mut transitions);
        let only_child = tree.node(tree.root()).children[0];
        assert!(tree.node(only_child).is_terminal());
        assert_eq!(tree.expand(only_child, &mut transitions), 0);
    }
}
