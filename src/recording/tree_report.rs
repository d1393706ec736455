use crate::mcts::mcts_result::{MCTSResult, NodeReport};
use std::fmt::Write;

/// Renders the search tree one node per line, children indented under parents.
///
/// Format: `Trace=<last trace entry or ROOT> | V=<value_sum>, N=<visits>`
pub fn render_tree(result: &MCTSResult) -> String {
    let mut out = String::new();
    if let Some(root) = result.root() {
        render_node(result, root, 0, &mut out);
    }
    out
}

fn render_node(result: &MCTSResult, node: &NodeReport, indent: usize, out: &mut String) {
    let label = node.last_trace.as_deref().unwrap_or("ROOT");
    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "{}Trace={} | V={}, N={}",
        "  ".repeat(indent),
        label,
        node.value_sum,
        node.visit_count
    );
    for child in result.children_of(node.id) {
        render_node(result, child, indent + 1, out);
    }
}

/// One-line summary of a run
pub fn summarize(result: &MCTSResult) -> String {
    let actions: Vec<String> = result.actions.iter().map(|a| a.to_string()).collect();
    format!(
        "example={} actions=[{}] answer={} correct={} rollouts={} nodes={}",
        result.example_id,
        actions.join(" -> "),
        result
            .predicted_answer
            .map_or("none".to_string(), |a| a.to_string()),
        result.correct,
        result.rollouts_completed,
        result.tree.len()
    )
}
