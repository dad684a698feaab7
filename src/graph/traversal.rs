use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use super::node::{WorkflowEdge, WorkflowNode};

/// Computes the transitive upstream node set of `node_id`.
///
/// Breadth-first walk over reverse edges. The visited set is seeded with
/// the start node itself, so cycles through it can never re-enqueue it and
/// the walk terminates on any graph. Returns nodes in BFS discovery order,
/// excluding the start node; edge endpoints with no matching node are
/// dropped.
pub fn predecessors<'a>(
    node_id: &str,
    nodes: &'a [WorkflowNode],
    edges: &[WorkflowEdge],
) -> Vec<&'a WorkflowNode> {
    let mut incoming: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in edges {
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let by_id: AHashMap<&str, &WorkflowNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    let mut visited: AHashSet<&str> = AHashSet::new();
    visited.insert(node_id);
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(node_id);

    let mut discovered = Vec::new();
    while let Some(current) = queue.pop_front() {
        for &source in incoming.get(current).into_iter().flatten() {
            if visited.insert(source) {
                if let Some(node) = by_id.get(source) {
                    discovered.push(*node);
                }
                queue.push_back(source);
            }
        }
    }

    discovered
}
