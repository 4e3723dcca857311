//! Dependency graph operations using petgraph.
//!
//! This module provides graph algorithms for the in-memory store:
//! - Cycle detection
//! - Dependency tree traversal (BFS)

use crate::domain::{DependencyEdge, EdgeId, TaskId};
use crate::error::{Error, Result};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// Internal implementation of cycle detection.
///
/// Uses petgraph's `has_path_connecting` to check if adding
/// an edge from `task_id` to `depends_on_id` would create a cycle.
pub(super) fn has_cycle_impl(
    graph: &DiGraph<TaskId, EdgeId>,
    node_map: &HashMap<TaskId, NodeIndex>,
    task_id: &TaskId,
    depends_on_id: &TaskId,
) -> Result<bool> {
    let from_node = node_map
        .get(task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
    let to_node = node_map
        .get(depends_on_id)
        .ok_or_else(|| Error::TaskNotFound(depends_on_id.clone()))?;

    // Check if there's already a path from `depends_on_id` to `task_id`.
    // If so, adding `task_id -> depends_on_id` would create a cycle.
    Ok(algo::has_path_connecting(graph, *to_node, *from_node, None))
}

/// Internal implementation of dependency tree traversal.
///
/// Uses BFS to traverse the dependency graph, returning all transitive
/// dependency edges with their depth level (1 for direct dependencies).
pub(super) fn dependency_tree_impl(
    graph: &DiGraph<TaskId, EdgeId>,
    node_map: &HashMap<TaskId, NodeIndex>,
    edges: &HashMap<EdgeId, DependencyEdge>,
    id: &TaskId,
    max_depth: Option<usize>,
) -> Result<Vec<(DependencyEdge, usize)>> {
    let start_node = node_map
        .get(id)
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();

    // Start BFS from direct dependencies (depth 1)
    for graph_edge in graph.edges(*start_node) {
        let target_node = graph_edge.target();
        if visited.insert(target_node) {
            queue.push_back((target_node, 1));
            // Skip graph edges with no matching record
            let Some(edge) = edges.get(graph_edge.weight()) else {
                continue;
            };
            result.push((edge.clone(), 1));
        }
    }

    // BFS traversal for transitive dependencies
    while let Some((current_node, depth)) = queue.pop_front() {
        // Check max depth limit
        if let Some(max) = max_depth {
            if depth >= max {
                continue;
            }
        }

        // Explore dependencies of current node
        for graph_edge in graph.edges(current_node) {
            let target_node = graph_edge.target();
            if visited.insert(target_node) {
                let next_depth = depth + 1;
                queue.push_back((target_node, next_depth));
                let Some(edge) = edges.get(graph_edge.weight()) else {
                    continue;
                };
                result.push((edge.clone(), next_depth));
            }
        }
    }

    Ok(result)
}
