//! Core in-memory storage data structures.
//!
//! This module contains the inner store structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{DependencyEdge, EdgeId, NewTask, Task, TaskId};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Inner store structure (not thread-safe).
///
/// This contains the actual data structures for storing tasks and
/// managing the dependency graph. It's wrapped in `Arc<Mutex<>>` for
/// thread safety.
///
/// # Graph Representation
///
/// The dependency graph uses petgraph's `DiGraph` with edges directed from
/// **dependent to dependency** (i.e., source -> target means source depends on target).
///
/// See the module-level documentation for detailed edge direction conventions
/// and blocking semantics.
pub(crate) struct InMemoryStoreInner {
    /// Tasks indexed by ID for O(1) lookups
    pub(super) tasks: HashMap<TaskId, Task>,

    /// Dependency graph using petgraph.
    ///
    /// Nodes contain `TaskId` values, edge weights contain the `EdgeId` of
    /// the full edge in `self.edges`.
    /// Edge direction: source (dependent) -> target (dependency).
    pub(super) graph: DiGraph<TaskId, EdgeId>,

    /// Mapping from TaskId to graph NodeIndex.
    ///
    /// Used to efficiently locate nodes in the graph. All tasks in `self.tasks`
    /// must have a corresponding entry in `self.node_map`.
    pub(super) node_map: HashMap<TaskId, NodeIndex>,

    /// Dependency edges indexed by ID.
    ///
    /// Every edge in `self.graph` has a corresponding entry here, and every
    /// entry is mirrored in the owning task's `depends_on` list.
    pub(super) edges: HashMap<EdgeId, DependencyEdge>,

    /// ID generator for creating new task and edge IDs
    pub(super) id_generator: IdGenerator,

    /// Prefix for task IDs (e.g., "task")
    prefix: String,
}

impl InMemoryStoreInner {
    /// Create a new empty store instance
    pub(crate) fn new(prefix: String) -> Self {
        let config = IdGeneratorConfig {
            prefix: prefix.clone(),
            database_size: 0,
        };

        Self {
            tasks: HashMap::new(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            edges: HashMap::new(),
            id_generator: IdGenerator::new(config),
            prefix,
        }
    }

    /// Update the ID generator's database size if we've crossed a threshold.
    ///
    /// ID length changes at 500 and 1500 tasks, so we only need to update
    /// when crossing these boundaries. This avoids O(n) re-registration on every create.
    pub(super) fn update_id_generator_if_needed(&mut self) {
        let current_size = self.tasks.len();
        let old_size = self.id_generator.database_size();

        // Determine if we've crossed a length threshold
        let needs_update = match (old_size, current_size) {
            // Crossing 500 boundary (4 -> 5 chars)
            (0..=500, 501..) => true,
            // Crossing 1500 boundary (5 -> 6 chars)
            (0..=1500, 1501..) => true,
            // Crossing backwards (rare, but possible after deletes)
            (501.., 0..=500) => true,
            (1501.., 0..=1500) => true,
            _ => false,
        };

        if needs_update {
            // Only recreate generator when crossing length thresholds
            self.id_generator = IdGenerator::new(IdGeneratorConfig {
                prefix: self.prefix.clone(),
                database_size: current_size,
            });

            // Re-register all existing IDs (O(n), but only at thresholds)
            for id in self.tasks.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
            for id in self.edges.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
        }
    }

    /// Generate a new unique ID for a task
    pub(super) fn generate_id(&mut self, new_task: &NewTask) -> Result<TaskId> {
        // Update generator config if we've crossed a length threshold
        self.update_id_generator_if_needed();

        let id_str = self
            .id_generator
            .generate(&new_task.title, new_task.owner.as_str())
            .map_err(|e| Error::Storage(format!("ID generation failed: {}", e)))?;

        Ok(TaskId::new(id_str))
    }

    /// Generate a new unique ID for a dependency edge
    pub(super) fn generate_edge_id(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<EdgeId> {
        let id_str = self
            .id_generator
            .generate_edge_id(task_id.as_str(), depends_on_id.as_str())
            .map_err(|e| Error::Storage(format!("Edge ID generation failed: {}", e)))?;

        Ok(EdgeId::new(id_str))
    }
}
