//! TaskStore trait implementation for the in-memory store.

use super::graph::{dependency_tree_impl, has_cycle_impl};
use super::InMemoryStore;
use crate::domain::{
    DependencyEdge, DependencyKind, EdgeId, NewTask, Task, TaskFilter, TaskId, TaskStatus,
};
use crate::error::{Error, Result};
use crate::storage::TaskStore;
use async_trait::async_trait;
use chrono::Utc;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn create_task(&mut self, new_task: NewTask) -> Result<Task> {
        let mut inner = self.lock().await;

        // Validate before any mutation
        new_task
            .validate()
            .map_err(|e| Error::Storage(format!("Validation failed: {}", e)))?;

        let id = inner.generate_id(&new_task)?;

        let now = Utc::now();
        let task = Task {
            id: id.clone(),
            title: new_task.title,
            owner: new_task.owner,
            status: TaskStatus::Pending,
            depends_on: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let node = inner.graph.add_node(id.clone());
        inner.node_map.insert(id.clone(), node);
        inner.tasks.insert(id.clone(), task.clone());

        Ok(task)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        let inner = self.lock().await;
        Ok(inner.tasks.get(id).cloned())
    }

    async fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        let mut inner = self.lock().await;

        let task = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

        task.status = status;
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        let mut inner = self.lock().await;

        // Check if task exists
        if !inner.tasks.contains_key(id) {
            return Err(Error::TaskNotFound(id.clone()));
        }

        // Check for dependents
        let node = inner.node_map[id];
        let dependents: Vec<_> = inner
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| inner.graph[edge.source()].clone())
            .collect();

        if !dependents.is_empty() {
            return Err(Error::HasDependents {
                task_id: id.clone(),
                dependent_count: dependents.len(),
                dependents,
            });
        }

        // Drop the task's outgoing edges from the edge table
        let edge_ids: Vec<EdgeId> = inner.tasks[id]
            .depends_on
            .iter()
            .map(|record| record.edge_id.clone())
            .collect();
        for edge_id in edge_ids {
            inner.edges.remove(&edge_id);
        }

        // Remove from graph
        inner.graph.remove_node(node);
        inner.node_map.remove(id);

        // remove_node swaps the last node into the freed slot, so the moved
        // node's map entry must be updated to point at its new index
        if let Some(moved_id) = inner.graph.node_weight(node).cloned() {
            inner.node_map.insert(moved_id, node);
        }

        // Remove from tasks
        inner.tasks.remove(id);

        Ok(())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let inner = self.lock().await;

        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| {
                // Apply status filter
                if let Some(status) = &filter.status {
                    if &task.status != status {
                        return false;
                    }
                }

                // Apply owner filter
                if let Some(owner) = &filter.owner {
                    if &task.owner != owner {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();

        // Sort by created_at (most recent first)
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // Apply limit if specified
        if let Some(limit) = filter.limit {
            tasks.truncate(limit);
        }

        Ok(tasks)
    }

    async fn add_edge(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        kind: DependencyKind,
    ) -> Result<DependencyEdge> {
        let mut inner = self.lock().await;

        // A task can never depend on itself
        if task_id == depends_on_id {
            return Err(Error::SelfDependency(task_id.clone()));
        }

        // Validate both tasks exist
        if !inner.tasks.contains_key(task_id) {
            return Err(Error::TaskNotFound(task_id.clone()));
        }
        if !inner.tasks.contains_key(depends_on_id) {
            return Err(Error::TaskNotFound(depends_on_id.clone()));
        }

        // Get node indices (we know they exist from the checks above)
        let from_node = inner.node_map[task_id];
        let to_node = inner.node_map[depends_on_id];

        // Check for duplicate dependency using graph lookup
        if inner.graph.find_edge(from_node, to_node).is_some() {
            return Err(Error::DuplicateDependency {
                task_id: task_id.clone(),
                depends_on_id: depends_on_id.clone(),
            });
        }

        // Check for cycles (must be done after duplicate check to avoid false positives)
        if has_cycle_impl(&inner.graph, &inner.node_map, task_id, depends_on_id)? {
            return Err(Error::CycleDetected {
                task_id: task_id.clone(),
                depends_on_id: depends_on_id.clone(),
            });
        }

        let edge_id = inner.generate_edge_id(task_id, depends_on_id)?;
        let edge = DependencyEdge {
            id: edge_id.clone(),
            task_id: task_id.clone(),
            depends_on_id: depends_on_id.clone(),
            kind,
            created_at: Utc::now(),
        };

        // Add to graph and edge table
        inner.graph.add_edge(from_node, to_node, edge_id.clone());
        inner.edges.insert(edge_id, edge.clone());

        // Also add to the task's depends_on vector for JSONL serialization
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        task.depends_on.push(edge.to_record());

        Ok(edge)
    }

    async fn remove_edge(&mut self, task_id: &TaskId, edge_id: &EdgeId) -> Result<DependencyEdge> {
        let mut inner = self.lock().await;

        if !inner.tasks.contains_key(task_id) {
            return Err(Error::TaskNotFound(task_id.clone()));
        }

        // The edge must exist and belong to the addressed task
        let edge = match inner.edges.get(edge_id) {
            Some(edge) if edge.task_id == *task_id => edge.clone(),
            _ => {
                return Err(Error::EdgeNotFound {
                    edge_id: edge_id.clone(),
                    task_id: task_id.clone(),
                });
            }
        };

        // Remove from graph
        if let (Some(&from_node), Some(&to_node)) = (
            inner.node_map.get(task_id),
            inner.node_map.get(&edge.depends_on_id),
        ) {
            if let Some(graph_edge) = inner.graph.find_edge(from_node, to_node) {
                inner.graph.remove_edge(graph_edge);
            }
        }

        inner.edges.remove(edge_id);

        // Also remove from the task's depends_on vector for JSONL serialization
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        task.depends_on.retain(|record| record.edge_id != *edge_id);

        Ok(edge)
    }

    async fn get_edge(&self, edge_id: &EdgeId) -> Result<Option<DependencyEdge>> {
        let inner = self.lock().await;
        Ok(inner.edges.get(edge_id).cloned())
    }

    async fn find_edge(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<Option<DependencyEdge>> {
        let inner = self.lock().await;

        let (Some(&from_node), Some(&to_node)) = (
            inner.node_map.get(task_id),
            inner.node_map.get(depends_on_id),
        ) else {
            return Ok(None);
        };

        let Some(graph_edge) = inner.graph.find_edge(from_node, to_node) else {
            return Ok(None);
        };

        let edge_id = &inner.graph[graph_edge];
        Ok(inner.edges.get(edge_id).cloned())
    }

    async fn outgoing_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;

        let node = inner
            .node_map
            .get(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

        let edges = inner
            .graph
            .edges(*node)
            .filter_map(|edge| inner.edges.get(edge.weight()).cloned())
            .collect();

        Ok(edges)
    }

    async fn incoming_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;

        let node = inner
            .node_map
            .get(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

        let edges = inner
            .graph
            .edges_directed(*node, Direction::Incoming)
            .filter_map(|edge| inner.edges.get(edge.weight()).cloned())
            .collect();

        Ok(edges)
    }

    async fn blocking_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        let inner = self.lock().await;

        let node = inner
            .node_map
            .get(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

        let edges = inner
            .graph
            .edges(*node)
            .filter_map(|edge| inner.edges.get(edge.weight()))
            .filter(|edge| edge.kind.is_blocking())
            .cloned()
            .collect();

        Ok(edges)
    }

    async fn would_create_cycle(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<bool> {
        let inner = self.lock().await;
        has_cycle_impl(&inner.graph, &inner.node_map, task_id, depends_on_id)
    }

    async fn dependency_tree(
        &self,
        id: &TaskId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(DependencyEdge, usize)>> {
        let inner = self.lock().await;
        dependency_tree_impl(&inner.graph, &inner.node_map, &inner.edges, id, max_depth)
    }

    async fn import_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        let mut inner = self.lock().await;

        // First pass: Add all tasks and create nodes
        for task in &tasks {
            // Add to graph
            let node = inner.graph.add_node(task.id.clone());
            inner.node_map.insert(task.id.clone(), node);

            // Store task
            inner.tasks.insert(task.id.clone(), task.clone());

            // Register ID with generator
            inner.id_generator.register_id(task.id.as_str().to_string());
        }

        // Second pass: Reconstruct dependency edges
        // Now that all tasks are loaded, we can safely add edges
        let mut pruned: Vec<(TaskId, EdgeId)> = Vec::new();
        for task in &tasks {
            for record in &task.depends_on {
                // Skip orphaned records (target doesn't exist).
                // This provides resilience for corrupted JSONL files.
                if !inner.node_map.contains_key(&record.depends_on_id) {
                    pruned.push((task.id.clone(), record.edge_id.clone()));
                    continue;
                }

                // Skip records that would break the graph's invariants
                let from_node = inner.node_map[&task.id];
                let to_node = inner.node_map[&record.depends_on_id];
                if inner.graph.find_edge(from_node, to_node).is_some() {
                    pruned.push((task.id.clone(), record.edge_id.clone()));
                    continue;
                }
                if has_cycle_impl(&inner.graph, &inner.node_map, &task.id, &record.depends_on_id)? {
                    pruned.push((task.id.clone(), record.edge_id.clone()));
                    continue;
                }

                // Add edge to graph and edge table
                inner
                    .graph
                    .add_edge(from_node, to_node, record.edge_id.clone());
                inner
                    .edges
                    .insert(record.edge_id.clone(), record.to_edge(&task.id));
                inner
                    .id_generator
                    .register_id(record.edge_id.as_str().to_string());
            }
        }

        // Skipped records also come out of the stored task's depends_on list,
        // so the mirror stays consistent with the graph
        for (task_id, edge_id) in pruned {
            if let Some(task) = inner.tasks.get_mut(&task_id) {
                task.depends_on.retain(|record| record.edge_id != edge_id);
            }
        }

        Ok(())
    }

    async fn export_all(&self) -> Result<Vec<Task>> {
        let inner = self.lock().await;
        Ok(inner.tasks.values().cloned().collect())
    }

    async fn save(&self) -> Result<()> {
        // In-memory storage doesn't persist to disk
        // This is a no-op for this implementation
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // In-memory storage has no backing store to reload from
        // This is a no-op for this implementation
        Ok(())
    }
}
