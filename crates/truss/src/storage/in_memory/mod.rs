//! In-memory storage backend using HashMap and petgraph.
//!
//! This module provides a fast, **ephemeral** storage implementation where all data
//! is held in RAM and **lost when the process exits**. It is suitable for:
//!
//! - Testing and development
//! - Short-lived CLI sessions
//! - Performance benchmarking
//!
//! # Persistence
//!
//! This backend supports **optional JSONL persistence** via the `load_from_jsonl()` and
//! `save_to_jsonl()` functions. Data can be loaded from and saved to disk while maintaining
//! fast in-memory operations.
//!
//! - **In-memory only**: Use `new_in_memory_store()` for ephemeral storage
//! - **With persistence**: Use `load_from_jsonl()` to load from disk, then periodically
//!   call `save_to_jsonl()` to persist changes
//!
//! The trait's `save()` method is a no-op for in-memory storage. Use `save_to_jsonl()`
//! directly for file-based persistence.
//!
//! # Architecture
//!
//! The implementation uses:
//! - `HashMap<TaskId, Task>` for O(1) task lookups
//! - `petgraph::DiGraph` for the dependency graph with cycle detection
//! - `HashMap<TaskId, NodeIndex>` for mapping tasks to graph nodes
//! - `HashMap<EdgeId, DependencyEdge>` for O(1) edge lookups by ID
//! - Hash-based ID generation with adaptive length (4-6 chars)
//!
//! ## Graph Representation and Edge Direction Convention
//!
//! The dependency graph uses a **dependent -> dependency** edge direction pattern:
//!
//! - **Edge source**: The task that has the dependency (the dependent)
//! - **Edge target**: The task being depended upon (the dependency)
//! - **Edge weight**: The [`EdgeId`](crate::domain::EdgeId) of the full
//!   [`DependencyEdge`](crate::domain::DependencyEdge) in the edge table
//!
//! **Concrete examples:**
//!
//! - **Blocking**: If task A cannot start until task B completes, the edge is `A -> B`
//! - **Informational**: If task X merely references task Y, the edge is `X -> Y`
//!
//! ## Blocking Semantics
//!
//! A task is considered **blocked** when it has at least one blocking edge to a
//! task that is not completed. Informational edges never gate a task's start.
//! Cancelled dependencies do not satisfy their dependents; only completion does.
//!
//! ## Structural Invariants
//!
//! Every edge insert is validated, so the graph never holds a self-edge, a
//! duplicate edge between the same pair, or a cycle. The graph, the edge table,
//! and each task's `depends_on` mirror are updated together and must stay in sync.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<InMemoryStoreInner>>` to provide thread-safe
//! access in async contexts. All operations acquire the mutex lock, ensuring safe
//! concurrent access from multiple tasks.
//!
//! # Performance Characteristics
//!
//! - Create: O(1) amortized, O(n) when crossing ID length thresholds (500, 1500 tasks)
//! - Read: O(1) for single task or edge lookups
//! - Delete: O(d) where d is the number of incident edges
//! - Cycle check: O(n + e) path search in the graph
//! - Dependency tree: O(n + e) BFS traversal

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::TaskStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export public API
pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory store.
///
/// This type alias wraps the inner store in `Arc<Mutex<>>` for thread-safe
/// async access. It implements [`TaskStore`] via the trait implementation
/// in `trait_impl.rs`.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new in-memory store instance.
///
/// # Arguments
///
/// * `prefix` - The prefix for task IDs (e.g., "task")
///
/// # Example
///
/// ```
/// use truss::storage::in_memory::new_in_memory_store;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = new_in_memory_store("task".to_string());
///     // Use store...
/// }
/// ```
pub fn new_in_memory_store(prefix: String) -> Box<dyn TaskStore> {
    Box::new(Arc::new(Mutex::new(InMemoryStoreInner::new(prefix))))
}
