//! Storage abstraction layer for truss.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends. It supports multiple implementations:
//!
//! - **In-memory**: Fast, ephemeral storage backed by HashMap and petgraph
//! - **JSONL**: Persistent file-based storage using JSON Lines format
//!
//! # Architecture
//!
//! The storage layer uses an async trait to enable both blocking (in-memory)
//! and truly async implementations. The trait is object-safe, allowing for
//! dynamic dispatch via `Box<dyn TaskStore>`.
//!
//! # Test Utilities
//!
//! This module provides a [`MockStore`] implementation for testing code that
//! depends on the [`TaskStore`] trait. To use it in your tests, enable the
//! `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! truss = { version = "...", features = ["test-util"] }
//! ```
//!
//! Then use `MockStore` in your tests:
//!
//! ```rust,ignore
//! use truss::storage::{MockStore, TaskStore};
//!
//! #[tokio::test]
//! async fn test_with_mock_store() {
//!     let store: Box<dyn TaskStore> = Box::new(MockStore::new());
//!     // Use store in tests...
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use truss::storage::{TaskStore, StorageBackend, create_storage};
//! use truss::domain::{NewTask, UserId};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     // Create in-memory storage with a prefix for task IDs.
//!     // In real applications, the prefix comes from TrussConfig.task_prefix.
//!     let mut store = create_storage(StorageBackend::InMemory, "myapp".to_string()).await?;
//!
//!     // Create a task
//!     let new_task = NewTask {
//!         title: "Implement feature X".to_string(),
//!         owner: UserId::new("alice"),
//!     };
//!
//!     let task = store.create_task(new_task).await?;
//!     println!("Created task: {}", task.id);
//!
//!     Ok(())
//! }
//! ```

use crate::domain::{
    DependencyEdge, DependencyKind, EdgeId, NewTask, Task, TaskFilter, TaskId, TaskStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// Storage backend implementations
pub mod in_memory;

/// Core storage trait for task and dependency management.
///
/// This trait defines the interface for all storage backends. Implementations
/// must be `Send + Sync` to support concurrent access in async contexts.
///
/// # Method Categories
///
/// - **Tasks**: `create_task`, `get_task`, `set_status`, `delete_task`, `list_tasks`
/// - **Edges**: `add_edge`, `remove_edge`, `get_edge`, `find_edge`
/// - **Graph Queries**: `outgoing_edges`, `incoming_edges`, `blocking_edges`,
///   `would_create_cycle`, `dependency_tree`
/// - **Batch Operations**: `import_tasks`, `export_all`
/// - **Persistence**: `save`, `reload`
///
/// # Error Handling
///
/// All methods return `Result<T>` where the error type includes:
/// - `TaskNotFound`: Requested task doesn't exist
/// - `HasDependents`: Cannot delete a task other tasks depend on
/// - `CycleDetected`: Operation would create a cycle
/// - `DuplicateDependency`: The edge already exists
/// - `EdgeNotFound`: No such edge on the given task
/// - `Storage`: Backend-specific errors
///
/// # Thread Safety
///
/// Implementations should use appropriate synchronization primitives
/// (`Arc<Mutex<T>>` for in-memory) to ensure thread-safe access.
#[async_trait]
pub trait TaskStore: Send + Sync {
    // ========== Task Operations ==========

    /// Create a new task.
    ///
    /// Generates a unique ID for the task and sets creation timestamps.
    ///
    /// # Implementation Requirements
    ///
    /// Implementations **MUST** validate input by calling `new_task.validate()`
    /// before creating the task. This ensures consistent validation across
    /// all storage backends.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if validation fails.
    async fn create_task(&mut self, new_task: NewTask) -> Result<Task>;

    /// Get a task by ID.
    ///
    /// Returns `None` if the task doesn't exist.
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Change a task's status, updating its `updated_at` timestamp.
    ///
    /// Returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    async fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<Task>;

    /// Delete a task.
    ///
    /// Removes the task and all its outgoing edges. Fails if other tasks
    /// depend on this one (to prevent orphaned edges).
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if the task doesn't exist
    /// - `Error::HasDependents` if other tasks depend on this task
    async fn delete_task(&mut self, id: &TaskId) -> Result<()>;

    /// List tasks matching the given filter.
    ///
    /// Results are ordered newest first. An empty filter returns all tasks.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    // ========== Edge Operations ==========

    /// Add a dependency edge between two tasks.
    ///
    /// The edge is directional: `task_id` depends on `depends_on_id`.
    /// The store enforces its structural invariants on every insert, so the
    /// graph can never hold a self-edge, a duplicate edge, or a cycle.
    ///
    /// Returns the created edge.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both endpoints are the same task
    /// - `Error::TaskNotFound` if either task doesn't exist
    /// - `Error::DuplicateDependency` if the edge already exists
    /// - `Error::CycleDetected` if this would create a cycle
    async fn add_edge(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        kind: DependencyKind,
    ) -> Result<DependencyEdge>;

    /// Remove a dependency edge, addressed by its ID and owning task.
    ///
    /// Returns the removed edge.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if the owning task doesn't exist
    /// - `Error::EdgeNotFound` if the edge doesn't exist or belongs to a
    ///   different task
    async fn remove_edge(&mut self, task_id: &TaskId, edge_id: &EdgeId) -> Result<DependencyEdge>;

    /// Get an edge by ID.
    ///
    /// Returns `None` if the edge doesn't exist.
    async fn get_edge(&self, edge_id: &EdgeId) -> Result<Option<DependencyEdge>>;

    /// Find the edge between two tasks, if one exists.
    async fn find_edge(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<Option<DependencyEdge>>;

    // ========== Graph Queries ==========

    /// Get all edges leaving a task (the tasks it depends on).
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    async fn outgoing_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>>;

    /// Get all edges pointing at a task (the tasks that depend on it).
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    async fn incoming_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>>;

    /// Get the blocking subset of a task's outgoing edges.
    ///
    /// Informational edges never gate a task, so start checks only look at
    /// these.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    async fn blocking_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>>;

    /// Check if adding an edge would create a cycle.
    ///
    /// Returns `true` if adding `task_id -> depends_on_id` would create a
    /// circular dependency.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if either task doesn't exist.
    async fn would_create_cycle(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<bool>;

    /// Get the full dependency tree for a task.
    ///
    /// Performs a breadth-first traversal of the dependency graph starting
    /// from the given task, returning all transitive dependencies with their
    /// depth in the tree. The result is ordered by traversal order (BFS).
    ///
    /// # Arguments
    ///
    /// * `id` - The root task ID to start traversal from
    /// * `max_depth` - Optional maximum depth to traverse (None for unlimited)
    ///
    /// # Returns
    ///
    /// A vector of tuples containing:
    /// - The dependency edge
    /// - The depth in the tree (1 for direct dependencies, 2 for their dependencies, etc.)
    ///
    /// # Example
    ///
    /// For a dependency chain A -> B -> C, calling `dependency_tree(&A, None)` returns:
    /// - (A -> B, 1) - direct dependency
    /// - (B -> C, 2) - transitive dependency
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task doesn't exist.
    async fn dependency_tree(
        &self,
        id: &TaskId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(DependencyEdge, usize)>>;

    // ========== Batch Operations ==========

    /// Import multiple tasks.
    ///
    /// Used for bulk loading from JSONL files. Edges are resolved after all
    /// tasks are imported.
    async fn import_tasks(&mut self, tasks: Vec<Task>) -> Result<()>;

    /// Export all tasks.
    ///
    /// Returns all tasks in the store, suitable for JSONL export or backup.
    async fn export_all(&self) -> Result<Vec<Task>>;

    // ========== Persistence ==========

    /// Save changes to persistent storage.
    ///
    /// This method takes `&self` (not `&mut self`) to allow saving from shared
    /// references. Implementations use interior mutability (e.g., `Arc<Mutex<>>`)
    /// to handle this safely. This design choice enables:
    /// - Saving after read-only queries without requiring exclusive access
    /// - Periodic auto-save operations from background tasks
    /// - Explicit save points in transaction-like workflows
    ///
    /// For in-memory storage with JSONL backing, this writes to disk.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding in-memory changes.
    ///
    /// This method restores the store to match the on-disk state, discarding
    /// any in-memory modifications that haven't been saved. It keeps
    /// long-running processes consistent when a `save()` operation fails.
    ///
    /// # Use Case
    ///
    /// When an operation modifies in-memory state but `save()` fails:
    /// 1. In-memory state has unsaved changes
    /// 2. On-disk state is unchanged
    /// 3. Subsequent operations would see inconsistent state
    /// 4. Call `reload()` to restore in-memory state to match disk
    ///
    /// # Implementation Notes
    ///
    /// - **JSONL backend**: Re-reads the file and rebuilds in-memory state
    /// - **In-memory only**: No-op (there's no persistent state to reload from)
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
///
/// Determines which storage implementation to use.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    ///
    /// Returns `Some(path)` for backends that use a file (e.g., JSONL),
    /// or `None` for backends that don't (e.g., InMemory).
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to any storage backend.
///
/// This wrapper holds a reference to the file path and implements `save()`
/// by writing all tasks to the JSONL file atomically.
struct JsonlBackedStore {
    inner: Box<dyn TaskStore>,
    path: PathBuf,
    prefix: String,
}

#[async_trait]
impl TaskStore for JsonlBackedStore {
    async fn create_task(&mut self, new_task: NewTask) -> Result<Task> {
        self.inner.create_task(new_task).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        self.inner.set_status(id, status).await
    }

    async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        self.inner.delete_task(id).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.inner.list_tasks(filter).await
    }

    async fn add_edge(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        kind: DependencyKind,
    ) -> Result<DependencyEdge> {
        self.inner.add_edge(task_id, depends_on_id, kind).await
    }

    async fn remove_edge(&mut self, task_id: &TaskId, edge_id: &EdgeId) -> Result<DependencyEdge> {
        self.inner.remove_edge(task_id, edge_id).await
    }

    async fn get_edge(&self, edge_id: &EdgeId) -> Result<Option<DependencyEdge>> {
        self.inner.get_edge(edge_id).await
    }

    async fn find_edge(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<Option<DependencyEdge>> {
        self.inner.find_edge(task_id, depends_on_id).await
    }

    async fn outgoing_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        self.inner.outgoing_edges(id).await
    }

    async fn incoming_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        self.inner.incoming_edges(id).await
    }

    async fn blocking_edges(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        self.inner.blocking_edges(id).await
    }

    async fn would_create_cycle(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<bool> {
        self.inner.would_create_cycle(task_id, depends_on_id).await
    }

    async fn dependency_tree(
        &self,
        id: &TaskId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(DependencyEdge, usize)>> {
        self.inner.dependency_tree(id, max_depth).await
    }

    async fn import_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.inner.import_tasks(tasks).await
    }

    async fn export_all(&self) -> Result<Vec<Task>> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        // Reload from the JSONL file, replacing the inner store
        if self.path.exists() {
            let (new_store, warnings) =
                in_memory::load_from_jsonl(&self.path, self.prefix.clone()).await?;
            if !warnings.is_empty() {
                for warning in &warnings {
                    tracing::warn!(warning = ?warning, "JSONL reload warning");
                }
            }
            self.inner = new_store;
        } else {
            // File doesn't exist - reset to empty storage
            self.inner = in_memory::new_in_memory_store(self.prefix.clone());
        }
        Ok(())
    }
}

/// Create a storage instance for the given backend.
///
/// This factory function returns a trait object that can be used
/// polymorphically regardless of the backend implementation.
///
/// # Arguments
///
/// * `backend` - The storage backend to use
/// * `prefix` - The prefix for generated task IDs (e.g., "task", "myapp")
///
/// # Example
///
/// ```no_run
/// use truss::storage::{create_storage, StorageBackend};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let store = create_storage(StorageBackend::InMemory, "task".to_string()).await?;
///     // Use store...
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - `Error::Io` if file operations fail (JSONL backend)
/// - `Error::Storage` for backend-specific initialization errors
pub async fn create_storage(backend: StorageBackend, prefix: String) -> Result<Box<dyn TaskStore>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_store(prefix)),
        StorageBackend::Jsonl(path) => {
            // JSONL backend uses in-memory storage with file persistence
            let inner = if path.exists() {
                let (store, warnings) = in_memory::load_from_jsonl(&path, prefix.clone()).await?;
                if !warnings.is_empty() {
                    // Log warnings but continue - storage is still usable
                    for warning in &warnings {
                        tracing::warn!(warning = ?warning, "JSONL load warning");
                    }
                }
                store
            } else {
                // File doesn't exist yet (first run) - create empty storage
                in_memory::new_in_memory_store(prefix.clone())
            };
            // Wrap in JsonlBackedStore so save() writes to file
            Ok(Box::new(JsonlBackedStore {
                inner,
                path,
                prefix,
            }))
        }
    }
}

// ========== Test Utilities ==========

/// The hardcoded task ID returned by [`MockStore`].
#[cfg(any(test, feature = "test-util"))]
pub const MOCK_TASK_ID: &str = "test-1";

/// Mock implementation of [`TaskStore`] for testing.
///
/// This is a **stateless** mock that provides a minimal implementation of the
/// storage trait for verifying trait object usage. It always returns hardcoded
/// data for task "test-1" but does not persist any data between calls.
/// Timestamps are generated fresh on each call.
///
/// # Availability
///
/// This type is available when:
/// - Running tests (`#[cfg(test)]`)
/// - The `test-util` feature is enabled
///
/// # Behavior
///
/// - `create_task`: Always returns a new task with ID "test-1"
/// - `get_task`: Returns `Some` only for ID "test-1", `None` otherwise
/// - `list_tasks`, `export_all`: Return empty vectors
/// - `get_edge`, `find_edge`: Return `None`
/// - `outgoing_edges`, `incoming_edges`, `blocking_edges`, `dependency_tree`: Return empty vectors
/// - `would_create_cycle`: Always returns `false`
/// - Other methods: Unimplemented (will panic if called)
///
/// # When to Use MockStore vs In-Memory Storage
///
/// **Use `MockStore` when:**
/// - You only need to verify trait object compilation and basic usage
/// - You don't need to actually store or retrieve real data
/// - You're testing code paths that accept `Box<dyn TaskStore>`
///
/// **Use [`in_memory::new_in_memory_store`] when:**
/// - You need actual task and edge functionality in tests
/// - You're testing dependency graphs and relationships
/// - You need to verify business logic with real data persistence
///
/// # Thread Safety
///
/// `MockStore` is inherently thread-safe as it contains no mutable state
/// (it's a zero-sized type). For testing concurrent access patterns, use the
/// in-memory backend which properly handles synchronization.
#[cfg(any(test, feature = "test-util"))]
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct MockStore;

#[cfg(any(test, feature = "test-util"))]
impl MockStore {
    /// Create a new MockStore instance.
    pub fn new() -> Self {
        Self
    }

    /// Creates a test task with the given ID.
    ///
    /// This is useful for creating expected values in downstream tests that
    /// need to match the format returned by [`MockStore`].
    pub fn create_test_task(id: TaskId) -> Task {
        use crate::domain::UserId;
        use chrono::Utc;

        Task {
            id,
            title: "Test Task".to_string(),
            owner: UserId::new("tester"),
            status: TaskStatus::Pending,
            depends_on: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl TaskStore for MockStore {
    async fn create_task(&mut self, _new_task: NewTask) -> Result<Task> {
        Ok(Self::create_test_task(TaskId::new(MOCK_TASK_ID)))
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        if id.as_str() == MOCK_TASK_ID {
            Ok(Some(Self::create_test_task(id.clone())))
        } else {
            Ok(None)
        }
    }

    async fn set_status(&mut self, _id: &TaskId, _status: TaskStatus) -> Result<Task> {
        unimplemented!(
            "MockStore::set_status() is not implemented. Use in_memory::new_in_memory_store() for full functionality."
        )
    }

    async fn delete_task(&mut self, _id: &TaskId) -> Result<()> {
        unimplemented!(
            "MockStore::delete_task() is not implemented. Use in_memory::new_in_memory_store() for full functionality."
        )
    }

    async fn list_tasks(&self, _filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(vec![])
    }

    async fn add_edge(
        &mut self,
        _task_id: &TaskId,
        _depends_on_id: &TaskId,
        _kind: DependencyKind,
    ) -> Result<DependencyEdge> {
        unimplemented!(
            "MockStore::add_edge() is not implemented. Use in_memory::new_in_memory_store() for full functionality."
        )
    }

    async fn remove_edge(
        &mut self,
        _task_id: &TaskId,
        _edge_id: &EdgeId,
    ) -> Result<DependencyEdge> {
        unimplemented!(
            "MockStore::remove_edge() is not implemented. Use in_memory::new_in_memory_store() for full functionality."
        )
    }

    async fn get_edge(&self, _edge_id: &EdgeId) -> Result<Option<DependencyEdge>> {
        Ok(None)
    }

    async fn find_edge(
        &self,
        _task_id: &TaskId,
        _depends_on_id: &TaskId,
    ) -> Result<Option<DependencyEdge>> {
        Ok(None)
    }

    async fn outgoing_edges(&self, _id: &TaskId) -> Result<Vec<DependencyEdge>> {
        Ok(vec![])
    }

    async fn incoming_edges(&self, _id: &TaskId) -> Result<Vec<DependencyEdge>> {
        Ok(vec![])
    }

    async fn blocking_edges(&self, _id: &TaskId) -> Result<Vec<DependencyEdge>> {
        Ok(vec![])
    }

    async fn would_create_cycle(
        &self,
        _task_id: &TaskId,
        _depends_on_id: &TaskId,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn dependency_tree(
        &self,
        _id: &TaskId,
        _max_depth: Option<usize>,
    ) -> Result<Vec<(DependencyEdge, usize)>> {
        Ok(vec![])
    }

    async fn import_tasks(&mut self, _tasks: Vec<Task>) -> Result<()> {
        Ok(())
    }

    async fn export_all(&self) -> Result<Vec<Task>> {
        Ok(vec![])
    }

    async fn save(&self) -> Result<()> {
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // MockStore has no backing store, so reload is a no-op
        Ok(())
    }
}
