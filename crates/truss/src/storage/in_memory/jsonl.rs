//! JSONL persistence for the in-memory store.
//!
//! This module provides functions to load and save the in-memory store
//! to JSONL (JSON Lines) files.

use super::graph::has_cycle_impl;
use super::inner::InMemoryStoreInner;
use crate::domain::{Task, TaskId};
use crate::error::{Error, Result, StorageError};
use crate::storage::TaskStore;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use truss_jsonl::{read_jsonl_resilient, write_jsonl_atomic_iter, Warning as JsonlWarning};

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal problems that don't prevent loading but indicate
/// data quality issues in the JSONL file. When warnings occur, the load
/// operation continues but problematic data is skipped or sanitized.
///
/// # Handling Warnings
///
/// Applications should log or report these warnings to users, as they indicate
/// data corruption or integrity issues that may need manual resolution.
///
/// **Example:**
/// ```no_run
/// # use truss::storage::in_memory::load_from_jsonl;
/// # use std::path::Path;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let (store, warnings) = load_from_jsonl(
///     Path::new(".truss/tasks.jsonl"),
///     "task".to_string()
/// ).await?;
///
/// for warning in warnings {
///     match warning {
///         truss::storage::in_memory::LoadWarning::MalformedJson { line_number, error } => {
///             eprintln!("Skipped malformed JSON at line {}: {}", line_number, error);
///         }
///         truss::storage::in_memory::LoadWarning::OrphanedDependency { from, to } => {
///             eprintln!("Skipped orphaned dependency: {} -> {}", from, to);
///         }
///         truss::storage::in_memory::LoadWarning::DuplicateDependency { from, to } => {
///             eprintln!("Skipped duplicate dependency: {} -> {}", from, to);
///         }
///         truss::storage::in_memory::LoadWarning::CircularDependency { from, to } => {
///             eprintln!("Broke circular dependency: {} -> {}", from, to);
///         }
///         truss::storage::in_memory::LoadWarning::InvalidTaskData { task_id, line_number, error } => {
///             eprintln!("Skipped invalid task {} at line {}: {}", task_id, line_number, error);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// Malformed JSON line that couldn't be parsed
    ///
    /// **Effect**: Line is skipped entirely; no task created from this line.
    /// **Common causes**: File corruption, manual editing errors, incomplete writes.
    MalformedJson { line_number: usize, error: String },

    /// Dependency record references a task that doesn't exist in the file
    ///
    /// **Effect**: The edge is skipped; both tasks are still loaded, but the
    /// dependency relationship is not created.
    /// **Common causes**: Partial exports, deleted tasks, file corruption.
    OrphanedDependency { from: TaskId, to: TaskId },

    /// A second dependency record covers the same pair of tasks
    ///
    /// **Effect**: The first record wins; the repeated edge is skipped.
    /// **Common causes**: Manual JSONL editing, merge conflicts resolved by hand.
    DuplicateDependency { from: TaskId, to: TaskId },

    /// Adding a dependency record would create a circular reference
    ///
    /// **Effect**: The edge is skipped to break the cycle; both tasks are
    /// loaded but one edge is omitted.
    /// **Common causes**: Manual JSONL editing, bugs in earlier versions.
    CircularDependency { from: TaskId, to: TaskId },

    /// Task data failed validation (blank title, title length, etc.)
    ///
    /// **Effect**: The entire task is skipped and not loaded into the store.
    /// **Common causes**: Manual editing, version mismatches, data corruption.
    InvalidTaskData {
        task_id: TaskId,
        line_number: usize,
        error: String,
    },
}

/// Load a store from a JSONL file.
///
/// This function reads a JSONL (JSON Lines) file where each line is a serialized `Task`.
/// It reconstructs both the tasks and their dependency graph.
///
/// # Error Handling
///
/// - **Malformed JSON**: Skips the line and adds a warning
/// - **Invalid task data**: Skips the task and adds a warning
/// - **Orphaned dependencies**: Skips the edge and adds a warning
/// - **Duplicate dependencies**: Skips the edge and adds a warning
/// - **Circular dependencies**: Skips the edge and adds a warning
///
/// Skipped edges are also removed from the owning task's `depends_on` list,
/// so the loaded store never holds a record without a matching graph edge.
///
/// # Memory Considerations
///
/// The entire file is held in memory during parsing, since the three-pass
/// loading algorithm needs every task before it can rebuild the graph. Expect
/// memory usage around 2-3x the JSONL file size during loading.
///
/// # Returns
///
/// Returns a tuple of `(store, warnings)` where warnings contains all non-fatal
/// problems encountered during loading.
pub async fn load_from_jsonl(
    path: &Path,
    prefix: String,
) -> Result<(Box<dyn TaskStore>, Vec<LoadWarning>)> {
    // First pass: Use truss-jsonl for resilient parsing
    let (parsed_tasks, jsonl_warnings) =
        read_jsonl_resilient::<Task, _>(path)
            .await
            .map_err(|e| match e {
                truss_jsonl::Error::Io(io_err) => Error::Io(io_err),
                truss_jsonl::Error::Json(json_err) => StorageError::Serialization(json_err).into(),
                truss_jsonl::Error::InvalidFormat(msg) => StorageError::InvalidFormat(msg).into(),
            })?;

    let mut warnings = Vec::new();

    // Convert truss_jsonl warnings to LoadWarnings
    for warning in jsonl_warnings {
        match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                warnings.push(LoadWarning::MalformedJson { line_number, error });
            }
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => {
                // Map SkippedLine to MalformedJson since both indicate parsing issues
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: reason,
                });
            }
        }
    }

    // Validate tasks and filter out invalid ones
    // Note: line_number here is the record index (1-based) within successfully parsed records,
    // not the actual file line number if there were malformed/skipped lines.
    let mut tasks = Vec::new();
    for (index, task) in parsed_tasks.into_iter().enumerate() {
        let record_number = index + 1; // 1-based indexing for user-friendly messages
        if let Err(validation_error) = task.validate() {
            warnings.push(LoadWarning::InvalidTaskData {
                task_id: task.id.clone(),
                line_number: record_number,
                error: validation_error,
            });
            continue;
        }
        tasks.push(task);
    }

    // Create the store and import tasks
    let store = Arc::new(Mutex::new(InMemoryStoreInner::new(prefix)));
    let mut inner = store.lock().await;

    // Second pass: Import tasks and create graph nodes
    for task in &tasks {
        let node = inner.graph.add_node(task.id.clone());
        inner.node_map.insert(task.id.clone(), node);
        inner.tasks.insert(task.id.clone(), task.clone());
        inner.id_generator.register_id(task.id.as_str().to_string());
    }

    // Third pass: Reconstruct edges with duplicate and cycle detection
    for task in &tasks {
        for record in &task.depends_on {
            // Check if the dependency target exists
            if !inner.node_map.contains_key(&record.depends_on_id) {
                warnings.push(LoadWarning::OrphanedDependency {
                    from: task.id.clone(),
                    to: record.depends_on_id.clone(),
                });
                prune_record(&mut inner, &task.id, record);
                continue;
            }

            let from_node = inner.node_map[&task.id];
            let to_node = inner.node_map[&record.depends_on_id];

            // Check for a repeated edge over the same pair
            if inner.graph.find_edge(from_node, to_node).is_some() {
                warnings.push(LoadWarning::DuplicateDependency {
                    from: task.id.clone(),
                    to: record.depends_on_id.clone(),
                });
                prune_record(&mut inner, &task.id, record);
                continue;
            }

            // Check for cycles before adding the edge
            if has_cycle_impl(&inner.graph, &inner.node_map, &task.id, &record.depends_on_id)? {
                warnings.push(LoadWarning::CircularDependency {
                    from: task.id.clone(),
                    to: record.depends_on_id.clone(),
                });
                prune_record(&mut inner, &task.id, record);
                continue;
            }

            // Safe to add the edge
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

    // Release lock before returning
    drop(inner);

    Ok((Box::new(store), warnings))
}

/// Drop a skipped record from the stored task so the depends_on mirror
/// matches the graph.
fn prune_record(
    inner: &mut InMemoryStoreInner,
    task_id: &TaskId,
    record: &crate::domain::DependencyRecord,
) {
    if let Some(task) = inner.tasks.get_mut(task_id) {
        task.depends_on.retain(|r| r.edge_id != record.edge_id);
    }
}

/// Save a store to a JSONL file with atomic writes.
///
/// This function writes all tasks to a JSONL file, with each task on its own
/// line, delegating the write-then-rename dance to `truss_jsonl`.
///
/// # Atomicity
///
/// The write goes to a temporary sibling file first and is renamed into place,
/// which is atomic on POSIX systems. If the process crashes or is interrupted,
/// the original file remains unchanged.
pub async fn save_to_jsonl(store: &dyn TaskStore, path: &Path) -> Result<()> {
    let mut tasks = store.export_all().await?;

    // Sort tasks and their dependency records for deterministic serialization.
    // This ensures consistent JSONL output across saves, preventing spurious
    // diffs in version control when tasks are touched in different orders.
    tasks.sort_by(|a, b| a.id.cmp(&b.id));
    for task in &mut tasks {
        task.depends_on.sort();
    }

    write_jsonl_atomic_iter(path, tasks.iter())
        .await
        .map_err(|e| match e {
            truss_jsonl::Error::Io(io_err) => Error::Io(io_err),
            truss_jsonl::Error::Json(json_err) => StorageError::Serialization(json_err).into(),
            truss_jsonl::Error::InvalidFormat(msg) => StorageError::InvalidFormat(msg).into(),
        })?;

    Ok(())
}
