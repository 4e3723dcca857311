//! Error types for truss CLI operations.

use std::io;
use thiserror::Error;

use crate::domain::{EdgeId, TaskId, UserId};

/// The error type for truss CLI operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// A task may not depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Adding the edge would make the dependency graph cyclic.
    #[error("Adding dependency {task_id} -> {depends_on_id} would create a cycle")]
    CycleDetected {
        /// The task that would gain the dependency.
        task_id: TaskId,
        /// The task it would depend on.
        depends_on_id: TaskId,
    },

    /// An identical edge between the two tasks already exists.
    #[error("Dependency already exists: {task_id} -> {depends_on_id}")]
    DuplicateDependency {
        /// The dependent task.
        task_id: TaskId,
        /// The task it depends on.
        depends_on_id: TaskId,
    },

    /// The edge does not exist, or does not belong to the named task.
    #[error("Dependency edge {edge_id} not found on task {task_id}")]
    EdgeNotFound {
        /// The edge that was requested.
        edge_id: EdgeId,
        /// The task the edge was expected to belong to.
        task_id: TaskId,
    },

    /// The actor is not allowed to perform the action on the resource.
    #[error("Access denied: {actor} may not {action} {resource}")]
    AccessDenied {
        /// Who attempted the action.
        actor: UserId,
        /// What they attempted (e.g. "edit dependencies on").
        action: String,
        /// The resource they attempted it on (e.g. "task demo-ab12").
        resource: String,
    },

    /// The task cannot be deleted while other tasks depend on it.
    #[error("Cannot delete {task_id}: {dependent_count} task(s) depend on it")]
    HasDependents {
        /// The task that was to be deleted.
        task_id: TaskId,
        /// How many tasks depend on it.
        dependent_count: usize,
        /// The ids of the dependent tasks.
        dependents: Vec<TaskId>,
    },
}

/// Errors raised while locating or reading repository configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.truss` directory was found in this directory or any parent.
    #[error("Not a truss repository (or any parent directory). Run 'truss init' to create one")]
    NotInitialized,

    /// The configuration file exists but could not be parsed.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Errors raised by storage backends while persisting or loading data.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A record could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data file is structurally invalid.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err.to_string())
    }
}

/// A specialized Result type for truss operations.
pub type Result<T> = std::result::Result<T, Error>;
