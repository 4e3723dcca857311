//! Domain types for task dependency tracking.
//!
//! This module contains the core domain types for the truss task tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum allowed title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier for a user (task owner or acting user)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Represents a task in the tracking system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// User who owns the task
    pub owner: UserId,

    /// Current status
    pub status: TaskStatus,

    /// Dependencies on other tasks
    #[serde(default)]
    pub depends_on: Vec<DependencyRecord>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Validate task data against domain rules.
    ///
    /// Returns a human-readable message describing the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Task ID cannot be empty".to_string());
        }
        validate_title(&self.title)?;
        validate_owner(&self.owner)?;
        Ok(())
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started
    Pending,

    /// Task is currently being worked on
    #[serde(rename = "in_progress")]
    InProgress,

    /// Task has been completed
    Completed,

    /// Task was abandoned without completion
    Cancelled,
}

impl TaskStatus {
    /// Whether the task still needs work (not completed or cancelled)
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    /// Whether a dependency in this status satisfies edges pointing at it.
    ///
    /// Only completed tasks satisfy their dependents; cancelled tasks do not.
    pub fn satisfies_dependency(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Kind of dependency relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// Hard blocker - the dependency must complete before work starts
    Blocking,

    /// Soft link - context only, never gates start
    Informational,
}

impl DependencyKind {
    /// Whether edges of this kind gate the dependent task's start
    pub fn is_blocking(&self) -> bool {
        matches!(self, DependencyKind::Blocking)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyKind::Blocking => "blocking",
            DependencyKind::Informational => "informational",
        };
        write!(f, "{}", s)
    }
}

/// Dependency edge as stored on its owning task.
///
/// The flattened form that lives inside a task's `depends_on` list. The
/// owning side is implicit; [`DependencyEdge`] is the standalone form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Identifier of the edge
    pub edge_id: EdgeId,

    /// ID of the task this task depends on
    pub depends_on_id: TaskId,

    /// Kind of dependency
    pub kind: DependencyKind,

    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl DependencyRecord {
    /// Rebuild the standalone edge given the owning task's ID
    pub fn to_edge(&self, task_id: &TaskId) -> DependencyEdge {
        DependencyEdge {
            id: self.edge_id.clone(),
            task_id: task_id.clone(),
            depends_on_id: self.depends_on_id.clone(),
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

/// A dependency edge between two tasks.
///
/// The edge points from the dependent task to the task it depends on:
/// `task_id` cannot start (for blocking edges) until `depends_on_id`
/// is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Identifier of the edge
    pub id: EdgeId,

    /// The dependent task (the one that waits)
    pub task_id: TaskId,

    /// The task being depended on
    pub depends_on_id: TaskId,

    /// Kind of dependency
    pub kind: DependencyKind,

    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// The per-task record form stored on the owning task
    pub fn to_record(&self) -> DependencyRecord {
        DependencyRecord {
            edge_id: self.id.clone(),
            depends_on_id: self.depends_on_id.clone(),
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

/// Data for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Task title
    pub title: String,

    /// User who will own the task
    pub owner: UserId,
}

impl NewTask {
    /// Validate the creation data against domain rules
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_owner(&self.owner)?;
        Ok(())
    }
}

/// Filter for querying tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by status
    pub status: Option<TaskStatus>,

    /// Filter by owner
    pub owner: Option<UserId>,

    /// Limit number of results
    pub limit: Option<usize>,
}

/// Result of checking whether a task is ready to start
#[derive(Debug, Clone, Serialize)]
pub struct StartCheck {
    /// The task that was checked
    pub task_id: TaskId,

    /// True when every blocking dependency is completed
    pub can_start: bool,

    /// Blocking dependencies that are not yet completed
    pub unsatisfied: Vec<UnsatisfiedDependency>,
}

/// A blocking dependency that is not yet completed
#[derive(Debug, Clone, Serialize)]
pub struct UnsatisfiedDependency {
    /// The unsatisfied edge
    pub edge: DependencyEdge,

    /// Current status of the dependency task
    pub dependency_status: TaskStatus,
}

/// Aggregate dependency counts across a user's tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DependencyStats {
    /// Total dependency edges originating from the user's tasks
    pub total: usize,

    /// Edges with blocking kind
    pub blocking: usize,

    /// Edges whose dependency task is completed
    pub satisfied: usize,

    /// Edges whose dependency task is not completed
    pub unsatisfied: usize,
}

fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH,
            trimmed.len()
        ));
    }
    Ok(())
}

fn validate_owner(owner: &UserId) -> Result<(), String> {
    if owner.as_str().trim().is_empty() {
        return Err("Owner cannot be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(id: &str) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new(id),
            title: "Sample task".to_string(),
            owner: UserId::new("alice"),
            status: TaskStatus::Pending,
            depends_on: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_task_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_dependency_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&DependencyKind::Blocking).unwrap(),
            "\"blocking\""
        );
        assert_eq!(
            serde_json::to_string(&DependencyKind::Informational).unwrap(),
            "\"informational\""
        );
    }

    #[test]
    fn test_status_display_matches_serde_name() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            let serialized = serde_json::to_string(&status).unwrap();
            assert_eq!(serialized, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_only_completed_satisfies_dependency() {
        assert!(TaskStatus::Completed.satisfies_dependency());
        assert!(!TaskStatus::Pending.satisfies_dependency());
        assert!(!TaskStatus::InProgress.satisfies_dependency());
        assert!(!TaskStatus::Cancelled.satisfies_dependency());
    }

    #[test]
    fn test_is_open_excludes_terminal_statuses() {
        assert!(TaskStatus::Pending.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Completed.is_open());
        assert!(!TaskStatus::Cancelled.is_open());
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let mut task = sample_task("task-abc1");
        task.title = "   ".to_string();
        let err = task.validate().unwrap_err();
        assert!(err.contains("Title cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_overlong_title() {
        let mut task = sample_task("task-abc1");
        task.title = "A".repeat(MAX_TITLE_LENGTH + 1);
        let err = task.validate().unwrap_err();
        assert!(err.contains("cannot exceed 200"));
    }

    #[test]
    fn test_validate_accepts_max_length_title() {
        let mut task = sample_task("task-abc1");
        task.title = "A".repeat(MAX_TITLE_LENGTH);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_owner() {
        let mut task = sample_task("task-abc1");
        task.owner = UserId::new("");
        let err = task.validate().unwrap_err();
        assert!(err.contains("Owner cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let task = sample_task("  ");
        let err = task.validate().unwrap_err();
        assert!(err.contains("Task ID cannot be empty"));
    }

    #[test]
    fn test_new_task_validate_rejects_empty_title() {
        let new_task = NewTask {
            title: String::new(),
            owner: UserId::new("alice"),
        };
        assert!(new_task.validate().is_err());
    }

    #[test]
    fn test_record_edge_round_trip() {
        let now = Utc::now();
        let edge = DependencyEdge {
            id: EdgeId::new("task-e1a2b"),
            task_id: TaskId::new("task-abc1"),
            depends_on_id: TaskId::new("task-def2"),
            kind: DependencyKind::Blocking,
            created_at: now,
        };

        let record = edge.to_record();
        assert_eq!(record.edge_id, edge.id);
        assert_eq!(record.depends_on_id, edge.depends_on_id);

        let rebuilt = record.to_edge(&edge.task_id);
        assert_eq!(rebuilt, edge);
    }

    #[test]
    fn test_records_sort_deterministically() {
        let now = Utc::now();
        let make = |edge_id: &str, dep: &str| DependencyRecord {
            edge_id: EdgeId::new(edge_id),
            depends_on_id: TaskId::new(dep),
            kind: DependencyKind::Blocking,
            created_at: now,
        };

        let mut a = vec![
            make("task-e3", "task-c"),
            make("task-e1", "task-a"),
            make("task-e2", "task-b"),
        ];
        let mut b = vec![
            make("task-e2", "task-b"),
            make("task-e3", "task-c"),
            make("task-e1", "task-a"),
        ];

        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(a[0].edge_id, EdgeId::new("task-e1"));
    }

    #[test]
    fn test_task_serde_round_trip_preserves_dependencies() {
        let now = Utc::now();
        let mut task = sample_task("task-abc1");
        task.depends_on.push(DependencyRecord {
            edge_id: EdgeId::new("task-e9f2a"),
            depends_on_id: TaskId::new("task-def2"),
            kind: DependencyKind::Informational,
            created_at: now,
        });

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, task.id);
        assert_eq!(parsed.depends_on.len(), 1);
        assert_eq!(parsed.depends_on[0].kind, DependencyKind::Informational);
    }

    #[test]
    fn test_task_deserializes_without_depends_on_field() {
        let json = r#"{
            "id": "task-abc1",
            "title": "No deps field",
            "owner": "alice",
            "status": "pending",
            "created_at": "2025-01-15T10:30:00Z",
            "updated_at": "2025-01-15T10:30:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.depends_on.is_empty());
    }
}
