//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing
//! and their conversions to/from domain types.

use clap::ValueEnum;

use crate::domain::{DependencyKind, TaskStatus};

// ============================================================================
// Value Enums
// ============================================================================

/// Task status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusArg {
    /// Not started yet
    Pending,
    /// Currently being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Finished
    Completed,
    /// Abandoned without completing
    Cancelled,
}

impl std::fmt::Display for TaskStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Dependency kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyKindArg {
    /// Hard blocker - gates starting the dependent task
    #[default]
    Blocking,
    /// Soft link - never gates anything
    Informational,
}

impl std::fmt::Display for DependencyKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking => write!(f, "blocking"),
            Self::Informational => write!(f, "informational"),
        }
    }
}

// ============================================================================
// Domain Type Conversions
// ============================================================================

impl From<TaskStatusArg> for TaskStatus {
    fn from(arg: TaskStatusArg) -> Self {
        match arg {
            TaskStatusArg::Pending => TaskStatus::Pending,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Completed => TaskStatus::Completed,
            TaskStatusArg::Cancelled => TaskStatus::Cancelled,
        }
    }
}

impl From<TaskStatus> for TaskStatusArg {
    fn from(s: TaskStatus) -> Self {
        match s {
            TaskStatus::Pending => TaskStatusArg::Pending,
            TaskStatus::InProgress => TaskStatusArg::InProgress,
            TaskStatus::Completed => TaskStatusArg::Completed,
            TaskStatus::Cancelled => TaskStatusArg::Cancelled,
        }
    }
}

impl From<DependencyKindArg> for DependencyKind {
    fn from(arg: DependencyKindArg) -> Self {
        match arg {
            DependencyKindArg::Blocking => DependencyKind::Blocking,
            DependencyKindArg::Informational => DependencyKind::Informational,
        }
    }
}

impl From<DependencyKind> for DependencyKindArg {
    fn from(k: DependencyKind) -> Self {
        match k {
            DependencyKind::Blocking => DependencyKindArg::Blocking,
            DependencyKind::Informational => DependencyKindArg::Informational,
        }
    }
}
