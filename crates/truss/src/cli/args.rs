//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};

use super::types::{DependencyKindArg, TaskStatusArg};
use super::validators::{validate_prefix, validate_task_id, validate_title};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Task ID prefix (e.g., "proj" for "proj-a3f8")
    ///
    /// Must be 2-20 alphanumeric characters. This prefix is used for all
    /// task and edge IDs in this repository.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Default actor recorded in the config
    ///
    /// Mutations are attributed to this user when no `--actor` flag is
    /// given. Defaults to $USER.
    #[arg(short, long)]
    pub actor: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `task` command
#[derive(Parser, Debug, Clone)]
pub struct TaskArgs {
    /// Task subcommand
    #[command(subcommand)]
    pub action: TaskAction,
}

/// Task management actions
#[derive(Subcommand, Debug, Clone)]
pub enum TaskAction {
    /// Create a new task owned by the acting user
    Add {
        /// Task title (maximum 200 characters)
        #[arg(value_parser = validate_title)]
        title: String,
    },

    /// List tasks
    List {
        /// Filter by status
        #[arg(short, long, value_enum)]
        status: Option<TaskStatusArg>,

        /// Filter by owner
        #[arg(short, long)]
        owner: Option<String>,

        /// Maximum number of tasks to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },

    /// Show a task with its dependencies and dependents
    Show {
        /// Task ID to display
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Mark a task in progress
    Start {
        /// Task ID to start
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Mark a task completed
    Done {
        /// Task ID to complete
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Mark a task cancelled
    Cancel {
        /// Task ID to cancel
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Put a task back to pending
    Reopen {
        /// Task ID to reopen
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID to delete
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add one or more dependencies to a task
    ///
    /// With several dependency IDs the additions run as a batch: each
    /// candidate is checked independently and a rejected one never rolls
    /// back the rest.
    Add {
        /// Task that depends on the others
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// Tasks being depended on
        #[arg(required = true, num_args = 1.., value_parser = validate_task_id)]
        depends_on: Vec<String>,

        /// Dependency kind
        #[arg(short = 't', long = "kind", value_enum, default_value = "blocking")]
        kind: DependencyKindArg,
    },

    /// Remove one or more dependency edges from a task
    Remove {
        /// Task the edges belong to
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// Edge IDs to remove (shown by `dep list` and `task show`)
        #[arg(required = true, num_args = 1.., value_parser = validate_task_id)]
        edge_ids: Vec<String>,
    },

    /// List the dependency edges of a task
    List {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// List edges pointing at the task instead of away from it
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show the transitive dependency tree of a task
    Tree {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// Maximum depth to traverse (unlimited if omitted)
        #[arg(short, long)]
        depth: Option<usize>,
    },
}

/// Arguments for the `can-start` command
#[derive(Parser, Debug, Clone)]
pub struct CanStartArgs {
    /// Task ID to check
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone, Default)]
pub struct ReadyArgs {
    /// Filter by owner
    #[arg(short, long)]
    pub owner: Option<String>,
}

/// Arguments for the `blocked` command
#[derive(Parser, Debug, Clone, Default)]
pub struct BlockedArgs {
    /// Filter by owner
    #[arg(short, long)]
    pub owner: Option<String>,
}

/// Arguments for the `stats` command
#[derive(Parser, Debug, Clone, Default)]
pub struct StatsArgs {
    /// Owner whose tasks to summarize (defaults to the acting user)
    #[arg(short, long)]
    pub owner: Option<String>,
}
