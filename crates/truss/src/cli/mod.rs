//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for truss using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new truss repository
//! - `task`: Create, list, show, and update tasks
//! - `dep`: Manage dependencies between tasks
//! - `can-start`: Check whether a task is clear to start
//! - `ready`: Show tasks with no unsatisfied blocking dependencies
//! - `blocked`: Show tasks held up by their dependencies
//! - `stats`: Show dependency statistics for one owner
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--actor`: Act as the given user instead of the configured default
//! - `--admin`: Bypass ownership checks for this invocation
//!
//! # Example
//!
//! ```bash
//! truss task add "Wire up the API"
//! truss dep add task-a3f8 task-9k2x --kind blocking
//! truss can-start task-a3f8
//! truss ready --owner alice
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    BlockedArgs, CanStartArgs, DepAction, DepArgs, InitArgs, ReadyArgs, StatsArgs, TaskAction,
    TaskArgs,
};

// Re-export types
pub use types::{DependencyKindArg, TaskStatusArg};

// Re-export validators for external use
pub use validators::{validate_prefix, validate_task_id, validate_title};

/// Truss - A task dependency tracker
///
/// Track tasks and the dependencies between them using JSONL storage.
/// Tasks are stored in `.truss/tasks.jsonl` for easy version control integration.
#[derive(Parser, Debug)]
#[command(name = "truss")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Act as this user instead of the configured default
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Bypass ownership checks for this invocation
    #[arg(long, global = true)]
    pub admin: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new truss repository
    ///
    /// Creates the `.truss/` directory with configuration and an empty task
    /// database. Run this once in your project root to start tracking tasks.
    Init(InitArgs),

    /// Manage tasks
    ///
    /// Create tasks, list and show them, move them through their lifecycle,
    /// and delete them.
    Task(TaskArgs),

    /// Manage dependencies between tasks
    ///
    /// Add and remove dependency edges, list them, and walk the transitive
    /// dependency tree.
    Dep(DepArgs),

    /// Check whether a task is clear to start
    ///
    /// A task can start when every one of its blocking dependencies is
    /// completed. Lists the unsatisfied edges when it cannot.
    CanStart(CanStartArgs),

    /// Show tasks ready to work on
    ///
    /// Lists open tasks with no unsatisfied blocking dependencies,
    /// optionally limited to one owner.
    Ready(ReadyArgs),

    /// Show blocked tasks
    ///
    /// Lists open tasks that cannot start yet, along with the tasks
    /// holding them up.
    Blocked(BlockedArgs),

    /// Show dependency statistics
    ///
    /// Displays edge counts across one owner's tasks: total, blocking,
    /// satisfied, and unsatisfied.
    Stats(StatsArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Task(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                let actor = app.resolve_actor(self.actor.as_deref(), self.admin);
                execute::execute_task(&mut app, &actor, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                let actor = app.resolve_actor(self.actor.as_deref(), self.admin);
                execute::execute_dep(&mut app, &actor, args, output_mode).await
            }
            Some(Commands::CanStart(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_can_start(&app, args, output_mode).await
            }
            Some(Commands::Ready(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_ready(&app, args, output_mode).await
            }
            Some(Commands::Blocked(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_blocked(&app, args, output_mode).await
            }
            Some(Commands::Stats(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                let actor = app.resolve_actor(self.actor.as_deref(), self.admin);
                execute::execute_stats(&app, &actor, args, output_mode).await
            }
            None => {
                println!("Truss task dependency tracking");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
