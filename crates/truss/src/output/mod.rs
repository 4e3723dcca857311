//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`json`]: JSON serialization for programmatic output
//! - [`tree`]: Dependency tree rendering with ASCII/Unicode connectors

pub mod color;
mod json;
pub mod tree;

use crate::domain::{DependencyEdge, DependencyStats, StartCheck, Task};
use crate::manager::{BulkAddResult, BulkRemoveResult};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

// Re-export public items so command code can import everything from `output`
pub use color::{error, info, success, warning};
pub use tree::{dep_tree_to_json_public, print_dep_tree, print_dep_tree_dependents, DepTreeNode};

use color::{bold, colored_status_icon, colorize_id, colorize_status, cyan, dimmed, yellow};
use json::{
    print_blocked_json, print_bulk_add_json, print_bulk_remove_json, print_edges_json,
    print_start_check_json, print_stats_json, print_task_details_json, print_task_json,
    print_tasks_json,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
///
/// This struct holds settings that control how output is formatted,
/// including terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `TRUSS_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `TRUSS_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TRUSS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self {
            max_width: parse_max_width(env::var("TRUSS_MAX_WIDTH").ok()),
            use_ascii: parse_ascii(env::var("TRUSS_ASCII").ok()),
            use_colors: parse_colors(env::var("NO_COLOR").is_ok(), env::var("TRUSS_COLOR").ok()),
        }
    }
}

fn parse_max_width(value: Option<String>) -> usize {
    match value {
        Some(s) if !s.is_empty() => match s.parse() {
            Ok(width) => width,
            Err(_) => {
                tracing::warn!(
                    env_var = "TRUSS_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }
        },
        _ => DEFAULT_MAX_CONTENT_WIDTH,
    }
}

fn parse_ascii(value: Option<String>) -> bool {
    match value {
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
        Some(v) => {
            tracing::warn!(
                env_var = "TRUSS_ASCII",
                value = %v,
                "Invalid value (expected '1', 'true', '0', or 'false'), using default"
            );
            false
        }
        None => false,
    }
}

// Respect the NO_COLOR standard (https://no-color.org/)
// Also support TRUSS_COLOR for explicit control
fn parse_colors(no_color_set: bool, value: Option<String>) -> bool {
    !no_color_set
        && value
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

// ============================================================================
// Terminal Width Detection
// ============================================================================

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a task in the specified format
pub fn print_task(task: &Task, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_task_text(&mut handle, task, &config),
        OutputMode::Json => print_task_json(&mut handle, task),
    }
}

/// Print a list of tasks in the specified format
pub fn print_tasks(tasks: &[Task], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_tasks_text(&mut handle, tasks, &config),
        OutputMode::Json => print_tasks_json(&mut handle, tasks),
    }
}

/// Print a task with full details (for show command)
pub fn print_task_details(
    task: &Task,
    deps: &[DependencyEdge],
    dependents: &[DependencyEdge],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_task_details_text(&mut handle, task, deps, dependents, &config),
        OutputMode::Json => print_task_details_json(&mut handle, task, deps, dependents),
    }
}

/// Print a task's dependency edges (for dep list command)
pub fn print_dependency_list(edges: &[DependencyEdge], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_dependency_list_text(&mut handle, edges, &config),
        OutputMode::Json => print_edges_json(&mut handle, edges),
    }
}

/// Print the edges pointing at a task (for dep list --reverse)
pub fn print_dependent_list(edges: &[DependencyEdge], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_dependent_list_text(&mut handle, edges, &config),
        OutputMode::Json => print_edges_json(&mut handle, edges),
    }
}

/// Print blocked tasks with their blockers
pub fn print_blocked_tasks(blocked: &[(Task, Vec<Task>)], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_blocked_text(&mut handle, blocked, &config),
        OutputMode::Json => print_blocked_json(&mut handle, blocked),
    }
}

/// Print a start-readiness check result
pub fn print_start_check(check: &StartCheck, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_start_check_text(&mut handle, check, &config),
        OutputMode::Json => print_start_check_json(&mut handle, check),
    }
}

/// Print dependency statistics for a user's tasks
pub fn print_stats(owner: &str, stats: &DependencyStats, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_stats_text(&mut handle, owner, stats, &config),
        OutputMode::Json => print_stats_json(&mut handle, owner, stats),
    }
}

/// Print the outcome of a bulk dependency add
pub fn print_bulk_add(result: &BulkAddResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_bulk_add_text(&mut handle, result, &config),
        OutputMode::Json => print_bulk_add_json(&mut handle, result),
    }
}

/// Print the outcome of a bulk dependency removal
pub fn print_bulk_remove(result: &BulkRemoveResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_bulk_remove_text(&mut handle, result, &config),
        OutputMode::Json => print_bulk_remove_json(&mut handle, result),
    }
}

/// Print a dependency tree together with its reverse dependencies
pub fn print_dep_tree_with_dependents(
    root: &DepTreeNode,
    dependents: &[DependencyEdge],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            tree::print_dep_tree(root, mode)?;

            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let config = OutputConfig::from_env();
            tree::print_dep_tree_dependents(&mut handle, dependents, &config)
        }
        OutputMode::Json => print_json(&tree::dep_tree_to_json_public(root, dependents)),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", msg)
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{}", json)
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_task_text<W: Write>(w: &mut W, task: &Task, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {}  {}",
        colored_status_icon(task.status, config),
        colorize_id(task.id.as_str(), config),
        task.title
    )?;

    writeln!(w, "  {} {}", dimmed("Owner:", config), task.owner)?;

    if !task.depends_on.is_empty() {
        writeln!(
            w,
            "  {} {}",
            dimmed("Dependencies:", config),
            task.depends_on.len()
        )?;
    }

    Ok(())
}

fn print_tasks_text<W: Write>(w: &mut W, tasks: &[Task], config: &OutputConfig) -> io::Result<()> {
    if tasks.is_empty() {
        writeln!(w, "No tasks found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} task(s):", tasks.len())?;
    writeln!(w)?;

    for task in tasks {
        writeln!(
            w,
            "{} {}  {}  {}",
            colored_status_icon(task.status, config),
            colorize_id(task.id.as_str(), config),
            task.title,
            dimmed(&format!("@{}", task.owner), config)
        )?;
    }

    Ok(())
}

fn print_task_details_text<W: Write>(
    w: &mut W,
    task: &Task,
    deps: &[DependencyEdge],
    dependents: &[DependencyEdge],
    config: &OutputConfig,
) -> io::Result<()> {
    let terminal_width = get_terminal_width();
    let content_width = terminal_width.min(config.max_width);

    // Header: status icon, ID, and title (wrapped when long)
    let mut title_lines = wrap_text(&task.title, content_width.saturating_sub(2)).into_iter();
    writeln!(
        w,
        "{} {}: {}",
        colored_status_icon(task.status, config),
        colorize_id(task.id.as_str(), config),
        title_lines.next().unwrap_or_default()
    )?;
    for line in title_lines {
        writeln!(w, "  {line}")?;
    }

    // Metadata line
    writeln!(
        w,
        "{}  {}    {}  {}",
        dimmed("Status:", config),
        colorize_status(task.status, config),
        dimmed("Owner:", config),
        task.owner
    )?;

    // Timestamps
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        task.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        task.updated_at.format("%Y-%m-%d %H:%M")
    )?;

    // Dependencies section
    if !deps.is_empty() {
        let arrow = if config.use_ascii { "->" } else { "→" };
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Dependencies", config), deps.len())?;
        for edge in deps {
            writeln!(
                w,
                "  {} {} ({})  {}",
                cyan(arrow, config),
                colorize_id(edge.depends_on_id.as_str(), config),
                edge.kind,
                dimmed(&format!("[{}]", edge.id), config)
            )?;
        }
    }

    // Dependents section
    if !dependents.is_empty() {
        let arrow = if config.use_ascii { "<-" } else { "←" };
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Dependents", config), dependents.len())?;
        for edge in dependents {
            writeln!(
                w,
                "  {} {} ({})  {}",
                yellow(arrow, config),
                colorize_id(edge.task_id.as_str(), config),
                edge.kind,
                dimmed(&format!("[{}]", edge.id), config)
            )?;
        }
    }

    Ok(())
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(|s| s.into_owned())
                    .collect()
            }
        })
        .collect()
}

fn print_dependency_list_text<W: Write>(
    w: &mut W,
    edges: &[DependencyEdge],
    config: &OutputConfig,
) -> io::Result<()> {
    if edges.is_empty() {
        writeln!(w, "No dependencies found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} dependency edge(s):", edges.len())?;
    writeln!(w)?;

    let arrow = if config.use_ascii { "->" } else { "→" };
    for edge in edges {
        writeln!(
            w,
            "{} {} {} ({})",
            dimmed(&format!("[{}]", edge.id), config),
            cyan(arrow, config),
            colorize_id(edge.depends_on_id.as_str(), config),
            edge.kind
        )?;
    }

    Ok(())
}

fn print_dependent_list_text<W: Write>(
    w: &mut W,
    edges: &[DependencyEdge],
    config: &OutputConfig,
) -> io::Result<()> {
    if edges.is_empty() {
        writeln!(w, "No dependents found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} dependent edge(s):", edges.len())?;
    writeln!(w)?;

    let arrow = if config.use_ascii { "<-" } else { "←" };
    for edge in edges {
        writeln!(
            w,
            "{} {} {} ({})",
            dimmed(&format!("[{}]", edge.id), config),
            yellow(arrow, config),
            colorize_id(edge.task_id.as_str(), config),
            edge.kind
        )?;
    }

    Ok(())
}

fn print_blocked_text<W: Write>(
    w: &mut W,
    blocked: &[(Task, Vec<Task>)],
    config: &OutputConfig,
) -> io::Result<()> {
    if blocked.is_empty() {
        writeln!(w, "No blocked tasks found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} blocked task(s):", blocked.len())?;
    writeln!(w)?;

    for (task, blockers) in blocked {
        writeln!(
            w,
            "{} {}  {}",
            colored_status_icon(task.status, config),
            colorize_id(task.id.as_str(), config),
            task.title
        )?;

        let blocked_by: Vec<String> = blockers
            .iter()
            .map(|b| {
                format!(
                    "{} ({})",
                    colorize_id(b.id.as_str(), config),
                    colorize_status(b.status, config)
                )
            })
            .collect();
        writeln!(
            w,
            "  {} {}",
            dimmed("Blocked by:", config),
            blocked_by.join(", ")
        )?;
    }

    Ok(())
}

fn print_start_check_text<W: Write>(
    w: &mut W,
    check: &StartCheck,
    config: &OutputConfig,
) -> io::Result<()> {
    if check.can_start {
        let icon = if config.use_ascii { "+" } else { "✓" };
        writeln!(
            w,
            "{} {} can start: no unsatisfied blocking dependencies",
            success(icon, config),
            colorize_id(check.task_id.as_str(), config)
        )?;
        return Ok(());
    }

    let icon = if config.use_ascii { "x" } else { "✗" };
    writeln!(
        w,
        "{} {} cannot start: {} unsatisfied blocking edge(s)",
        error(icon, config),
        colorize_id(check.task_id.as_str(), config),
        check.unsatisfied.len()
    )?;

    for item in &check.unsatisfied {
        writeln!(
            w,
            "  {} {} ({})  {}",
            error(icon, config),
            colorize_id(item.edge.depends_on_id.as_str(), config),
            colorize_status(item.dependency_status, config),
            dimmed(&format!("[{}]", item.edge.id), config)
        )?;
    }

    Ok(())
}

fn print_stats_text<W: Write>(
    w: &mut W,
    owner: &str,
    stats: &DependencyStats,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{}",
        bold(&format!("Dependency stats for {}:", owner), config)
    )?;
    writeln!(w, "  {} {}", dimmed("Total edges:", config), stats.total)?;
    writeln!(w, "  {} {}", dimmed("Blocking:", config), stats.blocking)?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Satisfied:", config),
        success(&stats.satisfied.to_string(), config)
    )?;

    let unsatisfied = if stats.unsatisfied > 0 {
        error(&stats.unsatisfied.to_string(), config)
    } else {
        stats.unsatisfied.to_string()
    };
    writeln!(w, "  {} {}", dimmed("Unsatisfied:", config), unsatisfied)?;

    Ok(())
}

fn print_bulk_add_text<W: Write>(
    w: &mut W,
    result: &BulkAddResult,
    config: &OutputConfig,
) -> io::Result<()> {
    let arrow = if config.use_ascii { "->" } else { "→" };
    let ok_icon = if config.use_ascii { "+" } else { "✓" };
    let err_icon = if config.use_ascii { "x" } else { "✗" };

    for edge in &result.created {
        writeln!(
            w,
            "{} {} {} {} ({})  {}",
            success(ok_icon, config),
            colorize_id(edge.task_id.as_str(), config),
            cyan(arrow, config),
            colorize_id(edge.depends_on_id.as_str(), config),
            edge.kind,
            dimmed(&format!("[{}]", edge.id), config)
        )?;
    }

    for err in &result.errors {
        writeln!(
            w,
            "{} {}: {}",
            error(err_icon, config),
            err.target,
            err.error
        )?;
    }

    if !result.created.is_empty() || !result.errors.is_empty() {
        writeln!(w)?;
    }
    writeln!(
        w,
        "{} added, {} failed",
        result.created.len(),
        result.errors.len()
    )?;

    Ok(())
}

fn print_bulk_remove_text<W: Write>(
    w: &mut W,
    result: &BulkRemoveResult,
    config: &OutputConfig,
) -> io::Result<()> {
    let arrow = if config.use_ascii { "->" } else { "→" };
    let ok_icon = if config.use_ascii { "+" } else { "✓" };
    let err_icon = if config.use_ascii { "x" } else { "✗" };

    for edge in &result.removed {
        writeln!(
            w,
            "{} {} removed ({} {} {})",
            success(ok_icon, config),
            dimmed(&format!("[{}]", edge.id), config),
            colorize_id(edge.task_id.as_str(), config),
            cyan(arrow, config),
            colorize_id(edge.depends_on_id.as_str(), config)
        )?;
    }

    for err in &result.errors {
        writeln!(
            w,
            "{} {}: {}",
            error(err_icon, config),
            err.target,
            err.error
        )?;
    }

    if !result.removed.is_empty() || !result.errors.is_empty() {
        writeln!(w)?;
    }
    writeln!(
        w,
        "{} removed, {} failed",
        result.removed.len(),
        result.errors.len()
    )?;

    Ok(())
}
