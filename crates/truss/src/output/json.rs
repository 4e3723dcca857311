//! JSON formatting for programmatic output.
//!
//! Backs the `--json` flag. Every function takes a writer so tests can
//! capture output without going through stdout.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

use crate::domain::{DependencyEdge, DependencyStats, StartCheck, Task};
use crate::manager::{BatchError, BulkAddResult, BulkRemoveResult};

fn write_pretty<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{}", output)
}

pub fn print_task_json<W: Write>(w: &mut W, task: &Task) -> io::Result<()> {
    write_pretty(w, task)
}

pub fn print_tasks_json<W: Write>(w: &mut W, tasks: &[Task]) -> io::Result<()> {
    write_pretty(w, &tasks)
}

/// Serialize a task together with its resolved dependency and dependent edges.
pub fn print_task_details_json<W: Write>(
    w: &mut W,
    task: &Task,
    deps: &[DependencyEdge],
    dependents: &[DependencyEdge],
) -> io::Result<()> {
    let mut value = serde_json::to_value(task)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    value["dependencies"] = json!(deps);
    value["dependents"] = json!(dependents);
    write_pretty(w, &value)
}

pub fn print_edges_json<W: Write>(w: &mut W, edges: &[DependencyEdge]) -> io::Result<()> {
    write_pretty(w, &edges)
}

pub fn print_blocked_json<W: Write>(
    w: &mut W,
    blocked: &[(Task, Vec<Task>)],
) -> io::Result<()> {
    let entries: Vec<serde_json::Value> = blocked
        .iter()
        .map(|(task, blockers)| json!({ "task": task, "blocked_by": blockers }))
        .collect();
    write_pretty(w, &entries)
}

pub fn print_start_check_json<W: Write>(w: &mut W, check: &StartCheck) -> io::Result<()> {
    write_pretty(w, check)
}

pub fn print_stats_json<W: Write>(
    w: &mut W,
    owner: &str,
    stats: &DependencyStats,
) -> io::Result<()> {
    let mut value = serde_json::to_value(stats)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    value["owner"] = json!(owner);
    write_pretty(w, &value)
}

pub fn print_bulk_add_json<W: Write>(w: &mut W, result: &BulkAddResult) -> io::Result<()> {
    let value = json!({
        "created": result.created,
        "errors": batch_errors_json(&result.errors),
    });
    write_pretty(w, &value)
}

pub fn print_bulk_remove_json<W: Write>(w: &mut W, result: &BulkRemoveResult) -> io::Result<()> {
    let value = json!({
        "removed": result.removed,
        "errors": batch_errors_json(&result.errors),
    });
    write_pretty(w, &value)
}

// Error is not Serialize, so batch errors go out as rendered messages.
fn batch_errors_json(errors: &[BatchError]) -> Vec<serde_json::Value> {
    errors
        .iter()
        .map(|e| json!({ "target": e.target, "error": e.error.to_string() }))
        .collect()
}
