//! Dependency tree rendering for `truss dep tree` output.

use std::io::{self, Write};

use colored::Colorize;

use super::color::{bold, colored_status_icon, colorize_id};
use super::{OutputConfig, OutputMode};
use crate::domain::DependencyEdge;

/// A node in a dependency tree for rendering purposes.
#[derive(Debug, Clone)]
pub struct DepTreeNode {
    /// Task ID of this node.
    pub id: String,
    /// Dependency kind relating this node to its parent (if any).
    pub kind: Option<crate::domain::DependencyKind>,
    /// Task status (for status icon rendering).
    pub status: Option<crate::domain::TaskStatus>,
    /// Task title (optional, for the root node).
    pub title: Option<String>,
    /// Children of this node in the dependency tree.
    pub children: Vec<DepTreeNode>,
}

/// Print a dependency tree with ASCII/Unicode connectors.
///
/// Renders a tree like:
/// ```text
/// ◆ task-abc Ship the release
/// ├── task-def (blocking)
/// │   └── task-ghi (blocking)
/// └── task-jkl (informational)
/// ```
pub fn print_dep_tree(root: &DepTreeNode, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_dep_tree_text(&mut handle, root, &config),
        OutputMode::Json => {
            let json = dep_tree_to_json(root);
            let output = serde_json::to_string_pretty(&json).map_err(io::Error::other)?;
            writeln!(handle, "{}", output)
        }
    }
}

/// Render the dependency tree with ASCII art connectors.
fn print_dep_tree_text<W: Write>(
    w: &mut W,
    root: &DepTreeNode,
    config: &OutputConfig,
) -> io::Result<()> {
    // Print root node
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon_str = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };

    let id_str = colorize_id(&root.id, config);
    let title_str = root
        .title
        .as_deref()
        .map(|t| format!(" {}", t))
        .unwrap_or_default();

    writeln!(w, "{} {}{}", root_icon_str, id_str, title_str)?;

    // Print children recursively
    print_dep_tree_children(w, &root.children, &[], config)
}

/// Recursively render tree children with proper connector lines.
///
/// `prefix_segments` tracks which ancestor levels still have siblings below,
/// used to draw the vertical continuation lines (`│`).
fn print_dep_tree_children<W: Write>(
    w: &mut W,
    children: &[DepTreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;

        // Build prefix from ancestor continuation lines
        let mut prefix = String::new();
        for &has_more in prefix_segments {
            let segment = if has_more { pipe } else { space };
            if config.use_colors {
                prefix.push_str(&segment.dimmed().to_string());
            } else {
                prefix.push_str(segment);
            }
        }

        // Add branch or corner connector
        let connector = if is_last { corner } else { branch };
        let connector_str = if config.use_colors {
            connector.dimmed().to_string()
        } else {
            connector.to_string()
        };

        // Format child node
        let id_str = colorize_id(&child.id, config);
        let kind_str = child
            .kind
            .map(|kind| {
                let text = format!("({})", kind);
                if config.use_colors {
                    text.dimmed().to_string()
                } else {
                    text
                }
            })
            .unwrap_or_default();
        let status_str = child
            .status
            .map(|s| format!(" {}", colored_status_icon(s, config)))
            .unwrap_or_default();

        writeln!(
            w,
            "{}{}{} {}{}",
            prefix, connector_str, id_str, kind_str, status_str
        )?;

        // Recurse into children
        if !child.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_dep_tree_children(w, &child.children, &next_segments, config)?;
        }
    }

    Ok(())
}

/// Convert a dependency tree to a JSON value for programmatic output.
fn dep_tree_to_json(node: &DepTreeNode) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "id": node.id,
    });

    if let Some(kind) = node.kind {
        obj["kind"] = serde_json::json!(format!("{}", kind));
    }
    if let Some(title) = &node.title {
        obj["title"] = serde_json::json!(title);
    }
    if let Some(s) = node.status {
        obj["status"] = serde_json::json!(format!("{}", s));
    }
    obj["dependencies"] = serde_json::json!(node
        .children
        .iter()
        .map(dep_tree_to_json)
        .collect::<Vec<_>>());

    obj
}

/// Convert a dependency tree to JSON including dependents for the `dep tree` command.
pub fn dep_tree_to_json_public(
    root: &DepTreeNode,
    dependents: &[DependencyEdge],
) -> serde_json::Value {
    let mut json = dep_tree_to_json(root);
    json["dependents"] = serde_json::json!(dependents
        .iter()
        .map(|edge| {
            serde_json::json!({
                "task_id": edge.task_id.to_string(),
                "kind": format!("{}", edge.kind)
            })
        })
        .collect::<Vec<_>>());
    json
}

/// Print the "depended on by" (reverse dependencies) section for tree output.
pub fn print_dep_tree_dependents<W: Write>(
    w: &mut W,
    dependents: &[DependencyEdge],
    config: &OutputConfig,
) -> io::Result<()> {
    if dependents.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(
        w,
        "{} ({}):",
        bold("Depended on by", config),
        dependents.len()
    )?;

    let corner = if config.use_ascii { "`-- " } else { "└── " };

    for edge in dependents {
        let connector_str = if config.use_colors {
            corner.dimmed().to_string()
        } else {
            corner.to_string()
        };
        let kind_str = format!("({})", edge.kind);
        let kind_display = if config.use_colors {
            kind_str.dimmed().to_string()
        } else {
            kind_str
        };

        writeln!(
            w,
            "  {}{}  {}",
            connector_str,
            colorize_id(edge.task_id.as_str(), config),
            kind_display
        )?;
    }

    Ok(())
}
