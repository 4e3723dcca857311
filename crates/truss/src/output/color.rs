//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (completed status, satisfied dependencies)
//!   - Warning/Active: yellow (in_progress, dependent arrows)
//!   - Error/Blocked: red     (unsatisfied dependencies, errors)
//!   - Info/Reference: cyan   (task IDs, root tree node)
//!   - Muted:         dimmed  (field labels, connectors, cancelled status)
//!   - Emphasis:      bold    (section headers)
//!   - Default:       white   (pending status)

use crate::domain::TaskStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = format!("{status}");
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::Pending => text.white().to_string(),
        TaskStatus::InProgress => text.yellow().to_string(),
        TaskStatus::Completed => text.green().to_string(),
        TaskStatus::Cancelled => text.dimmed().to_string(),
    }
}

/// Colorize a task or edge ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: TaskStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            TaskStatus::Pending => "o",
            TaskStatus::InProgress => ">",
            TaskStatus::Completed => "+",
            TaskStatus::Cancelled => "x",
        }
    } else {
        match status {
            TaskStatus::Pending => "○",
            TaskStatus::InProgress => "▶",
            TaskStatus::Completed => "✓",
            TaskStatus::Cancelled => "✗",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        TaskStatus::Pending => icon.white().to_string(),
        TaskStatus::InProgress => icon.yellow().to_string(),
        TaskStatus::Completed => icon.green().to_string(),
        TaskStatus::Cancelled => icon.dimmed().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply cyan color to text (for arrows/connectors).
pub(crate) fn cyan(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply yellow color to text (for arrows/connectors).
pub(crate) fn yellow(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}
