//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::MAX_TITLE_LENGTH;

/// Validate task ID prefix format.
///
/// Delegates to the domain validator in `commands::init` to maintain
/// a single source of truth for validation rules.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate task ID format.
///
/// Expected format: `prefix-suffix` where:
/// - prefix: 2-20 alphanumeric characters
/// - suffix: 1+ alphanumeric characters
///
/// Edge IDs share this shape (the suffix carries an `e` marker), so the
/// same validator covers both: `task-a3f8`, `proj-9k2x`, `task-e9f2a`.
pub fn validate_task_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Task ID cannot be empty".to_string());
    }

    // Check for the prefix-suffix format (must have at least one hyphen)
    let parts: Vec<&str> = s.splitn(2, '-').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid task ID format: '{}'. Expected format: prefix-suffix (e.g., task-a3f8 or task-e9f2a)",
            s
        ));
    }

    let prefix = parts[0];
    let suffix = parts[1];

    // Validate prefix using shared validation logic
    validate_prefix(prefix).map_err(|e| format!("Task ID {}", e.to_lowercase()))?;

    if suffix.is_empty() {
        return Err("Task ID suffix cannot be empty".to_string());
    }

    // Suffix can contain alphanumerics and hyphens
    if !suffix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err("Task ID suffix must contain only alphanumerics and hyphens".to_string());
    }

    // Prevent edge cases: leading/trailing hyphens or consecutive hyphens
    // Equivalent to regex: ^[a-zA-Z0-9]+(-[a-zA-Z0-9]+)*$
    if suffix.starts_with('-') {
        return Err("Task ID suffix cannot start with a hyphen".to_string());
    }

    if suffix.ends_with('-') {
        return Err("Task ID suffix cannot end with a hyphen".to_string());
    }

    if suffix.contains("--") {
        return Err("Task ID suffix cannot contain consecutive hyphens".to_string());
    }

    Ok(s.to_string())
}

/// Validate title length.
///
/// Title must not exceed MAX_TITLE_LENGTH (200 characters).
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH,
            s.len()
        ));
    }

    // Check for newlines in title (titles should be single-line)
    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    // Check for control characters (0x00-0x1F except tab, and 0x7F-0x9F)
    // These can cause display issues and are likely user errors
    if let Some(pos) = s.chars().position(|c| {
        let code = c as u32;
        // Control characters excluding tab (0x09)
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Title contains invalid control character at position {}",
            pos
        ));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Prefix Validation ==========

    #[test]
    fn test_validate_prefix_valid() {
        assert!(validate_prefix("task").is_ok());
        assert!(validate_prefix("truss").is_ok());
        assert!(validate_prefix("AB").is_ok());
        assert!(validate_prefix("proj123").is_ok());
        assert!(validate_prefix("a1b2c3d4e5f6g7h8i9j0").is_ok()); // 20 chars
    }

    #[test]
    fn test_validate_prefix_too_short() {
        let result = validate_prefix("a");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least 2 characters"));
    }

    #[test]
    fn test_validate_prefix_too_long() {
        let result = validate_prefix("a".repeat(21).as_str());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot exceed 20"));
    }

    #[test]
    fn test_validate_prefix_invalid_chars() {
        assert!(validate_prefix("task-x").is_err()); // hyphen
        assert!(validate_prefix("task_x").is_err()); // underscore
        assert!(validate_prefix("task x").is_err()); // space
        assert!(validate_prefix("task.x").is_err()); // dot
    }

    #[test]
    fn test_validate_prefix_trims_whitespace() {
        assert_eq!(validate_prefix("  task  ").unwrap(), "task");
    }

    // ========== Task ID Validation ==========

    #[test]
    fn test_validate_task_id_valid() {
        assert!(validate_task_id("task-a3f8").is_ok());
        assert!(validate_task_id("proj-123").is_ok());
        assert!(validate_task_id("ab-1").is_ok());
        assert!(validate_task_id("TEST-xyz").is_ok());
    }

    #[test]
    fn test_validate_task_id_accepts_edge_ids() {
        assert!(validate_task_id("task-e9f2a").is_ok());
        assert_eq!(validate_task_id("task-e9f2a").unwrap(), "task-e9f2a");
    }

    #[test]
    fn test_validate_task_id_empty() {
        let result = validate_task_id("");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_task_id_no_hyphen() {
        let result = validate_task_id("taska3f8");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Expected format"));
    }

    #[test]
    fn test_validate_task_id_empty_suffix() {
        let result = validate_task_id("task-");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("suffix cannot be empty"));
    }

    #[test]
    fn test_validate_task_id_prefix_too_short() {
        let result = validate_task_id("a-123");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_lowercase()
            .contains("at least 2 characters"));
    }

    #[test]
    fn test_validate_task_id_invalid_chars() {
        assert!(validate_task_id("task-a3_f8").is_err()); // underscore in suffix
        assert!(validate_task_id("ta_sk-a3f8").is_err()); // underscore in prefix
    }

    #[test]
    fn test_validate_task_id_multiple_hyphens() {
        assert!(validate_task_id("task-a3f8-x").is_ok());
        assert!(validate_task_id("proj-a-b-c-d").is_ok());
        assert_eq!(validate_task_id("task-a3f8-x").unwrap(), "task-a3f8-x");
    }

    #[test]
    fn test_validate_task_id_prefix_exactly_20_chars() {
        let prefix_20 = "a".repeat(20);
        let task_id = format!("{}-xyz", prefix_20);
        assert!(validate_task_id(&task_id).is_ok());
    }

    #[test]
    fn test_validate_task_id_prefix_21_chars() {
        let prefix_21 = "a".repeat(21);
        let task_id = format!("{}-xyz", prefix_21);
        let result = validate_task_id(&task_id);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_lowercase()
            .contains("cannot exceed 20"));
    }

    #[test]
    fn test_validate_task_id_leading_hyphen_suffix() {
        // `task--a3f8` has a leading hyphen in the suffix (after the first hyphen)
        let result = validate_task_id("task--a3f8");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot start with a hyphen"));
    }

    #[test]
    fn test_validate_task_id_trailing_hyphen_suffix() {
        let result = validate_task_id("task-a3f8-");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot end with a hyphen"));
    }

    #[test]
    fn test_validate_task_id_consecutive_hyphens() {
        let result = validate_task_id("task-a--b");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains("cannot contain consecutive hyphens"));
    }

    #[test]
    fn test_validate_task_id_trims_whitespace() {
        assert_eq!(validate_task_id("  task-a3f8  ").unwrap(), "task-a3f8");
    }

    // ========== Title Validation ==========

    #[test]
    fn test_validate_title_valid() {
        assert!(validate_title("Short title").is_ok());
        assert!(validate_title("A".repeat(200).as_str()).is_ok()); // Exactly 200 chars
    }

    #[test]
    fn test_validate_title_empty() {
        let result = validate_title("");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_title_too_long() {
        let long_title = "A".repeat(201);
        let result = validate_title(&long_title);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot exceed 200"));
    }

    #[test]
    fn test_validate_title_exactly_max_length() {
        let max_title = "A".repeat(200);
        assert!(validate_title(&max_title).is_ok());
        assert_eq!(validate_title(&max_title).unwrap().len(), 200);
    }

    #[test]
    fn test_validate_title_trims_whitespace() {
        assert_eq!(validate_title("  Test Title  ").unwrap(), "Test Title");
    }

    #[test]
    fn test_validate_title_whitespace_only() {
        let result = validate_title("   ");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_title_with_newline() {
        let result = validate_title("Title with\nnewline");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("newline"));
    }

    #[test]
    fn test_validate_title_with_carriage_return() {
        let result = validate_title("Title with\rcarriage return");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("newline"));
    }

    #[test]
    fn test_validate_title_with_control_character() {
        // Test with null character (0x00)
        let result = validate_title("Title with\x00control");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("control character"));
    }

    #[test]
    fn test_validate_title_with_tab_allowed() {
        // Tab (0x09) should be allowed
        let result = validate_title("Title with\ttab");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Title with\ttab");
    }

    #[test]
    fn test_validate_title_with_delete_character() {
        // DEL character (0x7F)
        let result = validate_title("Title with\x7Fdelete");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("control character"));
    }
}
