//! Integration tests for the `init` command.
//!
//! These tests verify the end-to-end behavior of the init command,
//! including the CLI interface and file system operations.

use tempfile::TempDir;

mod common;
use common::run_truss_in_dir;

// ============================================================================
// Init Command Integration Tests
// ============================================================================

#[test]
fn test_init_creates_truss_directory() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);

    assert!(output.status.success(), "Init command should succeed");

    // Verify .truss directory was created
    let truss_dir = temp_dir.path().join(".truss");
    assert!(truss_dir.exists(), ".truss directory should exist");
    assert!(truss_dir.is_dir(), ".truss should be a directory");
}

#[test]
fn test_init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    // Verify config.yaml exists and has expected content
    let config_path = temp_dir.path().join(".truss/config.yaml");
    assert!(config_path.exists(), "config.yaml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("task-prefix:"),
        "Config should contain task-prefix"
    );
    assert!(
        content.contains("default-actor:"),
        "Config should contain default-actor"
    );
    assert!(
        content.contains("backend: memory"),
        "Config should specify memory backend"
    );
    assert!(
        content.contains("data_file:"),
        "Config should specify data_file"
    );
}

#[test]
fn test_init_creates_tasks_file() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    // Verify tasks.jsonl exists and is empty
    let tasks_path = temp_dir.path().join(".truss/tasks.jsonl");
    assert!(tasks_path.exists(), "tasks.jsonl should exist");

    let content = std::fs::read_to_string(&tasks_path).unwrap();
    assert!(content.is_empty(), "tasks.jsonl should be empty initially");
}

#[test]
fn test_init_creates_gitignore() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    // Verify .gitignore exists
    let gitignore_path = temp_dir.path().join(".truss/.gitignore");
    assert!(gitignore_path.exists(), ".gitignore should exist");
}

#[test]
fn test_init_with_custom_prefix() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", "myproj", "--quiet"]);
    assert!(output.status.success());

    // Verify config has the custom prefix
    let config_path = temp_dir.path().join(".truss/config.yaml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("task-prefix: myproj"),
        "Config should contain custom prefix 'myproj'"
    );
}

#[test]
fn test_init_with_default_prefix() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    // Verify config has the default prefix
    let config_path = temp_dir.path().join(".truss/config.yaml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("task-prefix: task"),
        "Config should contain default prefix 'task'"
    );
}

#[test]
fn test_init_with_custom_actor() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--actor", "alice", "--quiet"]);
    assert!(output.status.success());

    // Verify config records the default actor
    let config_path = temp_dir.path().join(".truss/config.yaml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("default-actor: alice"),
        "Config should record default actor 'alice'"
    );
}

#[test]
fn test_init_fails_if_already_initialized() {
    let temp_dir = TempDir::new().unwrap();

    // First init should succeed
    let output1 = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output1.status.success(), "First init should succeed");

    // Second init should fail
    let output2 = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(
        !output2.status.success(),
        "Second init should fail because already initialized"
    );

    let stderr = String::from_utf8_lossy(&output2.stderr);
    assert!(
        stderr.to_lowercase().contains("already initialized")
            || stderr.to_lowercase().contains("already")
            || stderr.to_lowercase().contains("exists"),
        "Error message should indicate already initialized. Got: {}",
        stderr
    );
}

#[test]
fn test_init_fails_with_invalid_prefix_too_short() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", "a"]);

    assert!(
        !output.status.success(),
        "Init should fail with prefix too short"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.to_lowercase().contains("at least 2")
            || stderr.to_lowercase().contains("characters"),
        "Error should mention minimum characters. Got: {}",
        stderr
    );
}

#[test]
fn test_init_fails_with_invalid_prefix_special_chars() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", "task-test"]);

    assert!(
        !output.status.success(),
        "Init should fail with hyphen in prefix"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.to_lowercase().contains("alphanumeric") || stderr.to_lowercase().contains("invalid"),
        "Error should mention alphanumeric requirement. Got: {}",
        stderr
    );
}

#[test]
fn test_init_output_without_quiet_flag() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);

    // Should show initialization message
    assert!(
        stdout.contains("Initializing") || stdout.contains("truss"),
        "Should show initialization message. Got: {}",
        stdout
    );

    // Should show the created directory
    assert!(
        stdout.contains(".truss") || stdout.contains("Initialized"),
        "Should mention .truss directory. Got: {}",
        stdout
    );
}

#[test]
fn test_init_quiet_flag_suppresses_output() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "-q"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);

    // With quiet flag, stdout should be empty
    assert!(
        stdout.is_empty(),
        "Quiet mode should suppress output. Got: {}",
        stdout
    );

    // But the directory should still be created
    assert!(temp_dir.path().join(".truss").exists());
}

#[test]
fn test_init_with_long_quiet_flag() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--quiet"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.is_empty(), "Long quiet flag should also work");
}

#[test]
fn test_init_complete_directory_structure() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", "test", "--quiet"]);
    assert!(output.status.success());

    let truss_dir = temp_dir.path().join(".truss");

    // Verify complete structure
    assert!(truss_dir.exists(), ".truss/ should exist");
    assert!(
        truss_dir.join("config.yaml").exists(),
        "config.yaml should exist"
    );
    assert!(
        truss_dir.join("tasks.jsonl").exists(),
        "tasks.jsonl should exist"
    );
    assert!(
        truss_dir.join(".gitignore").exists(),
        ".gitignore should exist"
    );

    // Verify no extra files were created (no database files)
    let entries: Vec<_> = std::fs::read_dir(&truss_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();

    assert_eq!(
        entries.len(),
        3,
        "Should have exactly 3 files: config.yaml, tasks.jsonl, .gitignore. Found: {:?}",
        entries.iter().map(|e| e.file_name()).collect::<Vec<_>>()
    );
}

#[test]
fn test_init_prefix_validation_boundary_2_chars() {
    let temp_dir = TempDir::new().unwrap();

    // Exactly 2 characters should work
    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", "ab", "--quiet"]);
    assert!(output.status.success(), "2-char prefix should be valid");

    let config_path = temp_dir.path().join(".truss/config.yaml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("task-prefix: ab"));
}

#[test]
fn test_init_prefix_validation_boundary_20_chars() {
    let temp_dir = TempDir::new().unwrap();

    // Exactly 20 characters should work
    let prefix = "a1b2c3d4e5f6g7h8i9j0"; // 20 chars
    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", prefix, "--quiet"]);
    assert!(output.status.success(), "20-char prefix should be valid");

    let config_path = temp_dir.path().join(".truss/config.yaml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains(&format!("task-prefix: {}", prefix)));
}

#[test]
fn test_init_prefix_validation_over_20_chars() {
    let temp_dir = TempDir::new().unwrap();

    // 21 characters should be rejected
    let prefix = "a1b2c3d4e5f6g7h8i9j0x"; // 21 chars
    let output = run_truss_in_dir(temp_dir.path(), &["init", "--prefix", prefix]);
    assert!(!output.status.success(), "21-char prefix should be rejected");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.to_lowercase().contains("cannot exceed 20"),
        "Error should mention the 20 character limit. Got: {}",
        stderr
    );
}
