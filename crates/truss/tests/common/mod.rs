//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the workspace root directory
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // Go up from crates/truss to workspace root
    manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Helper that builds the binary once and runs it directly
pub fn get_truss_binary() -> PathBuf {
    let workspace = workspace_root();

    // Build the binary first (this should be quick if already built)
    let status = Command::new("cargo")
        .args(["build", "--package", "truss", "--quiet"])
        .current_dir(&workspace)
        .status()
        .expect("Failed to build truss");

    assert!(status.success(), "Failed to build truss binary");

    workspace.join("target/debug/truss")
}

/// Run the truss binary directly in the specified directory
pub fn run_truss_in_dir(dir: &Path, args: &[&str]) -> Output {
    let binary = get_truss_binary();

    Command::new(&binary)
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute truss binary")
}

/// Create a task in an initialized directory and return its ID
pub fn create_task(dir: &Path, title: &str) -> String {
    let output = run_truss_in_dir(dir, &["task", "add", title]);
    assert!(
        output.status.success(),
        "Failed to create task '{}': {}",
        title,
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Created task: "))
        .expect("task add output should contain 'Created task: <id>'")
        .trim()
        .to_string()
}

/// Add a blocking dependency edge and return its edge ID
pub fn add_dependency(dir: &Path, task_id: &str, depends_on: &str) -> String {
    let output = run_truss_in_dir(dir, &["dep", "add", task_id, depends_on]);
    assert!(
        output.status.success(),
        "Failed to add dependency {} -> {}: {}",
        task_id,
        depends_on,
        String::from_utf8_lossy(&output.stderr)
    );

    // The edge ID is printed in trailing brackets:
    //   Added dependency: task-a --[blocking]--> task-b  [task-e1f2a]
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|line| line.starts_with("Added dependency:"))
        .expect("dep add output should contain 'Added dependency:'");
    let start = line.rfind('[').expect("edge ID brackets missing");
    let end = line.rfind(']').expect("edge ID brackets missing");
    line[start + 1..end].to_string()
}
