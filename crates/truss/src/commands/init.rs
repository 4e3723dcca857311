//! Implementation of the `init` command.
//!
//! This module handles initialization of a new truss workspace, creating
//! the `.truss/` directory structure with configuration and data files.

use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default task prefix if none specified
pub const DEFAULT_PREFIX: &str = "task";

/// Name of the truss directory
pub const TRUSS_DIR_NAME: &str = ".truss";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the tasks data file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the gitignore file within .truss
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the truss root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for truss
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrussConfig {
    /// Task ID prefix (e.g., "task" for "task-abc")
    #[serde(rename = "task-prefix")]
    pub task_prefix: String,

    /// User name mutations are attributed to when no --actor flag is given
    #[serde(rename = "default-actor")]
    pub default_actor: String,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type ("memory" for in-memory with JSONL persistence)
    pub backend: String,

    /// Path to the data file
    pub data_file: String,
}

impl StorageConfig {
    /// Resolve this configuration section to a concrete storage backend.
    ///
    /// Relative data file paths are anchored at `root_dir`, the directory
    /// containing `.truss/`.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StorageBackend> {
        match self.backend.as_str() {
            "memory" => Ok(StorageBackend::Jsonl(root_dir.join(&self.data_file))),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}' (expected 'memory')",
                other
            ))),
        }
    }
}

impl TrussConfig {
    /// Create a new configuration with the given prefix and default actor
    pub fn new(prefix: &str, default_actor: &str) -> Self {
        Self {
            task_prefix: prefix.to_string(),
            default_actor: default_actor.to_string(),
            storage: StorageConfig {
                backend: "memory".to_string(),
                data_file: format!("{}/{}", TRUSS_DIR_NAME, TASKS_FILE_NAME),
            },
        }
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for TrussConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, &fallback_actor())
    }
}

/// Actor name used when the caller didn't supply one: the login user, or
/// "user" when the environment doesn't say.
pub fn fallback_actor() -> String {
    std::env::var("USER")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "user".to_string())
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created truss directory
    pub truss_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created tasks file
    pub tasks_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The prefix used for task IDs
    pub prefix: String,
    /// The default actor recorded in the config
    pub default_actor: String,
}

/// Validate task ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - Alphanumeric only (letters and digits)
/// - No special characters or spaces
///
/// Note: Expects pre-trimmed input. Callers should trim whitespace before calling.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix must be at least {} characters",
            MIN_PREFIX_LENGTH
        )));
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(Error::Config(format!(
            "Prefix cannot exceed {} characters",
            MAX_PREFIX_LENGTH
        )));
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Config(
            "Prefix must contain only alphanumeric characters".to_string(),
        ));
    }

    Ok(())
}

/// Initialize a new truss workspace in the given directory.
///
/// # Arguments
///
/// * `base_dir` - The base directory where `.truss/` will be created
/// * `prefix` - Optional task ID prefix (defaults to "task")
/// * `actor` - Optional default actor (defaults to the login user)
///
/// # Returns
///
/// Returns an `InitResult` containing paths to all created files.
///
/// # Errors
///
/// Returns an error if:
/// - The `.truss/` directory already exists
/// - The prefix or actor is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>, actor: Option<&str>) -> Result<InitResult> {
    // Trim whitespace and use the trimmed versions consistently
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    let actor = actor
        .map(|actor| actor.trim().to_string())
        .unwrap_or_else(fallback_actor);

    // Validate prefix (uses trimmed value)
    validate_prefix(prefix)?;

    if actor.is_empty() {
        return Err(Error::Config("Actor name cannot be empty".to_string()));
    }

    let truss_dir = base_dir.join(TRUSS_DIR_NAME);

    // Check if already initialized
    if truss_dir.exists() {
        return Err(Error::Config(format!(
            "Truss is already initialized in this directory. Found existing '{}'",
            TRUSS_DIR_NAME
        )));
    }

    // Create the .truss directory
    fs::create_dir_all(&truss_dir).await?;

    // Create config.yaml
    let config_file = truss_dir.join(CONFIG_FILE_NAME);
    let config = TrussConfig::new(prefix, &actor);
    config.save(&config_file).await?;

    // Create empty tasks.jsonl
    let tasks_file = truss_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    // Create .gitignore inside .truss
    let gitignore_file = truss_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Truss metadata files that should not be tracked
# The tasks.jsonl file should be tracked for collaboration
";
    fs::write(&gitignore_file, gitignore_content).await?;

    Ok(InitResult {
        truss_dir,
        config_file,
        tasks_file,
        gitignore_file,
        prefix: prefix.to_string(),
        default_actor: actor,
    })
}

/// Check if a directory has been initialized with truss.
///
/// Returns `true` if the `.truss/` directory exists.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRUSS_DIR_NAME).exists()
}

/// Find the truss root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories
/// until a `.truss/` directory is found, the root is reached, or
/// the maximum traversal depth is exceeded.
///
/// # Returns
///
/// Returns `Some(path)` with the directory containing `.truss/`,
/// or `None` if no truss workspace is found within the depth limit.
pub fn find_truss_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRUSS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    // ========== Prefix Validation Tests ==========

    #[rstest]
    #[case::valid_short("ab")]
    #[case::valid_medium("task")]
    #[case::valid_long("backlog")]
    #[case::valid_alphanumeric("test123")]
    #[case::valid_uppercase("TASK")]
    #[case::valid_mixed_case("TaskTest123")]
    #[case::valid_max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn test_validate_prefix_valid(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::too_short_single("a", "at least 2")]
    #[case::too_short_empty("", "at least 2")]
    #[case::too_long("a".repeat(21), "cannot exceed 20")]
    #[case::hyphen("task-test", "alphanumeric")]
    #[case::underscore("task_test", "alphanumeric")]
    #[case::space("task test", "alphanumeric")]
    #[case::dot("task.test", "alphanumeric")]
    fn test_validate_prefix_invalid(#[case] prefix: impl AsRef<str>, #[case] expected_error: &str) {
        let result = validate_prefix(prefix.as_ref());
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string().to_lowercase();
        assert!(
            err_msg.contains(&expected_error.to_lowercase()),
            "Expected error to contain '{}', got: '{}'",
            expected_error,
            err_msg
        );
    }

    #[test]
    fn test_validate_prefix_rejects_whitespace() {
        // validate_prefix expects pre-trimmed input; whitespace is not alphanumeric
        let result = validate_prefix("  ab  ");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .to_lowercase()
            .contains("alphanumeric"));
    }

    // ========== TrussConfig Tests ==========

    #[test]
    fn test_config_new() {
        let config = TrussConfig::new("mytasks", "alice");
        assert_eq!(config.task_prefix, "mytasks");
        assert_eq!(config.default_actor, "alice");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.storage.data_file, ".truss/tasks.jsonl");
    }

    #[test]
    fn test_config_default() {
        let config = TrussConfig::default();
        assert_eq!(config.task_prefix, DEFAULT_PREFIX);
        assert!(!config.default_actor.is_empty());
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let original = TrussConfig::new("test123", "alice");
        original.save(&config_path).await.unwrap();

        let loaded = TrussConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = TrussConfig::new("mytasks", "alice");
        config.save(&config_path).await.unwrap();

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();

        // Verify YAML structure
        assert!(content.contains("task-prefix: mytasks"));
        assert!(content.contains("default-actor: alice"));
        assert!(content.contains("backend: memory"));
        assert!(content.contains("data_file: .truss/tasks.jsonl"));
    }

    #[test]
    fn test_config_to_backend() {
        let config = TrussConfig::new("task", "alice");
        let backend = config.storage.to_backend(Path::new("/repo")).unwrap();
        assert_eq!(
            backend.data_path(),
            Some(Path::new("/repo/.truss/tasks.jsonl"))
        );
    }

    #[test]
    fn test_config_to_backend_unknown() {
        let mut config = TrussConfig::new("task", "alice");
        config.storage.backend = "postgres".to_string();
        assert!(config.storage.to_backend(Path::new("/repo")).is_err());
    }

    // ========== Init Command Tests ==========

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, None).await.unwrap();

        assert!(result.truss_dir.exists());
        assert!(result.config_file.exists());
        assert!(result.tasks_file.exists());
        assert!(result.gitignore_file.exists());
    }

    #[tokio::test]
    async fn test_init_with_custom_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some("mytasks"), None).await.unwrap();

        assert_eq!(result.prefix, "mytasks");

        // Verify config has the correct prefix
        let config = TrussConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.task_prefix, "mytasks");
    }

    #[tokio::test]
    async fn test_init_with_custom_actor() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, Some("alice")).await.unwrap();

        assert_eq!(result.default_actor, "alice");

        let config = TrussConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.default_actor, "alice");
    }

    #[tokio::test]
    async fn test_init_with_default_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, None).await.unwrap();

        assert_eq!(result.prefix, DEFAULT_PREFIX);
        assert!(!result.default_actor.is_empty());
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();

        // First init should succeed
        init(temp_dir.path(), None, None).await.unwrap();

        // Second init should fail
        let result = init(temp_dir.path(), None, None).await;
        assert!(result.is_err());

        let err_msg = result.unwrap_err().to_string().to_lowercase();
        assert!(err_msg.contains("already initialized"));
    }

    #[tokio::test]
    async fn test_init_fails_with_invalid_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some("a"), None).await;
        assert!(result.is_err());

        let err_msg = result.unwrap_err().to_string().to_lowercase();
        assert!(err_msg.contains("at least 2"));
    }

    #[tokio::test]
    async fn test_init_fails_with_blank_actor() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, Some("   ")).await;
        assert!(result.is_err());

        let err_msg = result.unwrap_err().to_string().to_lowercase();
        assert!(err_msg.contains("actor"));
    }

    #[tokio::test]
    async fn test_init_creates_empty_tasks_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, None).await.unwrap();

        let content = tokio::fs::read_to_string(&result.tasks_file).await.unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_init_creates_gitignore() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None, None).await.unwrap();

        let content = tokio::fs::read_to_string(&result.gitignore_file)
            .await
            .unwrap();
        assert!(content.contains("Truss"));
    }

    // ========== Utility Function Tests ==========

    #[test]
    fn test_is_initialized_true() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(TRUSS_DIR_NAME)).unwrap();

        assert!(is_initialized(temp_dir.path()));
    }

    #[test]
    fn test_is_initialized_false() {
        let temp_dir = TempDir::new().unwrap();

        assert!(!is_initialized(temp_dir.path()));
    }

    #[test]
    fn test_find_truss_root_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(TRUSS_DIR_NAME)).unwrap();

        let found = find_truss_root(temp_dir.path());
        assert_eq!(found, Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_truss_root_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();

        // Create .truss in root
        std::fs::create_dir(temp_dir.path().join(TRUSS_DIR_NAME)).unwrap();

        // Create a subdirectory
        let sub_dir = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let found = find_truss_root(&sub_dir);
        assert_eq!(found, Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_truss_root_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let found = find_truss_root(temp_dir.path());
        assert!(found.is_none());
    }
}
