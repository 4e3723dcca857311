//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that manages storage lifecycle
//! and provides a context for executing CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use truss::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     // Execute commands using app...
//!     Ok(())
//! }
//! ```

use crate::auth::Actor;
use crate::commands::init::{find_truss_root, TrussConfig, CONFIG_FILE_NAME, TRUSS_DIR_NAME};
use crate::error::{ConfigError, Result};
use crate::manager::DependencyManager;
use crate::storage::create_storage;
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
///
/// Manages storage initialization and lifecycle, and owns the
/// [`DependencyManager`] that commands execute against. Storage is
/// automatically loaded from the truss directory on creation.
pub struct App {
    /// Manager over the configured storage backend
    manager: DependencyManager,

    /// Path to the truss directory (.truss)
    truss_dir: PathBuf,

    /// Task ID prefix from configuration
    prefix: String,

    /// Actor mutations are attributed to when the CLI gives none
    default_actor: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("truss_dir", &self.truss_dir)
            .field("prefix", &self.prefix)
            .field("default_actor", &self.default_actor)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.truss/` directory,
    /// loads configuration, and initializes storage.
    ///
    /// # Arguments
    ///
    /// * `working_dir` - The directory to start searching from
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No truss workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Storage initialization fails
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        // Find truss root directory
        let root_dir = find_truss_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let truss_dir = root_dir.join(TRUSS_DIR_NAME);
        let config_path = truss_dir.join(CONFIG_FILE_NAME);

        // Load configuration
        let config = TrussConfig::load(&config_path).await?;

        // Create storage based on configuration
        let backend = config.storage.to_backend(&root_dir)?;
        let store = create_storage(backend, config.task_prefix.clone()).await?;

        Ok(Self {
            manager: DependencyManager::new(store),
            truss_dir,
            prefix: config.task_prefix,
            default_actor: config.default_actor,
        })
    }

    /// Get a mutable reference to the manager.
    pub fn manager_mut(&mut self) -> &mut DependencyManager {
        &mut self.manager
    }

    /// Get an immutable reference to the manager.
    pub fn manager(&self) -> &DependencyManager {
        &self.manager
    }

    /// Get the task ID prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the path to the truss directory.
    pub fn truss_dir(&self) -> &Path {
        &self.truss_dir
    }

    /// Resolve the acting user for a command invocation.
    ///
    /// A `--actor` flag wins over the configured default; `--admin` marks
    /// the actor as an administrator for this invocation.
    pub fn resolve_actor(&self, name: Option<&str>, admin: bool) -> Actor {
        let user = name.unwrap_or(&self.default_actor);
        if admin {
            Actor::admin(user)
        } else {
            Actor::new(user)
        }
    }

    /// Save storage state to persistent storage.
    ///
    /// This should be called after any mutating operations.
    pub async fn save(&self) -> Result<()> {
        self.manager.save().await
    }
}
