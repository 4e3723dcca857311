//! Hash-based ID generation system for truss.
//!
//! This module creates collision-resistant task and edge IDs using SHA256
//! hashing and base36 encoding.
//!
//! # Features
//!
//! - **Adaptive length**: Task ID length grows with database size (4-6 characters)
//! - **Collision resistant**: Uses SHA256 hashing with nonce retry
//! - **Edge IDs**: Dependency edges share the task prefix with an `e` marker
//! - **Format**: `{prefix}-{hash}` for tasks (e.g., "task-a3f8"),
//!   `{prefix}-e{hash}` for edges (e.g., "task-e9f2a")
//!
//! # Example
//!
//! ```
//! use truss::id_generation::{IdGenerator, IdGeneratorConfig};
//!
//! let config = IdGeneratorConfig {
//!     prefix: "task".to_string(),
//!     database_size: 100,
//! };
//!
//! let mut generator = IdGenerator::new(config);
//!
//! let id = generator.generate("Ship the release", "alice").unwrap();
//!
//! println!("Generated ID: {}", id); // e.g., "task-a3f8"
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Hash length for edge IDs. Edges are far less numerous per database than
/// tasks can be, so a fixed length is enough.
const EDGE_HASH_LENGTH: usize = 5;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },

    /// Base36 encoding failed
    #[error("Base36 encoding failed: {0}")]
    EncodingFailed(String),

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "task")
    pub prefix: String,

    /// Current size of the database (affects adaptive length)
    pub database_size: usize,
}

/// Hash-based ID generator with collision detection
///
/// # Memory Growth Pattern
///
/// The generator tracks every ID it has seen in `existing_ids` to prevent
/// collisions, so memory grows with each generated or registered ID.
///
/// ## Lifecycle Recommendations
///
/// - **Short-lived usage**: Create a new generator per operation/request, load existing IDs once
/// - **Long-lived usage**: Periodically recreate the generator to manage memory growth
/// - **Memory concerns**: Consider clearing state after batch operations using `clear_state()`
///
/// For most use cases (databases with <10,000 tasks), memory overhead is negligible (~1KB per 1000 IDs).
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// Database size the generator was configured with
    pub fn database_size(&self) -> usize {
        self.config.database_size
    }

    /// Clear internal state to manage memory growth
    ///
    /// This method clears the collision tracking set. Use this after batch
    /// operations or when recreating the generator with a fresh set of
    /// existing IDs.
    pub fn clear_state(&mut self) {
        self.existing_ids.clear();
    }

    /// Generate a new unique task ID
    ///
    /// # Arguments
    ///
    /// * `title` - Task title
    /// * `owner` - Owning user
    ///
    /// # Errors
    ///
    /// Returns an error if unable to generate a unique ID after trying all nonces.
    pub fn generate(&mut self, title: &str, owner: &str) -> Result<String, IdGenerationError> {
        let id_length = self.adaptive_length();

        // Try generating with different nonces
        for nonce in 0..MAX_NONCE {
            let id = self.generate_hash_id(title, owner, nonce, id_length)?;

            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(
                        nonce,
                        id_length, "Generated unique ID after {} collision retries", nonce
                    );
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        // If all nonces collide, try with increased length
        if id_length < 6 {
            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length to {}",
                id_length + 1
            );
            let longer_id = self.generate_hash_id(title, owner, 0, id_length + 1)?;
            self.existing_ids.insert(longer_id.clone());
            return Ok(longer_id);
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    /// Generate a new unique edge ID for a dependency between two tasks
    ///
    /// # Errors
    ///
    /// Returns an error if unable to generate a unique ID after trying all nonces.
    pub fn generate_edge_id(
        &mut self,
        task_id: &str,
        depends_on_id: &str,
    ) -> Result<String, IdGenerationError> {
        for nonce in 0..MAX_NONCE {
            let id = self.generate_edge_hash_id(task_id, depends_on_id, nonce)?;

            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(
                        nonce,
                        "Generated unique edge ID after {} collision retries", nonce
                    );
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    /// Generate a hash-based task ID with the given parameters
    fn generate_hash_id(
        &self,
        title: &str,
        owner: &str,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        // Combine inputs for hashing
        let timestamp = Utc::now().timestamp();
        let content = format!("{}|{}|{}|{}", title, owner, timestamp, nonce);

        // SHA256 hash
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        // Base36 encode to desired length
        let hash_str = encode_base36(&hash_bytes[..8], length)?;

        // Format: {prefix}-{hash}
        Ok(format!("{}-{}", self.config.prefix, hash_str))
    }

    /// Generate a hash-based edge ID for the given endpoint pair
    fn generate_edge_hash_id(
        &self,
        task_id: &str,
        depends_on_id: &str,
        nonce: u32,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp();
        let content = format!("{}|{}|{}|{}", task_id, depends_on_id, timestamp, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], EDGE_HASH_LENGTH)?;

        // Format: {prefix}-e{hash}
        Ok(format!("{}-e{}", self.config.prefix, hash_str))
    }

    /// Determine ID length based on database size
    ///
    /// - 0-500 tasks: 4 chars
    /// - 500-1,500: 5 chars
    /// - 1,500+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.config.database_size {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Encode bytes as base36 string
///
/// # Bounds Checking
///
/// This function uses wrapping arithmetic (`wrapping_shl`, `wrapping_add`) to handle
/// the conversion of bytes to a u64. The input is limited to the first 8 bytes of the
/// SHA256 hash to fit within u64 bounds. Wrapping behavior is intentional and safe here:
/// - We only process 8 bytes maximum (enforced by caller passing `&hash_bytes[..8]`)
/// - Wrapping creates a deterministic output even if overflow occurs
/// - The base36 encoding step normalizes the output to the requested length
///
/// # Errors
///
/// Returns an error if length is 0 or if UTF-8 conversion fails.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    // Convert bytes to a large number (limited to 8 bytes by caller)
    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    // Convert to base36
    let mut result = Vec::new();
    let mut n = num;

    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(BASE36_CHARS[remainder]);
        n /= 36;
    }

    result.reverse();

    String::from_utf8(result)
        .map_err(|e| IdGenerationError::EncodingFailed(format!("UTF-8 conversion failed: {}", e)))
}

/// Validate task ID format
///
/// Valid format: `{prefix}-{hash}` (e.g., "task-a3f8") where the hash is
/// 4-6 alphanumeric characters.
pub fn validate_id(id: &str, prefix: &str) -> bool {
    // Check if it starts with prefix and hyphen
    if !id.starts_with(&format!("{}-", prefix)) {
        return false;
    }

    let hash = &id[prefix.len() + 1..];

    if hash.len() < 4 || hash.len() > 6 {
        return false;
    }

    hash.chars().all(|c| c.is_ascii_alphanumeric())
}
