//! Bearer token persistence
//!
//! Handles saving and loading the auth token to/from a small JSON file, the
//! client-side equivalent of browser local storage under a fixed key. A
//! missing file simply means "no token".

use crate::error::TokenStoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Serializable structure for the token file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFileData {
    /// Version of the file format (for future migration support)
    version: u32,
    /// The bearer token
    token: String,
}

/// Persisted bearer token storage
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a token store backed by the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the stored token, if any
    pub fn load(&self) -> Result<Option<String>, TokenStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let data: TokenFileData = serde_json::from_str(&json)?;
        Ok(Some(data.token))
    }

    /// Save a token, replacing any existing one
    pub fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = TokenFileData {
            version: 1,
            token: token.to_string(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Clear the stored token
    ///
    /// Removing an already-absent token is not an error.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
