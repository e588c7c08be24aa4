//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the assistant backend, including the `/api` prefix
    pub api_base_url: String,
    /// Per-request timeout for backend calls (in seconds)
    pub request_timeout_secs: u64,
    /// Directory for client-side persisted data (auth token)
    pub data_dir: PathBuf,
    /// Use the deterministic simulated message backend instead of HTTP
    pub simulate: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("JARVIS_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8283/api".to_string()),
            request_timeout_secs: env::var("JARVIS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(10),
            data_dir: env::var_os("JARVIS_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
                // Default to ~/.jarvis-chat or current directory
                if let Some(home) = env::var_os("HOME") {
                    let mut path = PathBuf::from(home);
                    path.push(".jarvis-chat");
                    path
                } else {
                    PathBuf::from(".jarvis-chat")
                }
            }),
            simulate: env::var("JARVIS_SIMULATE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Path of the persisted bearer token file
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("token.json")
    }
}
