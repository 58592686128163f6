use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CounselError, Result};

/// Top-level configuration for the Counsel application.
///
/// Loaded from `~/.counsel/config.toml` by default. Each section
/// corresponds to one concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounselConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl CounselConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CounselConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if
    /// the file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CounselError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.counsel/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote assistant backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the assistant service.
    pub base_url: String,
    /// Chat endpoint path relative to the base URL.
    pub chat_endpoint: String,
    /// Voice transcription endpoint path relative to the base URL.
    pub stt_endpoint: String,
    /// Request timeout in seconds. Kept short: a slow backend degrades
    /// to the local fallback rather than blocking the interface.
    pub timeout_secs: u64,
    /// Language hint sent with every chat request.
    pub language: String,
    /// Display tag for conversations created against this backend.
    pub model_label: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            chat_endpoint: "/api/chat".to_string(),
            stt_endpoint: "/stt".to_string(),
            timeout_secs: 10,
            language: "english".to_string(),
            model_label: "JustlyAI".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
