use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MemoraError, Result};

/// Model identifier sent with every embedding request unless overridden.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Top-level configuration for Memora.
///
/// Loaded from `~/.memora/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoraConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl MemoraConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MemoraConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
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
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject settings that would make the embedding or search path unusable.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.model.trim().is_empty() {
            return Err(MemoraError::Config(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.embedding.provider == EmbeddingProvider::Http {
            if self.embedding.base_url.trim().is_empty() {
                return Err(MemoraError::Config(
                    "embedding.base_url must not be empty".to_string(),
                ));
            }
            if self.embedding.timeout_secs == 0 {
                return Err(MemoraError::Config(
                    "embedding.timeout_secs must be greater than zero".to_string(),
                ));
            }
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(MemoraError::Config(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which embedding backend to wire up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Remote HTTP embedding endpoint.
    #[default]
    Http,
    /// Deterministic hash-based vectors, no network.
    Mock,
}

/// Embedding service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Base URL of the embedding service, without trailing path.
    pub base_url: String,
    /// Relative path the request is posted to.
    pub path: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Http,
            base_url: "http://localhost:8080".to_string(),
            path: "/embeddings".to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of results.
    pub default_limit: usize,
    /// Maximum number of results.
    pub max_limit: usize,
}

impl SearchConfig {
    /// Cap a caller-supplied limit to `max_limit`.
    pub fn clamp_limit(&self, requested: usize) -> usize {
        requested.min(self.max_limit)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 100,
        }
    }
}
