use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SousConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub embedding: EmbeddingConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// What the pipeline does when the embedding provider fails after retries.
///
/// This is a deployment-wide policy, never decided per call.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingFallback {
    /// Reject the request with `EmbeddingUnavailable`.
    Reject,
    /// Commit with a zero-vector placeholder and tag the record for backfill.
    ZeroVector,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub embedding_fallback: EmbeddingFallback,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    pub batch_group_size: usize,
    pub batch_pacing_ms: u64,
}

impl Default for SousConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            generation: GenerationConfig::default(),
            embedding: EmbeddingConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_souschef_dir()
            .join("recipes.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "fake".into(),
            model: "claude-3-5-sonnet-20241022".into(),
            api_key: String::new(),
            timeout_secs: 60,
            max_tokens: 4096,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fake".into(),
            model: "text-embedding-3-small".into(),
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding_fallback: EmbeddingFallback::Reject,
            max_retries: 3,
            retry_base_ms: 500,
            batch_group_size: 4,
            batch_pacing_ms: 1000,
        }
    }
}

/// Returns `~/.souschef/`
pub fn default_souschef_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".souschef")
}

/// Returns the default config file path: `~/.souschef/config.toml`
pub fn default_config_path() -> PathBuf {
    default_souschef_dir().join("config.toml")
}

impl SousConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SousConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (SOUSCHEF_DB, SOUSCHEF_LOG_LEVEL,
    /// ANTHROPIC_API_KEY, OPENAI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SOUSCHEF_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SOUSCHEF_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("ANTHROPIC_API_KEY") {
            self.generation.api_key = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.embedding.api_key = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
