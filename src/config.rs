//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MEMORIA_*` environment variable overrides.

use crate::analysis::{ChainConfig, ClusterConfig, FusionWeights};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for the engine operations
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub fusion: FusionWeights,

    /// Chain candidates requested per link of depth
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    /// Semantic results requested by a combined query
    #[serde(default = "default_semantic_limit")]
    pub semantic_limit: usize,

    /// Records summarized when no limit is given
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

fn default_candidate_multiplier() -> usize {
    5
}

fn default_semantic_limit() -> usize {
    10
}

fn default_summary_limit() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            chain: ChainConfig::default(),
            fusion: FusionWeights::default(),
            candidate_multiplier: default_candidate_multiplier(),
            semantic_limit: default_semantic_limit(),
            summary_limit: default_summary_limit(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON or CSV file loaded into the in-memory store
    pub records_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("memoria").join("config.toml")),
            Some(PathBuf::from("/etc/memoria/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    ///
    /// Values that fail to parse are ignored with a warning.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store overrides
        if let Some(path) = lookup("MEMORIA_RECORDS_PATH") {
            self.store.records_path = Some(path);
        }

        // Engine overrides
        if let Some(size) = parse_override(&lookup, "MEMORIA_CLUSTER_MIN_SIZE") {
            self.engine.cluster.min_size = size;
        }
        if let Some(threshold) = parse_override(&lookup, "MEMORIA_CLUSTER_THRESHOLD") {
            self.engine.cluster.threshold = threshold;
        }
        if let Some(depth) = parse_override(&lookup, "MEMORIA_CHAIN_DEPTH") {
            self.engine.chain.depth = depth;
        }

        // Logging overrides
        if let Some(level) = lookup("MEMORIA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MEMORIA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Memoria Configuration
#
# Environment variables override these settings:
# - MEMORIA_RECORDS_PATH
# - MEMORIA_CLUSTER_MIN_SIZE
# - MEMORIA_CLUSTER_THRESHOLD
# - MEMORIA_CHAIN_DEPTH
# - MEMORIA_LOG_LEVEL
# - MEMORIA_LOG_FORMAT

[engine]
# Chain candidates requested per link of depth
candidate_multiplier = 5

# Semantic results requested by a combined query
semantic_limit = 10

# Records summarized when no limit is given
summary_limit = 5

[engine.cluster]
# Smallest cluster worth returning
min_size = 3

# Minimum similarity to the seed record (0.0 - 1.0)
threshold = 0.7

[engine.chain]
# Maximum links after the seed record
depth = 2

# Minimum similarity for a link (links always need some overlap)
min_similarity = 0.0

[engine.fusion]
# Score contributed by the keyword/metadata query
primary = 0.5

# Score contributed by semantic search
secondary = 0.8

[store]
# JSON array or CSV file of records
# records_path = "~/memories.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
