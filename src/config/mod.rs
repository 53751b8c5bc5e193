//! Configuration management for Docket
//!
//! All ranking weights, timeouts, and heuristic constants live here so that
//! weight tuning never requires a code change. Validation runs once at load
//! time; a request never sees an invalid configuration.

use crate::error::{DocketError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta", default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub citation: CitationConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
            created_at: current_timestamp(),
            last_modified: current_timestamp(),
        }
    }
}

/// Fusion retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// RRF dampening constant (typically 60)
    pub rrf_k: f64,
    /// Weight applied to lexical backend ranks
    pub lexical_weight: f64,
    /// Weight applied to vector backend ranks
    pub vector_weight: f64,
    /// Number of fused results returned to the caller
    pub top_k: usize,
    /// Over-fetch multiplier: each backend is asked for top_k * candidate_multiplier
    pub candidate_multiplier: usize,
    /// Shared timeout budget for both backend calls, in milliseconds
    pub backend_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: 60.0,
            lexical_weight: 1.0,
            vector_weight: 1.0,
            top_k: 10,
            candidate_multiplier: 3,
            backend_timeout_ms: 2000,
        }
    }
}

/// Entity resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum confidence for a candidate to be used as a document filter
    pub confidence_floor: f32,
    /// Confidence added when a candidate's text mentions a corporate office.
    /// Tunable heuristic, not calibrated.
    pub location_boost: f32,
    /// Window of indexed document text scanned for office phrases, in chars
    pub location_scan_chars: usize,
    /// Maximum number of candidates given the location scan
    pub location_candidate_cap: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.3,
            location_boost: 0.15,
            location_scan_chars: 4000,
            location_candidate_cap: 5,
        }
    }
}

/// Citation assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationConfig {
    /// Hard cap on excerpt length, in chars
    pub max_excerpt_chars: usize,
    /// How far before the cap to look for a sentence boundary
    pub boundary_tolerance: usize,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            max_excerpt_chars: 500,
            boundary_tolerance: 80,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DocketError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DocketError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DocketError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Build the default configuration, validated
    pub fn validated_default() -> Result<Self> {
        let config = Self::default();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    /// Environment variables in format: DOCKET_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("DOCKET_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        // Weight tuning is the expected operational override
        match path {
            "RETRIEVAL__RRF_K" => {
                self.retrieval.rrf_k = parse_env(path, value)?;
            }
            "RETRIEVAL__LEXICAL_WEIGHT" => {
                self.retrieval.lexical_weight = parse_env(path, value)?;
            }
            "RETRIEVAL__VECTOR_WEIGHT" => {
                self.retrieval.vector_weight = parse_env(path, value)?;
            }
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k = parse_env(path, value)?;
            }
            "RETRIEVAL__BACKEND_TIMEOUT_MS" => {
                self.retrieval.backend_timeout_ms = parse_env(path, value)?;
            }
            "RESOLVER__CONFIDENCE_FLOOR" => {
                self.resolver.confidence_floor = parse_env(path, value)?;
            }
            "RESOLVER__LOCATION_BOOST" => {
                self.resolver.location_boost = parse_env(path, value)?;
            }
            "CITATION__MAX_EXCERPT_CHARS" => {
                self.citation.max_excerpt_chars = parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig::default(),
            retrieval: RetrievalConfig::default(),
            resolver: ResolverConfig::default(),
            citation: CitationConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| DocketError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}
