use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the gateway configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Pipeline tuning (thresholds, timeouts, breaker, cache, concurrency)
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Engines in routing priority order (first is tried first)
    #[serde(default)]
    pub engines: Vec<EngineConfig>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Configuration for one remote engine.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Stable engine identifier, unique across the list
    pub id: String,

    /// Endpoint base URL (".../v1" style)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; may be empty for local servers
    #[serde(default = "String::new")]
    pub api_key: String,
}

/// Pipeline tuning knobs with per-field defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Minimum target-script share for a purity pass, in percent
    #[serde(default = "default_purity_target_threshold_pct")]
    pub purity_target_threshold_pct: f64,

    /// Maximum foreign-script share for a purity pass, in percent
    #[serde(default = "default_purity_foreign_threshold_pct")]
    pub purity_foreign_threshold_pct: f64,

    /// Minimum composite quality score for acceptance
    #[serde(default = "default_acceptance_score_threshold")]
    pub acceptance_score_threshold: f64,

    /// Per-engine dispatch timeout in milliseconds
    #[serde(default = "default_engine_timeout_ms")]
    pub engine_timeout_ms: u64,

    /// Consecutive failures before an engine's breaker opens
    #[serde(default = "default_max_consecutive_failures_before_open")]
    pub max_consecutive_failures_before_open: u32,

    /// Cooldown before an open breaker admits a half-open probe
    #[serde(default = "default_circuit_half_open_after_ms")]
    pub circuit_half_open_after_ms: u64,

    /// Result cache time-to-live in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Result cache capacity; 0 disables caching
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Maximum simultaneous in-flight engine calls across all requests
    #[serde(default = "default_global_concurrency_limit")]
    pub global_concurrency_limit: usize,

    /// Maximum requests queued beyond the concurrency limit before
    /// rejection with CapacityExceeded
    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: usize,

    /// Minimum meaningful characters a cleaned source must have to be
    /// worth dispatching
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,
}

fn default_purity_target_threshold_pct() -> f64 {
    95.0
}

fn default_purity_foreign_threshold_pct() -> f64 {
    5.0
}

fn default_acceptance_score_threshold() -> f64 {
    70.0
}

fn default_engine_timeout_ms() -> u64 {
    10_000
}

fn default_max_consecutive_failures_before_open() -> u32 {
    3
}

fn default_circuit_half_open_after_ms() -> u64 {
    60_000
}

fn default_cache_ttl_ms() -> u64 {
    300_000
}

fn default_cache_max_entries() -> usize {
    1024
}

fn default_global_concurrency_limit() -> usize {
    8
}

fn default_max_queue_depth() -> usize {
    64
}

fn default_min_input_chars() -> usize {
    2
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            purity_target_threshold_pct: default_purity_target_threshold_pct(),
            purity_foreign_threshold_pct: default_purity_foreign_threshold_pct(),
            acceptance_score_threshold: default_acceptance_score_threshold(),
            engine_timeout_ms: default_engine_timeout_ms(),
            max_consecutive_failures_before_open: default_max_consecutive_failures_before_open(),
            circuit_half_open_after_ms: default_circuit_half_open_after_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_max_entries: default_cache_max_entries(),
            global_concurrency_limit: default_global_concurrency_limit(),
            max_queue_depth: default_max_queue_depth(),
            min_input_chars: default_min_input_chars(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map to the log crate's level filter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            engines: vec![EngineConfig {
                id: "local".to_string(),
                endpoint: "http://localhost:1234/v1".to_string(),
                model: "local-model".to_string(),
                api_key: String::new(),
            }],
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.engines.is_empty() {
            return Err(anyhow!("At least one engine must be configured"));
        }

        let mut seen = HashSet::new();
        for engine in &self.engines {
            if engine.id.trim().is_empty() {
                return Err(anyhow!("Engine id must not be empty"));
            }
            if !seen.insert(engine.id.as_str()) {
                return Err(anyhow!("Duplicate engine id: {}", engine.id));
            }
            Url::parse(&engine.endpoint)
                .with_context(|| format!("Invalid endpoint for engine {}", engine.id))?;
        }

        let p = &self.pipeline;
        if !(0.0..=100.0).contains(&p.purity_target_threshold_pct)
            || !(0.0..=100.0).contains(&p.purity_foreign_threshold_pct)
            || !(0.0..=100.0).contains(&p.acceptance_score_threshold)
        {
            return Err(anyhow!("Thresholds must be percentages in [0, 100]"));
        }
        if p.global_concurrency_limit == 0 {
            return Err(anyhow!("global_concurrency_limit must be at least 1"));
        }
        if p.engine_timeout_ms == 0 {
            return Err(anyhow!("engine_timeout_ms must be positive"));
        }

        Ok(())
    }
}
