// Configuration loading and parsing (gaffer.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// gaffer.toml structs
// ---------------------------------------------------------------------------

/// The assembled configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub squad: SquadConfig,
}

/// Upstream league API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to. Must end with `/`.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Client-side cap on requests per minute (burst of this size, then one
    /// request every `60s / cap`).
    pub max_requests_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Whole-cache eviction interval.
    pub flush_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

/// Squad rule overrides and look-ahead horizons.
#[derive(Debug, Clone, Deserialize)]
pub struct SquadConfig {
    /// Budget cap in tenths of the main unit.
    pub budget: u32,
    pub max_per_team: u32,
    /// Cost (tenths) a bench goalkeeper/defender must come in under.
    pub low_cost_threshold: u32,
    /// Game-weeks of fixtures considered for full-squad and transfer picks.
    pub squad_horizon: u32,
    /// Game-weeks of fixtures considered for a free-hit squad.
    pub free_hit_horizon: u32,
    /// Default ownership ceiling (percent) for differentials.
    pub differential_max_ownership: f64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

const CONFIG_FILE: &str = "gaffer.toml";

/// Load and validate `config/gaffer.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text, &path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text without touching the filesystem. `origin` is only used
/// for error messages.
pub fn parse_config(text: &str, origin: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: origin.to_path_buf(),
        source: e,
    })
}

/// Seed `config/gaffer.toml` from `defaults/gaffer.toml` when it is missing.
/// Returns the path written, or `None` when the config already existed.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} exists; run from the project root",
                target.display(),
                source.display()
            ),
        });
    }

    let copy_error = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(copy_error)?;
    std::fs::copy(&source, &target).map_err(copy_error)?;
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !config.api.base_url.starts_with("http") {
        return Err(invalid("api.base_url", "must be an http(s) URL"));
    }
    if !config.api.base_url.ends_with('/') {
        return Err(invalid("api.base_url", "must end with `/`"));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0"));
    }
    if config.api.max_requests_per_minute == 0 {
        return Err(invalid("api.max_requests_per_minute", "must be greater than 0"));
    }

    // A bounded retry policy needs at least the initial attempt.
    if config.retry.max_attempts == 0 {
        return Err(invalid("retry.max_attempts", "must be at least 1"));
    }

    let squad = &config.squad;
    let positive_fields: &[(&str, u32)] = &[
        ("squad.budget", squad.budget),
        ("squad.max_per_team", squad.max_per_team),
        ("squad.squad_horizon", squad.squad_horizon),
        ("squad.free_hit_horizon", squad.free_hit_horizon),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    let own = squad.differential_max_ownership;
    if !(0.0..=100.0).contains(&own) {
        return Err(invalid(
            "squad.differential_max_ownership",
            format!("must be between 0.0 and 100.0 inclusive, got {own}"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
