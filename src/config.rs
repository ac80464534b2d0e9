use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use log::info;

use crate::errors::{Error, Result};
use crate::API_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agent API token. The value "TESTING_TOKEN" switches the client into
    /// deterministic test mode.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum milliseconds between real dispatches
    #[serde(default = "default_min_spacing_ms")]
    pub min_spacing_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempt budget per logical request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff step in milliseconds, scaled by attempt number
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Durable page cache location
    #[serde(default = "default_cache_path")]
    pub path: String,
    /// Page cache entry lifetime in minutes
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
    /// In-process fuel-station cache lifetime in minutes
    #[serde(default = "default_station_ttl_minutes")]
    pub station_ttl_minutes: u64,
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_min_spacing_ms() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    5
}

fn default_jitter_ms() -> u64 {
    200
}

fn default_cache_path() -> String {
    "page_cache.json".to_string()
}

fn default_ttl_minutes() -> i64 {
    15
}

fn default_station_ttl_minutes() -> u64 {
    15
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { min_spacing_ms: default_min_spacing_ms() }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_minutes: default_ttl_minutes(),
            station_ttl_minutes: default_station_ttl_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_base_url(),
            gate: GateConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    pub fn with_token(token: &str) -> Self {
        Self { token: token.to_string(), ..Self::default() }
    }

    /// Load configuration from file, creating a default one if it doesn't
    /// exist yet.
    pub fn load_or_create(config_path: &str) -> Result<Self> {
        if Path::new(config_path).exists() {
            info!("loading configuration from {config_path}");
            let config_str = fs::read_to_string(config_path)?;
            let config: Config =
                toml::from_str(&config_str).map_err(|e| Error::Config(e.to_string()))?;
            Ok(config)
        } else {
            info!("creating default configuration at {config_path}");
            let config = Config::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> Result<()> {
        if let Some(parent) = Path::new(config_path).parent() {
            fs::create_dir_all(parent)?;
        }
        let config_str =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::Config("token must be set".to_string()));
        }
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url must be set".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be greater than 0".to_string()));
        }
        if self.cache.ttl_minutes < 0 {
            return Err(Error::Config("ttl_minutes must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TESTING_TOKEN;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.gate.min_spacing_ms, 500);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.jitter_ms, 200);
        assert_eq!(config.cache.ttl_minutes, 15);
        assert_eq!(config.base_url, API_BASE_URL);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("token = \"TESTING_TOKEN\"").unwrap();
        assert_eq!(config.token, TESTING_TOKEN);
        assert_eq!(config.gate.min_spacing_ms, 500);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn validate_rejects_empty_token() {
        let config = Config::default();
        assert!(config.validate().is_err());
        assert!(Config::with_token(TESTING_TOKEN).validate().is_ok());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::with_token("abc");
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.token, "abc");
        assert_eq!(back.retry.jitter_ms, config.retry.jitter_ms);
    }

    #[test]
    fn load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();
        let created = Config::load_or_create(path_str).unwrap();
        assert!(path.exists());
        assert!(created.token.is_empty());
        let loaded = Config::load_or_create(path_str).unwrap();
        assert_eq!(loaded.gate.min_spacing_ms, created.gate.min_spacing_ms);
    }
}
