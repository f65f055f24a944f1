//! Configuration management for the River Gauge backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with GAUGE_ prefix

use config::{ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use shared::{validate_site_list, SiteId, DEFAULT_SITES};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// USGS water data API configuration
    pub usgs: UsgsConfig,

    /// Response cache configuration
    pub cache: CacheConfig,

    /// Fan-out configuration
    pub aggregator: AggregatorConfig,

    /// Monitored sites
    pub sites: SitesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsgsConfig {
    /// OGC API base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Freshness window for cached locations and readings
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on concurrent per-site resolutions
    pub max_concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SitesConfig {
    /// USGS site numbers, in display order for the bulk endpoint.
    /// Files give a list; `GAUGE_SITES__IDS` gives a comma-separated string.
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub ids: Vec<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("GAUGE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("usgs.base_url", UsgsConfig::default().base_url)?
            .set_default("usgs.timeout_seconds", 10)?
            .set_default("usgs.user_agent", UsgsConfig::default().user_agent)?
            .set_default("cache.ttl_seconds", 120)?
            .set_default("aggregator.max_concurrency", 12)?
            .set_default("sites.ids", DEFAULT_SITES.to_vec())?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (GAUGE_ prefix)
            .add_source(
                Environment::with_prefix("GAUGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregator.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "aggregator.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.usgs.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "usgs.timeout_seconds must be at least 1".to_string(),
            ));
        }
        self.site_ids()?;
        Ok(())
    }

    /// The validated site list
    pub fn site_ids(&self) -> Result<Vec<SiteId>, ConfigError> {
        validate_site_list(&self.sites.ids).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

/// Site ids must stay strings: "08166200" is not the number 8166200
fn list_or_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(ids) => ids,
        Raw::Joined(joined) => joined
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

impl UsgsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.waterdata.usgs.gov/ogcapi/v0".to_string(),
            timeout_seconds: 10,
            user_agent: "FloodForge/0.1 (+local dev)".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 120 }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 12,
        }
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            ids: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            usgs: UsgsConfig::default(),
            cache: CacheConfig::default(),
            aggregator: AggregatorConfig::default(),
            sites: SitesConfig::default(),
        }
    }
}
