//! Configuration for the pickem ETL.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::geocode::client::DEFAULT_BASE_URL;
use crate::geocode::GeocodeOverride;
use crate::output::OutputFormat;
use crate::retry::RetryConfig;
use crate::scraper::RateLimiter;

/// Source site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Politeness delay between page requests
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: f64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_delay_secs() -> f64 {
    1.0
}

fn default_max_delay_secs() -> f64 {
    2.0
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn limiter(&self) -> RateLimiter {
        RateLimiter::new(self.min_delay_secs, self.max_delay_secs)
    }
}

/// Geocoding API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_geocode_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Retries after an HTTP 429
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// The free tier allows one request per second
    #[serde(default = "default_geocode_delay_secs")]
    pub min_delay_secs: f64,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<GeocodeOverride>,
}

fn default_geocode_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_geocode_delay_secs() -> f64 {
    1.0
}

fn default_overrides() -> Vec<GeocodeOverride> {
    vec![
        GeocodeOverride {
            matches: "USAF Academy".to_string(),
            query: "Falcon Stadium".to_string(),
        },
        GeocodeOverride {
            matches: "West Point".to_string(),
            query: "Michie Stadium".to_string(),
        },
    ]
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
            api_key: String::new(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            min_delay_secs: default_geocode_delay_secs(),
            overrides: default_overrides(),
        }
    }
}

impl GeocodeConfig {
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::geocode(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn limiter(&self) -> RateLimiter {
        RateLimiter::new(self.min_delay_secs, self.min_delay_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    /// SQLite database to upsert into, if any
    #[serde(default)]
    pub database: Option<String>,
}

fn default_output_dir() -> String {
    "data/output".to_string()
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Csv]
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            formats: default_formats(),
            database: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub geocode: GeocodeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("pickem").required(false))
            // Override with environment variables (PICKEM_GEOCODE__API_KEY, etc.)
            .add_source(
                config::Environment::with_prefix("PICKEM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
