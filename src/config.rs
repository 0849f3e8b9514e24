use serde::Deserialize;
use std::collections::HashMap;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. The watchlist is kept in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL. Provider responses are not cached when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TMDB API key
    #[serde(default)]
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Per-request timeout for TMDB calls, in seconds
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Primary watch region (ISO 3166-1 code)
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Secondary reference region whose offers are also shown on title details
    #[serde(default = "default_secondary_region")]
    pub secondary_region: String,

    /// Monthly prices as a JSON object keyed by provider id, e.g. `{"8": 169}`
    #[serde(default)]
    pub provider_prices: Option<String>,

    #[serde(default = "default_calendar_days")]
    pub calendar_days: i64,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default = "default_max_combination_size")]
    pub max_combination_size: usize,

    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_limit: usize,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_watch_region() -> String {
    "EG".to_string()
}

fn default_secondary_region() -> String {
    "DE".to_string()
}

fn default_calendar_days() -> i64 {
    150
}

fn default_fetch_concurrency() -> usize {
    5
}

fn default_max_combination_size() -> usize {
    5
}

fn default_exhaustive_limit() -> usize {
    20
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Builds the immutable settings injected into the aggregators and optimizer
    pub fn streaming(&self) -> anyhow::Result<StreamingConfig> {
        let provider_prices = match &self.provider_prices {
            Some(raw) => serde_json::from_str::<HashMap<i64, f64>>(raw)
                .map_err(|e| anyhow::anyhow!("Invalid PROVIDER_PRICES: {}", e))?,
            None => default_provider_prices(),
        };

        Ok(StreamingConfig {
            watch_region: self.watch_region.clone(),
            secondary_region: self.secondary_region.clone(),
            provider_prices,
            calendar_days: self.calendar_days,
            fetch_concurrency: self.fetch_concurrency.max(1),
            max_combination_size: self.max_combination_size,
            exhaustive_limit: self.exhaustive_limit,
        })
    }
}

/// Approximate monthly prices (EGP) for the providers commonly seen in the default region
pub fn default_provider_prices() -> HashMap<i64, f64> {
    HashMap::from([
        (8, 169.0),   // Netflix
        (119, 45.0),  // Amazon Prime Video
        (337, 100.0), // Disney Plus
        (350, 30.0),  // Apple TV Plus
        (283, 30.0),  // Crunchyroll
        (531, 50.0),  // Paramount Plus
    ])
}

/// Static settings shared by the provider aggregator, optimizer and calendar
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingConfig {
    pub watch_region: String,
    pub secondary_region: String,
    /// provider id → monthly price; providers missing here have no configured price
    pub provider_prices: HashMap<i64, f64>,
    pub calendar_days: i64,
    pub fetch_concurrency: usize,
    pub max_combination_size: usize,
    /// Catalogue size above which combinations are solved as an integer program
    pub exhaustive_limit: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            watch_region: default_watch_region(),
            secondary_region: default_secondary_region(),
            provider_prices: default_provider_prices(),
            calendar_days: default_calendar_days(),
            fetch_concurrency: default_fetch_concurrency(),
            max_combination_size: default_max_combination_size(),
            exhaustive_limit: default_exhaustive_limit(),
        }
    }
}

impl StreamingConfig {
    /// Configured monthly price for a provider, if any
    pub fn price_for(&self, provider_id: i64) -> Option<f64> {
        self.provider_prices.get(&provider_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            database_url: None,
            redis_url: None,
            tmdb_api_key: String::new(),
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_timeout_secs: default_tmdb_timeout_secs(),
            host: default_host(),
            port: default_port(),
            watch_region: "DE".to_string(),
            secondary_region: "AT".to_string(),
            provider_prices: None,
            calendar_days: 30,
            fetch_concurrency: 0,
            max_combination_size: 3,
            exhaustive_limit: 12,
        }
    }

    #[test]
    fn test_streaming_uses_default_prices() {
        let streaming = base_config().streaming().unwrap();
        assert_eq!(streaming.watch_region, "DE");
        assert_eq!(streaming.secondary_region, "AT");
        assert_eq!(streaming.price_for(8), Some(169.0));
        assert_eq!(streaming.price_for(9999), None);
        assert_eq!(streaming.calendar_days, 30);
        assert_eq!(streaming.max_combination_size, 3);
    }

    #[test]
    fn test_streaming_parses_price_override() {
        let mut config = base_config();
        config.provider_prices = Some(r#"{"8": 12.5, "337": 7}"#.to_string());

        let streaming = config.streaming().unwrap();
        assert_eq!(streaming.provider_prices.len(), 2);
        assert_eq!(streaming.price_for(8), Some(12.5));
        assert_eq!(streaming.price_for(337), Some(7.0));
        assert_eq!(streaming.price_for(119), None);
    }

    #[test]
    fn test_streaming_rejects_malformed_prices() {
        let mut config = base_config();
        config.provider_prices = Some("netflix=12".to_string());
        assert!(config.streaming().is_err());
    }

    #[test]
    fn test_default_regions() {
        let streaming = StreamingConfig::default();
        assert_eq!(streaming.watch_region, "EG");
        assert_eq!(streaming.secondary_region, "DE");
    }

    #[test]
    fn test_fetch_concurrency_never_zero() {
        let streaming = base_config().streaming().unwrap();
        assert_eq!(streaming.fetch_concurrency, 1);
    }
}
