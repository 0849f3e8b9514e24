use serde::Serialize;

/// A streaming platform seen in the watchlist's regional offers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Platform {
    pub id: i64,
    pub name: String,
    pub logo_path: Option<String>,
    /// Monthly price from the static price table; `None` when unconfigured
    pub price: Option<f64>,
}

/// Platforms offering a single watchlist title at a flat rate
#[derive(Debug, Clone, PartialEq)]
pub struct TitleProviders {
    /// `{media_type}_{id}`
    pub key: String,
    pub title: String,
    pub provider_ids: Vec<i64>,
}

/// Best platform combination of a given size
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformCombination {
    pub num_platforms: usize,
    pub platforms: Vec<Platform>,
    pub coverage: usize,
    pub total: usize,
    pub percentage: f64,
    pub monthly_cost: f64,
    pub covered_titles: Vec<String>,
}

/// Response body for the subscription optimizer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptimizationResponse {
    pub total_titles: usize,
    pub combinations: Vec<PlatformCombination>,
    pub not_available: Vec<String>,
    pub all_platforms: Vec<Platform>,
}

/// A platform operating in the configured region, with its configured price
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionProvider {
    pub provider_id: i64,
    pub provider_name: String,
    pub logo_path: Option<String>,
    pub price: Option<f64>,
    pub configured: bool,
}
