use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Watch Providers
// ============================================================================

/// Response from `/{media_type}/{id}/watch/providers`, keyed by region code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionOffers>,
}

impl WatchProviders {
    /// Offers for a single region, or an empty set when the title is not offered there
    pub fn region(&self, region: &str) -> RegionOffers {
        self.results.get(region).cloned().unwrap_or_default()
    }
}

/// Offers for one region, grouped by monetization type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionOffers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<ProviderOffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rent: Vec<ProviderOffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buy: Vec<ProviderOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderOffer {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// Response from `/watch/providers/{media_type}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderListing {
    #[serde(default)]
    pub results: Vec<ProviderOffer>,
}

// ============================================================================
// TV Seasons
// ============================================================================

/// Lightweight `/tv/{id}` payload: just enough to find upcoming episodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TvBasic {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub next_episode_to_air: Option<EpisodePointer>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
}

impl TvBasic {
    /// Whether the show has ended or been cancelled
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("ended") | Some("canceled") | Some("cancelled")
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodePointer {
    #[serde(default)]
    pub season_number: Option<i64>,
    #[serde(default)]
    pub episode_number: Option<i64>,
    #[serde(default)]
    pub air_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonSummary {
    #[serde(default)]
    pub season_number: i64,
}

/// Response from `/tv/{id}/season/{season_number}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub episodes: Vec<SeasonEpisode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonEpisode {
    #[serde(default)]
    pub season_number: Option<i64>,
    #[serde(default)]
    pub episode_number: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

/// Which search endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Multi,
    Movie,
    Tv,
}

impl SearchKind {
    /// Kind named by a `type` query parameter; anything unrecognised searches everything
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("movie") => SearchKind::Movie,
            Some("tv") => SearchKind::Tv,
            _ => SearchKind::Multi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Multi => "multi",
            SearchKind::Movie => "movie",
            SearchKind::Tv => "tv",
        }
    }
}

/// Paginated search response; individual results are passed through untyped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub total_results: i64,
}

fn first_page() -> i64 {
    1
}
