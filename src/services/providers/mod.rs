//! Metadata provider abstraction
//!
//! The aggregators only talk to TMDB through [`MetadataProvider`]; the live
//! client and the Redis-cached decorator both implement it.

use crate::models::{
    MediaType, ProviderListing, SearchKind, SearchPage, SeasonDetails, TvBasic, WatchProviders,
};

pub mod cached;
pub mod tmdb;

pub use cached::CachedProvider;
pub use tmdb::TmdbProvider;

/// Failure of a call to the external metadata provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("TMDB API key not configured")]
    MissingApiKey,

    #[error("Invalid TMDB API key")]
    Unauthorized,

    #[error("TMDB rate limit exceeded")]
    RateLimited,

    #[error("TMDB API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("TMDB request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse TMDB response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    /// Credential failures make every further lookup pointless
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey | ProviderError::Unauthorized)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for streaming metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Streaming offers for a title in every region
    async fn watch_providers(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<WatchProviders>;

    /// Light TV details: status, next episode pointer and season list
    async fn tv_basic(&self, id: i64) -> ProviderResult<TvBasic>;

    /// All episodes of one season
    async fn season(&self, id: i64, season_number: i64) -> ProviderResult<SeasonDetails>;

    /// Title search, excluding adult content
    async fn search(&self, kind: SearchKind, query: &str, page: u32)
        -> ProviderResult<SearchPage>;

    /// Full title details with watch providers, credits and external ids appended
    async fn title_details(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<serde_json::Value>;

    /// Person details with combined credits appended
    async fn person(&self, id: i64) -> ProviderResult<serde_json::Value>;

    /// Every provider operating in a region for a media type
    async fn available_providers(
        &self,
        media_type: MediaType,
        region: &str,
    ) -> ProviderResult<ProviderListing>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
