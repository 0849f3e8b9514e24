//! TMDB (The Movie Database) API v3 provider
//!
//! Every request carries the API key as a query parameter. Status codes are
//! mapped onto `ProviderError` so callers can tell credential problems and
//! rate limiting apart from ordinary transport failures.

use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::{
    MediaType, ProviderListing, SearchKind, SearchPage, SeasonDetails, TvBasic, WatchProviders,
};

use super::{MetadataProvider, ProviderError, ProviderResult};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests time out after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> ProviderResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Performs a GET against the API and decodes the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<T> {
        if self.api_key.trim().is_empty() || self.api_key == "your_api_key_here" {
            return Err(ProviderError::MissingApiKey);
        }

        let response = self
            .http_client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(ProviderError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            _ => {}
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(path = %path, status = %status, body = %body, "TMDB request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(path = %path, error = %e, "Failed to deserialize TMDB response");
            ProviderError::Decode(e)
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn watch_providers(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<WatchProviders> {
        self.get(&format!("/{}/{}/watch/providers", media_type, id), &[])
            .await
    }

    async fn tv_basic(&self, id: i64) -> ProviderResult<TvBasic> {
        self.get(&format!("/tv/{}", id), &[]).await
    }

    async fn season(&self, id: i64, season_number: i64) -> ProviderResult<SeasonDetails> {
        self.get(&format!("/tv/{}/season/{}", id, season_number), &[])
            .await
    }

    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        page: u32,
    ) -> ProviderResult<SearchPage> {
        let params = [
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        self.get(&format!("/search/{}", kind.as_str()), &params)
            .await
    }

    async fn title_details(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<serde_json::Value> {
        let params = [(
            "append_to_response",
            "watch/providers,credits,external_ids".to_string(),
        )];
        self.get(&format!("/{}/{}", media_type, id), &params).await
    }

    async fn person(&self, id: i64) -> ProviderResult<serde_json::Value> {
        let params = [("append_to_response", "combined_credits".to_string())];
        self.get(&format!("/person/{}", id), &params).await
    }

    async fn available_providers(
        &self,
        media_type: MediaType,
        region: &str,
    ) -> ProviderResult<ProviderListing> {
        let params = [("watch_region", region.to_string())];
        self.get(&format!("/watch/providers/{}", media_type), &params)
            .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
