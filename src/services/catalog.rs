use std::{collections::BTreeMap, sync::Arc};

use serde_json::{json, Value};

use crate::{
    config::StreamingConfig,
    error::AppResult,
    models::{MediaType, RegionProvider, SearchKind, SearchPage},
    services::providers::MetadataProvider,
};

/// Title search, title details and the regional provider list
pub struct CatalogService {
    provider: Arc<dyn MetadataProvider>,
    config: Arc<StreamingConfig>,
}

impl CatalogService {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: Arc<StreamingConfig>) -> Self {
        Self { provider, config }
    }

    /// Searches movies and TV shows; person results are dropped
    pub async fn search(&self, kind: SearchKind, query: &str, page: u32) -> AppResult<SearchPage> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchPage {
                page: 1,
                ..Default::default()
            });
        }

        let mut found = self.provider.search(kind, query, page.max(1)).await?;
        found.results = filter_titles(kind, found.results);

        tracing::debug!(
            query,
            kind = kind.as_str(),
            results = found.results.len(),
            "Search completed"
        );

        Ok(found)
    }

    /// Title details with watch providers narrowed to the primary and secondary regions
    pub async fn details(&self, media_type: MediaType, id: i64) -> AppResult<Value> {
        let details = self.provider.title_details(media_type, id).await?;
        let regions = [
            self.config.watch_region.as_str(),
            self.config.secondary_region.as_str(),
        ];
        Ok(reshape_watch_providers(details, &regions))
    }

    /// Every provider operating in the region for movies or TV, with configured prices
    pub async fn region_providers(&self) -> AppResult<Vec<RegionProvider>> {
        let region = self.config.watch_region.as_str();
        let movie = self.provider.available_providers(MediaType::Movie, region).await?;
        let tv = self.provider.available_providers(MediaType::Tv, region).await?;

        // Later listings replace earlier ones for the same id
        let merged: BTreeMap<i64, _> = movie
            .results
            .into_iter()
            .chain(tv.results)
            .map(|offer| (offer.provider_id, offer))
            .collect();

        Ok(merged
            .into_values()
            .map(|offer| {
                let price = self.config.price_for(offer.provider_id);
                RegionProvider {
                    provider_id: offer.provider_id,
                    provider_name: offer.provider_name,
                    logo_path: offer.logo_path,
                    price,
                    configured: price.is_some(),
                }
            })
            .collect())
    }
}

/// Keeps movie and TV results, tagging single-type searches with their media type
fn filter_titles(kind: SearchKind, results: Vec<Value>) -> Vec<Value> {
    results
        .into_iter()
        .filter_map(|mut result| {
            match kind {
                SearchKind::Movie | SearchKind::Tv => {
                    if let Some(fields) = result.as_object_mut() {
                        fields.insert("media_type".to_string(), json!(kind.as_str()));
                    }
                }
                SearchKind::Multi => {}
            }

            let is_title = matches!(
                result.get("media_type").and_then(Value::as_str),
                Some("movie") | Some("tv")
            );
            is_title.then_some(result)
        })
        .collect()
}

/// Replaces the `watch/providers` block with `watch_providers: {region: offers}`
///
/// Every requested region gets a lowercase key; regions without offers map to `{}`.
fn reshape_watch_providers(mut details: Value, regions: &[&str]) -> Value {
    if let Some(fields) = details.as_object_mut() {
        let mut results = fields
            .remove("watch/providers")
            .and_then(|mut providers| providers.get_mut("results").map(Value::take))
            .unwrap_or_else(|| json!({}));

        let mut by_region = serde_json::Map::new();
        for region in regions {
            let offers = results
                .get_mut(*region)
                .map(Value::take)
                .unwrap_or_else(|| json!({}));
            by_region.insert(region.to_ascii_lowercase(), offers);
        }
        fields.insert("watch_providers".to_string(), Value::Object(by_region));
    }

    details
}
