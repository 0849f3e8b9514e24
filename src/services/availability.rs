use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::StreamingConfig,
    error::AppResult,
    models::{Platform, ProviderOffer, TitleProviders, WatchlistItem},
    services::{
        fetch::{FetchCoordinator, FetchFailure, FetchOutcome},
        providers::{MetadataProvider, ProviderError},
    },
};

/// Platforms and per-title offers for one watchlist snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderCatalogue {
    /// Distinct platforms in first-seen order
    pub platforms: Vec<Platform>,
    /// One entry per watchlist title, in watchlist order
    pub titles: Vec<TitleProviders>,
}

impl ProviderCatalogue {
    pub fn platform(&self, provider_id: i64) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == provider_id)
    }

    /// Titles no platform offers at a flat rate
    pub fn not_available(&self) -> Vec<String> {
        self.titles
            .iter()
            .filter(|t| t.provider_ids.is_empty())
            .map(|t| t.title.clone())
            .collect()
    }
}

/// Builds the platform catalogue and title map from per-title flat-rate offers
///
/// `offers[i]` belongs to `watchlist[i]`. The first offer seen for a provider
/// id fixes its name and logo; prices come from the static price table.
pub fn build_catalogue(
    watchlist: &[WatchlistItem],
    offers: Vec<Vec<ProviderOffer>>,
    config: &StreamingConfig,
) -> ProviderCatalogue {
    let mut platforms: Vec<Platform> = Vec::new();
    let mut platform_index: HashMap<i64, usize> = HashMap::new();
    let mut titles: Vec<TitleProviders> = Vec::new();
    let mut title_index: HashMap<String, usize> = HashMap::new();

    for (item, flatrate) in watchlist.iter().zip(offers) {
        let mut provider_ids = Vec::with_capacity(flatrate.len());

        for offer in flatrate {
            if !platform_index.contains_key(&offer.provider_id) {
                platform_index.insert(offer.provider_id, platforms.len());
                platforms.push(Platform {
                    id: offer.provider_id,
                    name: offer.provider_name,
                    logo_path: offer.logo_path,
                    price: config.price_for(offer.provider_id),
                });
            }
            if !provider_ids.contains(&offer.provider_id) {
                provider_ids.push(offer.provider_id);
            }
        }

        let entry = TitleProviders {
            key: item.key(),
            title: item.display_title().to_string(),
            provider_ids,
        };

        match title_index.get(&entry.key) {
            Some(&index) => titles[index] = entry,
            None => {
                title_index.insert(entry.key.clone(), titles.len());
                titles.push(entry);
            }
        }
    }

    ProviderCatalogue { platforms, titles }
}

/// Fetches regional flat-rate offers for watchlist titles
pub struct AvailabilityService {
    provider: Arc<dyn MetadataProvider>,
    config: Arc<StreamingConfig>,
    coordinator: FetchCoordinator,
}

impl AvailabilityService {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: Arc<StreamingConfig>) -> Self {
        let coordinator = FetchCoordinator::new(config.fetch_concurrency);
        Self {
            provider,
            config,
            coordinator,
        }
    }

    /// Fetches the configured region's flat-rate offers for every title, in watchlist order
    ///
    /// A failed lookup counts as "no offers", except an authentication failure,
    /// which fails the whole batch.
    pub async fn fetch_flatrate_offers(
        &self,
        watchlist: &[WatchlistItem],
    ) -> AppResult<Vec<Vec<ProviderOffer>>> {
        tracing::info!(
            title_count = watchlist.len(),
            provider = self.provider.name(),
            region = %self.config.watch_region,
            "Fetching availability batch"
        );

        let targets: Vec<_> = watchlist.iter().map(|w| (w.media_type, w.id)).collect();
        let provider = Arc::clone(&self.provider);
        let region = self.config.watch_region.clone();

        let outcomes = self
            .coordinator
            .run(targets, |(media_type, id)| {
                let provider = Arc::clone(&provider);
                let region = region.clone();
                async move {
                    let providers = provider.watch_providers(media_type, id).await?;
                    Ok::<_, ProviderError>(providers.region(&region).flatrate)
                }
            })
            .await;

        let mut offers = Vec::with_capacity(outcomes.len());
        let mut failed = 0;

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                FetchOutcome::Fetched(flatrate) => offers.push(flatrate),
                FetchOutcome::Failed(FetchFailure::Lookup(e)) if e.is_auth_failure() => {
                    tracing::error!(index, error = %e, "Metadata provider rejected credentials");
                    return Err(e.into());
                }
                FetchOutcome::Failed(failure) => {
                    tracing::warn!(index, error = %failure, "Availability fetch failed for title");
                    failed += 1;
                    offers.push(Vec::new());
                }
            }
        }

        if failed > 0 {
            tracing::warn!(
                success_count = offers.len() - failed,
                error_count = failed,
                "Partial availability fetch failure"
            );
        }

        Ok(offers)
    }

    /// Fetches offers and builds the catalogue for a watchlist snapshot
    pub async fn catalogue(&self, watchlist: &[WatchlistItem]) -> AppResult<ProviderCatalogue> {
        let offers = self.fetch_flatrate_offers(watchlist).await?;
        let catalogue = build_catalogue(watchlist, offers, &self.config);

        tracing::info!(
            platforms = catalogue.platforms.len(),
            titles = catalogue.titles.len(),
            "Provider catalogue built"
        );

        Ok(catalogue)
    }
}
