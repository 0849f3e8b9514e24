use std::time::Instant;

use crate::{
    config::StreamingConfig,
    error::{AppError, AppResult},
    models::{OptimizationResponse, WatchlistItem},
    services::{
        availability::{AvailabilityService, ProviderCatalogue},
        optimizer::Optimizer,
    },
};

/// Recommends the best-value platform combination for each size up to the configured maximum
///
/// The optimization prioritizes:
/// 1. Number of watchlist titles covered (primary objective)
/// 2. Total monthly cost (tie-breaker)
pub async fn optimize_subscriptions(
    availability: &AvailabilityService,
    config: &StreamingConfig,
    watchlist: &[WatchlistItem],
) -> AppResult<OptimizationResponse> {
    let start = Instant::now();

    if watchlist.is_empty() {
        return Err(AppError::InvalidInput("Watchlist is empty".to_string()));
    }

    tracing::info!(total = watchlist.len(), "Starting optimization");

    // 1. Fetch regional offers (bounded fan-out, cached) and build the catalogue
    let catalogue = availability.catalogue(watchlist).await?;

    // 2. Search platform combinations
    let response = optimize_catalogue(&catalogue, config)?;

    if !response.not_available.is_empty() {
        tracing::info!(
            count = response.not_available.len(),
            "Some titles are not on any flat-rate platform"
        );
    }

    let elapsed = start.elapsed();
    tracing::info!(
        processing_time_ms = elapsed.as_millis(),
        combinations = response.combinations.len(),
        "Optimization completed"
    );

    Ok(response)
}

/// Runs the optimizer over an already built catalogue
pub fn optimize_catalogue(
    catalogue: &ProviderCatalogue,
    config: &StreamingConfig,
) -> AppResult<OptimizationResponse> {
    let combinations = Optimizer::new(catalogue, config)
        .optimize()
        .map_err(|e| AppError::Optimization(e.to_string()))?;

    Ok(OptimizationResponse {
        total_titles: catalogue.titles.len(),
        combinations,
        not_available: catalogue.not_available(),
        all_platforms: catalogue.platforms.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaType, ProviderOffer, RegionOffers, WatchProviders};
    use crate::services::providers::MockMetadataProvider;
    use chrono::Utc;
    use std::sync::Arc;

    fn watch_item(id: i64, title: &str) -> WatchlistItem {
        WatchlistItem {
            id,
            media_type: MediaType::Movie,
            title: title.to_string(),
            poster_path: None,
            vote_average: 0.0,
            release_date: None,
            added_at: Utc::now(),
        }
    }

    fn offers(region: &str, ids: &[(i64, &str)]) -> WatchProviders {
        let mut providers = WatchProviders::default();
        providers.results.insert(
            region.to_string(),
            RegionOffers {
                flatrate: ids
                    .iter()
                    .map(|(id, name)| ProviderOffer {
                        provider_id: *id,
                        provider_name: name.to_string(),
                        logo_path: None,
                    })
                    .collect(),
                ..Default::default()
            },
        );
        providers
    }

    fn service(mock: MockMetadataProvider, config: &StreamingConfig) -> AvailabilityService {
        AvailabilityService::new(Arc::new(mock), Arc::new(config.clone()))
    }

    #[tokio::test]
    async fn test_empty_watchlist_is_rejected() {
        let config = StreamingConfig::default();
        let availability = service(MockMetadataProvider::new(), &config);

        let result = optimize_subscriptions(&availability, &config, &[]).await;
        match result {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "Watchlist is empty"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_optimize_subscriptions() {
        let config = StreamingConfig::default();
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_watch_providers().returning(|_, id| match id {
            1 | 2 => Ok(offers("EG", &[(8, "Netflix")])),
            3 => Ok(offers("EG", &[(119, "Amazon Prime Video"), (8, "Netflix")])),
            _ => Ok(WatchProviders::default()),
        });
        let availability = service(mock, &config);

        let watchlist = vec![
            watch_item(1, "Inception"),
            watch_item(2, "Heat"),
            watch_item(3, "Drive"),
            watch_item(4, "Nowhere"),
        ];

        let response = optimize_subscriptions(&availability, &config, &watchlist)
            .await
            .unwrap();

        assert_eq!(response.total_titles, 4);
        assert_eq!(response.not_available, vec!["Nowhere".to_string()]);
        assert_eq!(response.all_platforms.len(), 2);
        assert_eq!(response.all_platforms[0].id, 8);

        assert_eq!(response.combinations.len(), 2);
        let best_single = &response.combinations[0];
        assert_eq!(best_single.platforms[0].id, 8);
        assert_eq!(best_single.coverage, 3);
        assert_eq!(best_single.percentage, 75.0);
        assert_eq!(best_single.monthly_cost, 169.0);
        assert_eq!(best_single.covered_titles, vec!["Inception", "Heat", "Drive"]);

        let pair = &response.combinations[1];
        assert_eq!(pair.coverage, 3);
        assert_eq!(pair.monthly_cost, 214.0);
    }

    #[test]
    fn test_optimize_catalogue_without_platforms() {
        let catalogue = ProviderCatalogue {
            platforms: vec![],
            titles: vec![crate::models::TitleProviders {
                key: "movie_1".to_string(),
                title: "Lost".to_string(),
                provider_ids: vec![],
            }],
        };

        let response = optimize_catalogue(&catalogue, &StreamingConfig::default()).unwrap();
        assert!(response.combinations.is_empty());
        assert_eq!(response.total_titles, 1);
        assert_eq!(response.not_available, vec!["Lost".to_string()]);
    }
}
