use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    models::{
        MediaType, ProviderListing, SearchKind, SearchPage, SeasonDetails, TvBasic,
        WatchProviders,
    },
};

use super::{MetadataProvider, ProviderResult};

/// Redis read-through cache in front of another provider
///
/// Only the per-title lookups used by the optimizer and calendar are cached;
/// search, details and person lookups always go to the inner provider.
#[derive(Clone)]
pub struct CachedProvider {
    inner: Arc<dyn MetadataProvider>,
    cache: Cache,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn MetadataProvider>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for CachedProvider {
    async fn watch_providers(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<WatchProviders> {
        cached!(
            self.cache,
            CacheKey::WatchProviders(media_type, id),
            self.inner.watch_providers(media_type, id)
        )
    }

    async fn tv_basic(&self, id: i64) -> ProviderResult<TvBasic> {
        cached!(
            self.cache,
            CacheKey::TvBasic(id),
            self.inner.tv_basic(id)
        )
    }

    async fn season(&self, id: i64, season_number: i64) -> ProviderResult<SeasonDetails> {
        cached!(
            self.cache,
            CacheKey::Season(id, season_number),
            self.inner.season(id, season_number)
        )
    }

    async fn search(
        &self,
        kind: SearchKind,
        query: &str,
        page: u32,
    ) -> ProviderResult<SearchPage> {
        self.inner.search(kind, query, page).await
    }

    async fn title_details(
        &self,
        media_type: MediaType,
        id: i64,
    ) -> ProviderResult<serde_json::Value> {
        self.inner.title_details(media_type, id).await
    }

    async fn person(&self, id: i64) -> ProviderResult<serde_json::Value> {
        self.inner.person(id).await
    }

    async fn available_providers(
        &self,
        media_type: MediaType,
        region: &str,
    ) -> ProviderResult<ProviderListing> {
        self.inner.available_providers(media_type, region).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
