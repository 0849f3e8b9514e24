use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MediaType, RegionProvider, SearchKind, SearchPage},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    page: Option<u32>,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchPage>> {
    let kind = SearchKind::from_param(params.kind.as_deref());
    let page = state
        .catalog
        .search(kind, &params.q, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

pub async fn details(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i64)>,
) -> AppResult<Json<Value>> {
    let media_type: MediaType = media_type.parse()?;
    let details = state.catalog.details(media_type, id).await?;
    Ok(Json(details))
}

/// Providers operating in the configured region
pub async fn providers(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<RegionProvider>>> {
    let providers = state.catalog.region_providers().await?;
    Ok(Json(providers))
}
