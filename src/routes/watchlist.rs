use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{AddWatchlistRequest, MediaType, NewWatchlistItem, WatchlistItem},
    routes::AppState,
};

/// Body returned by watchlist mutations
#[derive(Debug, Serialize)]
pub struct WatchlistUpdate {
    pub success: bool,
    pub watchlist: Vec<WatchlistItem>,
}

/// Current watchlist, newest first
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<WatchlistItem>>> {
    let watchlist = state.store.load().await?;
    Ok(Json(watchlist))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AddWatchlistRequest>,
) -> AppResult<Json<WatchlistUpdate>> {
    let item = NewWatchlistItem::try_from(request)?;

    tracing::info!(
        request_id = %request_id,
        id = item.id,
        media_type = %item.media_type,
        "Adding watchlist item"
    );

    let watchlist = state.store.add(item).await?;
    Ok(Json(WatchlistUpdate {
        success: true,
        watchlist,
    }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((media_type, id)): Path<(String, i64)>,
) -> AppResult<Json<WatchlistUpdate>> {
    let media_type: MediaType = media_type.parse()?;

    tracing::info!(
        request_id = %request_id,
        id,
        media_type = %media_type,
        "Removing watchlist item"
    );

    let watchlist = state.store.remove(media_type, id).await?;
    Ok(Json(WatchlistUpdate {
        success: true,
        watchlist,
    }))
}
