use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::OptimizationResponse,
    routes::AppState,
    services::optimization,
};

/// Handler for optimization endpoint
pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<OptimizationResponse>> {
    let watchlist = state.store.load().await?;

    tracing::info!(
        request_id = %request_id,
        watchlist_count = watchlist.len(),
        "Processing optimization request"
    );

    let response =
        optimization::optimize_subscriptions(&state.availability, &state.config, &watchlist)
            .await?;

    tracing::info!(
        request_id = %request_id,
        combinations = response.combinations.len(),
        "Optimization completed"
    );

    Ok(Json(response))
}
