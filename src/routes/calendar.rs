use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::RequestId, models::CalendarResponse, routes::AppState,
};

/// Upcoming episodes for the watchlist's TV shows
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<CalendarResponse>> {
    let watchlist = state.store.load().await?;
    let today = chrono::Local::now().date_naive();

    tracing::info!(request_id = %request_id, %today, "Processing calendar request");

    let response = state.calendar.upcoming(&watchlist, today).await?;
    Ok(Json(response))
}
