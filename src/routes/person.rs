use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PersonAvailability, PersonProfile},
    routes::AppState,
};

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(person_id): Path<i64>,
) -> AppResult<Json<PersonProfile>> {
    let profile = state.person.profile(person_id).await?;
    Ok(Json(profile))
}

/// Filmography with availability in the configured region
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(person_id): Path<i64>,
) -> AppResult<Json<PersonAvailability>> {
    tracing::info!(request_id = %request_id, person_id, "Processing person availability request");

    let availability = state.person.availability(person_id).await?;
    Ok(Json(availability))
}
