use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::StreamingConfig,
    db::WatchlistStore,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::MetadataProvider, AvailabilityService, CalendarService, CatalogService,
        PersonService,
    },
};

pub mod calendar;
pub mod optimize;
pub mod person;
pub mod titles;
pub mod watchlist;

/// Shared handler state
pub struct AppState {
    pub store: Arc<dyn WatchlistStore>,
    pub config: Arc<StreamingConfig>,
    pub availability: AvailabilityService,
    pub calendar: CalendarService,
    pub catalog: CatalogService,
    pub person: PersonService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn WatchlistStore>,
        provider: Arc<dyn MetadataProvider>,
        config: StreamingConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            store,
            availability: AvailabilityService::new(Arc::clone(&provider), Arc::clone(&config)),
            calendar: CalendarService::new(Arc::clone(&provider), Arc::clone(&config)),
            catalog: CatalogService::new(Arc::clone(&provider), Arc::clone(&config)),
            person: PersonService::new(provider, Arc::clone(&config)),
            config,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Watchlist
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route("/watchlist/:media_type/:id", delete(watchlist::remove))
        // Aggregations
        .route("/optimize", get(optimize::optimize))
        .route("/calendar", get(calendar::calendar))
        // Provider lookups
        .route("/providers", get(titles::providers))
        .route("/search", get(titles::search))
        .route("/details/:media_type/:id", get(titles::details))
        .route("/person/:id", get(person::profile))
        .route("/person/:id/availability", get(person::availability))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
