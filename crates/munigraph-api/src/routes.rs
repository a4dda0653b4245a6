use crate::{handlers, health, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::liveness))
        .route("/health", get(health::health_check))
        .route("/communes", get(handlers::list_communes))
        .route("/graph", get(handlers::get_graph))
        .route("/elements", get(handlers::get_elements))
        .route("/legend", get(handlers::get_legend))
        .route("/refresh", post(handlers::refresh))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
