mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::location::{supported_city_names, CityResolver};
pub use state::AppState;

pub fn build_router(resolver: CityResolver) -> Router {
    let state = Arc::new(AppState {
        resolver,
        default_cities: supported_city_names(),
    });

    Router::new()
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/reverse", get(handlers::reverse))
        .route("/api/city", get(handlers::city))
        .route("/api/distance", get(handlers::distance))
        .route("/api/cities", get(handlers::city_list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: CityResolver) -> std::io::Result<()> {
    let app = build_router(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Event Locator API listening on http://{}", addr);
    axum::serve(listener, app).await
}
