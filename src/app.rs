use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{admin, child, family, health, prices, stocks, trades};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/stocks", stocks::router())
        .nest("/api/prices", prices::router())
        .nest("/api/trades", trades::router())
        .nest("/api/child", child::router())
        .nest("/api/family", family::router())
        .nest("/api/admin", admin::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
