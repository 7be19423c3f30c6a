pub mod handlers;
pub mod pages;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/enroll", post(handlers::enroll))
        .route("/payment/success", get(handlers::payment_success))
        .route("/payment/cancel", get(handlers::payment_cancel))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
