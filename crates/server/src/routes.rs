use std::path::Path;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub mod admin;
pub mod unlock;
pub mod webhooks;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

#[derive(Serialize)]
pub struct CheckoutOutput {
    pub url: String,
}

/// Hand out the hosted checkout page.
pub async fn checkout(State(state): State<AppState>) -> Result<Json<CheckoutOutput>, JsonApiError> {
    match state.unlock.lemon_checkout_url.clone() {
        Some(url) => Ok(Json(CheckoutOutput { url })),
        None => Err(JsonApiError::internal("LEMON_CHECKOUT_URL not configured")),
    }
}

/// Build the full application router: health, public unlock API, webhooks,
/// admin endpoints, and static files from `public_dir` as the fallback.
pub fn build_router(state: AppState, public_dir: impl AsRef<Path>, cors: CorsLayer) -> Router {
    let public_dir = public_dir.as_ref();
    let static_dir = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/checkout", post(checkout))
        .route("/api/manual-unlock-request", post(unlock::manual_unlock_request))
        .route("/api/check-manual-unlock", post(unlock::check_manual_unlock))
        .route("/api/check-subscription", post(unlock::check_subscription));

    let hooks = Router::new()
        .route("/webhook/lemonsqueezy", post(webhooks::lemonsqueezy))
        .route("/webhook/manychat", post(webhooks::manychat));

    let admin_routes = Router::new()
        .route("/api/manual-unlock-requests", get(admin::list_manual_requests))
        .route("/api/manual-unlock", post(admin::manual_unlock));

    api.merge(hooks)
        .merge(admin_routes)
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
