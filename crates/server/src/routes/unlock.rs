//! Public unlock endpoints: queue a manual request, check unlock and subscription status.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ManualRequestInput {
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HandleInput {
    #[serde(default)]
    pub instagram_handle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailInput {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct OkOutput {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct UnlockedOutput {
    pub unlocked: bool,
}

#[derive(Serialize)]
pub struct SubscribedOutput {
    pub subscribed: bool,
}

/// Missing or malformed bodies behave like an empty object.
pub(crate) fn body_or_default<T: Default>(body: Option<Json<T>>) -> T {
    body.map(|Json(b)| b).unwrap_or_default()
}

pub async fn manual_unlock_request(
    State(state): State<AppState>,
    body: Option<Json<ManualRequestInput>>,
) -> Result<Json<OkOutput>, JsonApiError> {
    let input = body_or_default(body);
    let handle = input.instagram_handle.unwrap_or_default();
    if handle.trim().is_empty() {
        return Err(JsonApiError::bad_request("instagram_handle required"));
    }
    let req = state
        .store
        .enqueue_manual_request(&handle, input.proof.as_deref().unwrap_or_default())
        .await?;
    metrics::MANUAL_REQUESTS_TOTAL.inc();
    info!(handle = %req.handle, "manual unlock request queued");
    Ok(Json(OkOutput { ok: true, message: "Request submitted".into() }))
}

pub async fn check_manual_unlock(State(state): State<AppState>, body: Option<Json<HandleInput>>) -> Json<UnlockedOutput> {
    let handle = body_or_default(body).instagram_handle.unwrap_or_default();
    metrics::STATUS_CHECKS_TOTAL.inc();
    Json(UnlockedOutput { unlocked: state.store.is_instagram_unlocked(&handle).await })
}

pub async fn check_subscription(State(state): State<AppState>, body: Option<Json<EmailInput>>) -> Json<SubscribedOutput> {
    let email = body_or_default(body).email.unwrap_or_default();
    metrics::STATUS_CHECKS_TOTAL.inc();
    Json(SubscribedOutput { subscribed: state.store.is_subscribed(&email).await })
}
