use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use service::unlock::ManualRequest;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::routes::unlock::body_or_default;
use crate::state::AppState;

pub const SECRET_HEADER: &str = "x-manual-secret";

#[derive(Debug, Default, Deserialize)]
pub struct SecretQuery {
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManualUnlockInput {
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Serialize)]
pub struct RequestsOutput {
    pub requests: Vec<ManualRequest>,
}

#[derive(Serialize)]
pub struct UnlockOutput {
    pub ok: bool,
    pub message: String,
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    let left_bytes = left.as_bytes();
    let right_bytes = right.as_bytes();
    if left_bytes.len() != right_bytes.len() {
        return false;
    }

    let mut diff = 0_u8;
    for (a, b) in left_bytes.iter().zip(right_bytes.iter()) {
        diff |= *a ^ *b;
    }
    diff == 0
}

/// First non-empty candidate wins; an unset server secret rejects everything.
fn authorize(state: &AppState, candidates: &[Option<&str>]) -> Result<(), JsonApiError> {
    let provided = candidates.iter().flatten().find(|s| !s.is_empty()).copied();
    let ok = match (state.unlock.manual_unlock_secret.as_deref(), provided) {
        (Some(expected), Some(given)) => constant_time_eq(given, expected),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        metrics::ADMIN_FORBIDDEN_TOTAL.inc();
        warn!("admin call rejected");
        Err(JsonApiError::forbidden())
    }
}

fn header_secret(headers: &HeaderMap) -> Option<&str> {
    headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok())
}

/// List the manual request queue. Secret via `?secret=` or the `x-manual-secret` header.
pub async fn list_manual_requests(
    State(state): State<AppState>,
    Query(q): Query<SecretQuery>,
    headers: HeaderMap,
) -> Result<Json<RequestsOutput>, JsonApiError> {
    authorize(&state, &[q.secret.as_deref(), header_secret(&headers)])?;
    Ok(Json(RequestsOutput { requests: state.store.list_manual_requests().await }))
}

/// Approve a handle: unlock it and close every queued request for it.
/// Secret via the JSON body or the `x-manual-secret` header.
pub async fn manual_unlock(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<ManualUnlockInput>>,
) -> Result<Json<UnlockOutput>, JsonApiError> {
    let input = body_or_default(body);
    authorize(&state, &[input.secret.as_deref(), header_secret(&headers)])?;

    let handle = input.instagram_handle.unwrap_or_default().trim().to_lowercase();
    if handle.is_empty() {
        return Err(JsonApiError::bad_request("instagram_handle required"));
    }
    let marked = state.store.approve_manual_request(&handle).await?;
    metrics::MANUAL_UNLOCKS_TOTAL.inc();
    info!(%handle, marked, "manual unlock granted");
    Ok(Json(UnlockOutput { ok: true, message: format!("Unlocked {handle}") }))
}
