use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{debug, info, warn};

use service::errors::ServiceError;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::state::AppState;

/// `data.attributes.customer_email` of a LemonSqueezy event, if it is a non-blank string.
pub fn customer_email(event: &Value) -> Option<&str> {
    event
        .pointer("/data/attributes/customer_email")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// LemonSqueezy order/subscription webhook. Records the customer email as
/// subscribed, keeping the whole event as details. Events without an email
/// are acknowledged and ignored; a failed write answers 500 so the sender retries.
pub async fn lemonsqueezy(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, &'static str), JsonApiError> {
    let Some(Json(event)) = body else {
        warn!("lemonsqueezy webhook without a JSON body");
        return Ok((StatusCode::OK, "ok"));
    };
    let Some(email) = customer_email(&event).map(str::to_owned) else {
        debug!("lemonsqueezy event without customer_email ignored");
        return Ok((StatusCode::OK, "ok"));
    };
    match state.store.mark_subscribed(&email, event).await {
        Ok(()) => {
            metrics::SUBSCRIPTIONS_TOTAL.inc();
            info!(%email, "marked lemonsqueezy purchase");
            Ok((StatusCode::OK, "ok"))
        }
        Err(ServiceError::Validation(msg)) => {
            warn!(error = %msg, "lemonsqueezy event rejected by store");
            Ok((StatusCode::OK, "ok"))
        }
        Err(e) => Err(e.into()),
    }
}

/// ManyChat events are only logged.
pub async fn manychat(body: Option<Json<Value>>) -> (StatusCode, &'static str) {
    match body {
        Some(Json(event)) => info!(%event, "manychat event"),
        None => info!("manychat event without JSON body"),
    }
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn customer_email_reads_nested_attribute() {
        let event = json!({"meta": {"event_name": "order_created"}, "data": {"attributes": {"customer_email": "Buyer@Example.com"}}});
        assert_eq!(customer_email(&event), Some("Buyer@Example.com"));
    }

    #[test]
    fn customer_email_missing_or_blank_is_none() {
        assert_eq!(customer_email(&json!({})), None);
        assert_eq!(customer_email(&json!({"data": {"attributes": {"customer_email": "  "}}})), None);
        assert_eq!(customer_email(&json!({"data": {"attributes": {"customer_email": 42}}})), None);
        assert_eq!(customer_email(&json!({"data": null})), None);
    }
}
