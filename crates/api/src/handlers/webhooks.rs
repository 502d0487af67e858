//! Payment gateway webhook endpoint.
//!
//! Signature verification happens on the raw body before anything else; a
//! forged event is rejected 400 without touching the store. Once the
//! signature checks out the endpoint always acks 2xx -- per-lead failures
//! are logged and recorded for the sweep, because a non-2xx here only buys
//! an identical redelivery.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use leadlot_core::signature::{verify_signature, SIGNATURE_TOLERANCE_SECS};
use leadlot_core::types::DbId;
use leadlot_db::repositories::CheckoutRepo;

use crate::error::{AppError, AppResult};
use crate::reconcile::{self, CompletedSession};
use crate::state::AppState;

/// The event envelope. Only the fields this service reads.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: CheckoutSessionObject,
}

/// The checkout session object embedded in a completion event.
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: SessionMetadata,
}

/// Session metadata written at session-creation time. Used as a fallback
/// when the pending-checkout row is missing.
#[derive(Debug, Default, Deserialize)]
struct SessionMetadata {
    dealer_id: Option<String>,
    lead_ids: Option<String>,
}

/// POST /api/v1/webhooks/stripe
///
/// Verify, parse, and route a gateway event. `checkout.session.completed`
/// triggers reconciliation; everything else is acknowledged and ignored.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::SignatureInvalid("Missing Stripe-Signature header".into()))?;

    verify_signature(
        &state.config.stripe.webhook_secret,
        &body,
        signature,
        Utc::now(),
        SIGNATURE_TOLERANCE_SECS,
    )
    .map_err(|e| AppError::SignatureInvalid(e.to_string()))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {e}")))?;

    if event.event_type != "checkout.session.completed" {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event type");
        return Ok(Json(json!({ "received": true })));
    }

    let object = event.data.object;
    let payment_id = object
        .payment_intent
        .clone()
        .unwrap_or_else(|| object.id.clone());

    match CheckoutRepo::claim(&state.pool, &object.id, Some(&payment_id)).await? {
        Some(pending) => {
            let session = CompletedSession::from_pending(&pending, &payment_id);
            reconcile::process_and_record(&state.pool, pending.id, &session).await;
        }
        None => {
            // Either a duplicate delivery (row consumed: nothing to do) or
            // a session this service never recorded (fall back to event
            // metadata so a confirmed payment is never silently dropped).
            let consumed = CheckoutRepo::find_by_session(&state.pool, &object.id)
                .await?
                .is_some();
            if consumed {
                tracing::info!(
                    session_id = %object.id,
                    "Duplicate completion event; session already reconciled",
                );
            } else if let Some(session) =
                session_from_metadata(&object, &payment_id)
            {
                tracing::warn!(
                    session_id = %object.id,
                    "No pending checkout for session; reconciling from event metadata",
                );
                reconcile::process_completed_session(&state.pool, &session).await;
            } else {
                tracing::error!(
                    session_id = %object.id,
                    payment_id = %payment_id,
                    "Completed session with no pending record and no usable metadata",
                );
            }
        }
    }

    Ok(Json(json!({ "received": true })))
}

/// Rebuild a minimal session from event metadata. Prices are unknown at
/// this point, so purchases record a zero amount and rely on manual
/// reconciliation against gateway records.
fn session_from_metadata(
    object: &CheckoutSessionObject,
    payment_id: &str,
) -> Option<CompletedSession> {
    let dealer_id: DbId = object.metadata.dealer_id.as_ref()?.parse().ok()?;
    let lead_ids: Vec<DbId> = object
        .metadata
        .lead_ids
        .as_ref()?
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if lead_ids.is_empty() {
        return None;
    }

    Some(CompletedSession {
        session_id: object.id.clone(),
        payment_id: payment_id.to_string(),
        dealer_id,
        lead_ids,
        lead_prices: Default::default(),
        pending_lock_type: None,
        discount_applied: false,
        discount_type: None,
        discount_amount_cents: None,
    })
}
