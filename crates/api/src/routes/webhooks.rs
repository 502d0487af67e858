//! Route definitions for inbound gateway webhooks.
//!
//! Public (no bearer auth); authenticity comes from the event signature.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /stripe    -> stripe_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(webhooks::stripe_webhook))
}
