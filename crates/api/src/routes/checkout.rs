//! Route definitions for the `/dealer/checkout` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

/// Routes mounted at `/dealer/checkout`.
///
/// ```text
/// POST /           -> create_checkout
/// POST /complete   -> complete_checkout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::create_checkout))
        .route("/complete", post(checkout::complete_checkout))
}
