//! Route definitions for the `/dealer/leads` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{dashboard, locks, purchases};
use crate::state::AppState;

/// Routes mounted at `/dealer/leads`.
///
/// ```text
/// GET    /                 -> list_leads
/// GET    /{id}/lock        -> lock_status
/// POST   /{id}/lock        -> acquire_lock
/// DELETE /{id}/lock        -> release_lock
/// POST   /{id}/download    -> download_lead
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::list_leads))
        .route(
            "/{id}/lock",
            get(locks::lock_status)
                .post(locks::acquire_lock)
                .delete(locks::release_lock),
        )
        .route("/{id}/download", post(purchases::download_lead))
}
