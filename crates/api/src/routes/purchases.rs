//! Route definitions for the `/dealer/purchases` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::purchases;
use crate::state::AppState;

/// Routes mounted at `/dealer/purchases`.
///
/// ```text
/// GET /    -> list_purchases
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(purchases::list_purchases))
}
