pub mod checkout;
pub mod health;
pub mod leads;
pub mod purchases;
pub mod settings;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dealer/leads                      dashboard listing
/// /dealer/leads/{id}/lock            lock status / acquire / release
/// /dealer/leads/{id}/download        gated contact download
/// /dealer/purchases                  purchased leads
/// /dealer/checkout                   create payment session
/// /dealer/checkout/complete          client-side completion fallback
/// /admin/settings                    system settings (admin only)
/// /webhooks/stripe                   signed gateway events (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dealer/leads", leads::router())
        .nest("/dealer/purchases", purchases::router())
        .nest("/dealer/checkout", checkout::router())
        .nest("/admin/settings", settings::router())
        .nest("/webhooks", webhooks::router())
}
