use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payments::gateway::PaymentGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: leadlot_db::DbPool,
    /// Server configuration (JWT secrets, gateway credentials, timeouts).
    pub config: Arc<ServerConfig>,
    /// Payment gateway adapter. A trait object so tests can substitute a
    /// stub without touching the handlers.
    pub gateway: Arc<dyn PaymentGateway>,
}
