//! Payment gateway adapter seam.
//!
//! Handlers talk to this trait, never to the gateway SDK directly, so tests
//! (and any future second processor) plug in behind `Arc<dyn PaymentGateway>`.

use async_trait::async_trait;

use leadlot_core::locking::LockType;
use leadlot_core::types::DbId;

/// Errors from gateway calls. Nothing durable has been written when one of
/// these surfaces; the user can simply retry.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Gateway response missing field: {0}")]
    MalformedResponse(&'static str),
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub dealer_id: DbId,
    pub lead_ids: Vec<DbId>,
    /// Total charge in cents, priced server-side.
    pub amount_cents: i64,
    /// Human-readable line item shown on the hosted page.
    pub description: String,
    /// Present when the dealer is paying for a lock rather than a purchase.
    pub lock_type: Option<LockType>,
}

/// A created checkout session the browser is redirected to.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

/// Completion state of a session, fetched on the client-side return path
/// when the webhook may not have arrived yet.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub session_id: String,
    pub paid: bool,
    /// The gateway's payment reference (falls back to the session id when
    /// the gateway omits a separate payment object).
    pub payment_id: String,
    pub amount_total_cents: i64,
}

/// The operations this service consumes from the payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return its redirect URL.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Fetch the completion state of an existing session.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;
}
