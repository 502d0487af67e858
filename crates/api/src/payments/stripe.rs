//! Stripe Checkout implementation of the payment gateway adapter.
//!
//! Uses the form-encoded REST API directly (sessions create/retrieve are
//! the only two calls this service makes). The session carries the dealer
//! and lead ids in metadata so a completed event can be reconciled even if
//! the pending-checkout row is somehow gone.

use async_trait::async_trait;
use serde::Deserialize;

use leadlot_core::types::DbId;

use crate::config::StripeConfig;
use crate::payments::gateway::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway, SessionStatus,
};

/// Stripe REST client for Checkout Sessions.
pub struct StripeGateway {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.config.api_base)
    }
}

/// Response shape for session create/retrieve. Only the fields this
/// service reads.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    payment_intent: Option<String>,
    amount_total: Option<i64>,
}

/// Comma-separated lead id list for session metadata.
fn lead_ids_csv(lead_ids: &[DbId]) -> String {
    lead_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let amount = request.amount_cents.to_string();
        let quantity = "1";
        let dealer_id = request.dealer_id.to_string();
        let lead_ids = lead_ids_csv(&request.lead_ids);

        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &self.config.success_url),
            ("cancel_url", &self.config.cancel_url),
            ("line_items[0][price_data][currency]", &self.config.currency),
            ("line_items[0][price_data][unit_amount]", &amount),
            (
                "line_items[0][price_data][product_data][name]",
                &request.description,
            ),
            ("line_items[0][quantity]", quantity),
            ("metadata[dealer_id]", &dealer_id),
            ("metadata[lead_ids]", &lead_ids),
        ];

        let lock_type_json;
        if let Some(lock_type) = request.lock_type {
            // serde gives the wire name with quotes; strip them.
            lock_type_json = serde_json::to_string(&lock_type)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            form.push(("metadata[lock_type]", &lock_type_json));
        }

        let response = self
            .http
            .post(self.sessions_url())
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, message });
        }

        let session: SessionResponse = response.json().await?;
        let redirect_url = session
            .url
            .ok_or(GatewayError::MalformedResponse("url"))?;

        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let response = self
            .http
            .get(format!("{}/{}", self.sessions_url(), session_id))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, message });
        }

        let session: SessionResponse = response.json().await?;
        let paid = session.payment_status.as_deref() == Some("paid");
        let payment_id = session
            .payment_intent
            .clone()
            .unwrap_or_else(|| session.id.clone());

        Ok(SessionStatus {
            session_id: session.id,
            paid,
            payment_id,
            amount_total_cents: session.amount_total.unwrap_or(0),
        })
    }
}
