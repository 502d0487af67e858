//! Repository for the `pending_checkouts` table.
//!
//! A pending checkout is written when the gateway session is created and
//! claimed exactly once by reconciliation. The claim is a conditional
//! UPDATE, so the webhook and the client-side completion fallback can race
//! safely: one wins the row, the other sees `None` and treats the session
//! as already reconciled.

use sqlx::PgPool;

use leadlot_core::types::DbId;

use crate::models::checkout::{NewPendingCheckout, PendingCheckout};

/// Column list for `pending_checkouts` queries.
const COLUMNS: &str = "\
    id, session_id, dealer_id, lead_ids, lead_prices, lock_type_id, \
    discount_applied, discount_type, discount_amount_cents, payment_id, \
    consumed_at, failed_lead_ids, created_at, updated_at";

/// Provides operations on pending checkouts.
pub struct CheckoutRepo;

impl CheckoutRepo {
    /// Record a newly created gateway session.
    pub async fn create(
        pool: &PgPool,
        input: &NewPendingCheckout,
    ) -> Result<PendingCheckout, sqlx::Error> {
        let lead_ids = serde_json::json!(input.lead_ids);
        let lead_prices: serde_json::Value = input
            .lead_prices
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect::<serde_json::Map<_, _>>()
            .into();

        let query = format!(
            "INSERT INTO pending_checkouts \
                 (session_id, dealer_id, lead_ids, lead_prices, lock_type_id, \
                  discount_applied, discount_type, discount_amount_cents) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PendingCheckout>(&query)
            .bind(&input.session_id)
            .bind(input.dealer_id)
            .bind(lead_ids)
            .bind(lead_prices)
            .bind(input.lock_type_id)
            .bind(input.discount_applied)
            .bind(input.discount_type.as_deref())
            .bind(input.discount_amount_cents)
            .fetch_one(pool)
            .await
    }

    /// Claim the pending checkout for reconciliation, recording the gateway
    /// payment reference for later replay.
    ///
    /// Returns the row exactly once per session; a second claim (duplicate
    /// webhook, completion fallback after the webhook) returns `None`.
    pub async fn claim(
        pool: &PgPool,
        session_id: &str,
        payment_id: Option<&str>,
    ) -> Result<Option<PendingCheckout>, sqlx::Error> {
        let query = format!(
            "UPDATE pending_checkouts \
             SET consumed_at = NOW(), \
                 payment_id = COALESCE($2, payment_id), \
                 updated_at = NOW() \
             WHERE session_id = $1 AND consumed_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PendingCheckout>(&query)
            .bind(session_id)
            .bind(payment_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a pending checkout without claiming it.
    pub async fn find_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<PendingCheckout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pending_checkouts WHERE session_id = $1");
        sqlx::query_as::<_, PendingCheckout>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the leads whose reconciliation failed, for the background
    /// sweep to retry. Pass an empty slice to clear the marker.
    pub async fn record_failed_leads(
        pool: &PgPool,
        id: DbId,
        failed: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let value = if failed.is_empty() {
            None
        } else {
            Some(serde_json::json!(failed))
        };
        sqlx::query(
            "UPDATE pending_checkouts \
             SET failed_lead_ids = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Consumed checkouts with recorded per-lead failures, oldest first.
    pub async fn list_with_failures(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PendingCheckout>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pending_checkouts \
             WHERE consumed_at IS NOT NULL AND failed_lead_ids IS NOT NULL \
             ORDER BY updated_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, PendingCheckout>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
