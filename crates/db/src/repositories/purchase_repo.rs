//! Repository for the `purchases` table.
//!
//! Purchase rows are written only by reconciliation. The partial unique
//! index `uq_purchases_lead_dealer_active` makes the insert idempotent at
//! the database level: a duplicate webhook delivery hits `ON CONFLICT DO
//! NOTHING` and changes nothing.

use sqlx::PgPool;

use leadlot_core::types::DbId;

use crate::models::purchase::{NewPurchase, Purchase};

/// Column list for `purchases` queries.
const COLUMNS: &str = "\
    id, lead_id, dealer_id, payment_id, payment_amount_cents, purchase_date, \
    downloaded_at, download_count, is_active, discount_applied, discount_type, \
    discount_amount_cents, checkout_session_id, created_at, updated_at";

/// Provides operations on dealer purchases.
pub struct PurchaseRepo;

impl PurchaseRepo {
    /// Insert a purchase row, idempotently.
    ///
    /// Returns `Some(row)` when a new purchase was recorded, `None` when an
    /// active purchase for this (lead, dealer) already existed and the
    /// insert was a no-op.
    pub async fn insert(
        pool: &PgPool,
        input: &NewPurchase,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        let query = format!(
            "INSERT INTO purchases \
                 (lead_id, dealer_id, payment_id, payment_amount_cents, \
                  discount_applied, discount_type, discount_amount_cents, \
                  checkout_session_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (lead_id, dealer_id) WHERE is_active DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(input.lead_id)
            .bind(input.dealer_id)
            .bind(&input.payment_id)
            .bind(input.payment_amount_cents)
            .bind(input.discount_applied)
            .bind(input.discount_type.as_deref())
            .bind(input.discount_amount_cents)
            .bind(input.checkout_session_id.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Whether the dealer holds an active purchase of the lead.
    pub async fn exists_active(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM purchases \
                 WHERE lead_id = $1 AND dealer_id = $2 AND is_active \
             )",
        )
        .bind(lead_id)
        .bind(dealer_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// List the dealer's active purchases, most recent first.
    pub async fn list_for_dealer(
        pool: &PgPool,
        dealer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Purchase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM purchases \
             WHERE dealer_id = $1 AND is_active \
             ORDER BY purchase_date DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(dealer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Ids of all leads the dealer has actively purchased.
    pub async fn purchased_lead_ids(
        pool: &PgPool,
        dealer_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT lead_id FROM purchases \
             WHERE dealer_id = $1 AND is_active \
             ORDER BY lead_id",
        )
        .bind(dealer_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Record a download of a purchased lead: stamps the first
    /// `downloaded_at` and increments the counter.
    ///
    /// Returns the updated row, or `None` when no active purchase exists
    /// (the caller must treat that as a gating failure, not create one).
    pub async fn mark_downloaded(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        let query = format!(
            "UPDATE purchases \
             SET downloaded_at = COALESCE(downloaded_at, NOW()), \
                 download_count = download_count + 1, \
                 updated_at = NOW() \
             WHERE lead_id = $1 AND dealer_id = $2 AND is_active \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(lead_id)
            .bind(dealer_id)
            .fetch_optional(pool)
            .await
    }
}
