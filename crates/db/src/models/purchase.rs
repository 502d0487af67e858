//! Purchase entity models and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use leadlot_core::types::{DbId, Timestamp};

/// A row from the `purchases` table: permanent proof of access for one
/// (lead, dealer) pair. Written only by reconciliation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Purchase {
    pub id: DbId,
    pub lead_id: DbId,
    pub dealer_id: DbId,
    pub payment_id: String,
    pub payment_amount_cents: i64,
    pub purchase_date: Timestamp,
    pub downloaded_at: Option<Timestamp>,
    pub download_count: i32,
    pub is_active: bool,
    pub discount_applied: bool,
    pub discount_type: Option<String>,
    pub discount_amount_cents: Option<i64>,
    pub checkout_session_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a purchase row, assembled by reconciliation from the
/// completed payment session.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub lead_id: DbId,
    pub dealer_id: DbId,
    pub payment_id: String,
    pub payment_amount_cents: i64,
    pub discount_applied: bool,
    pub discount_type: Option<String>,
    pub discount_amount_cents: Option<i64>,
    pub checkout_session_id: Option<String>,
}
