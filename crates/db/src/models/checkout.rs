//! Pending checkout models: the server-side record of an in-flight payment
//! session, claimed exactly once by reconciliation.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::FromRow;

use leadlot_core::locking::LockTypeId;
use leadlot_core::types::{DbId, Timestamp};

/// A row from the `pending_checkouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingCheckout {
    pub id: DbId,
    pub session_id: String,
    pub dealer_id: DbId,
    /// JSON array of lead ids in the cart.
    pub lead_ids: serde_json::Value,
    /// JSON object mapping lead id (as string) to charged cents.
    pub lead_prices: serde_json::Value,
    pub lock_type_id: Option<LockTypeId>,
    pub discount_applied: bool,
    pub discount_type: Option<String>,
    pub discount_amount_cents: Option<i64>,
    /// Gateway payment reference, recorded when the session is claimed.
    pub payment_id: Option<String>,
    pub consumed_at: Option<Timestamp>,
    pub failed_lead_ids: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PendingCheckout {
    /// Decode the lead id array. Malformed entries are skipped.
    pub fn lead_id_list(&self) -> Vec<DbId> {
        self.lead_ids
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default()
    }

    /// Decode the per-lead price map.
    pub fn lead_price_map(&self) -> HashMap<DbId, i64> {
        self.lead_prices
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_i64()?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decode the failed lead id array, empty when none recorded.
    pub fn failed_lead_list(&self) -> Vec<DbId> {
        self.failed_lead_ids
            .as_ref()
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default()
    }
}

/// Insert payload for a pending checkout, written when the gateway session
/// is created.
#[derive(Debug, Clone)]
pub struct NewPendingCheckout {
    pub session_id: String,
    pub dealer_id: DbId,
    pub lead_ids: Vec<DbId>,
    pub lead_prices: HashMap<DbId, i64>,
    pub lock_type_id: Option<LockTypeId>,
    pub discount_applied: bool,
    pub discount_type: Option<String>,
    pub discount_amount_cents: Option<i64>,
}
