//! Lock entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use leadlot_core::locking::{LockType, LockTypeId};
use leadlot_core::types::{DbId, Timestamp};

/// A row from the `lead_locks` table.
///
/// `expires_at` NULL means permanent. Rows are never deleted; release and
/// forced expiry set `expires_at` to the current time, so history stays
/// queryable.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadLock {
    pub id: DbId,
    pub lead_id: DbId,
    pub dealer_id: DbId,
    pub lock_type_id: LockTypeId,
    pub locked_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub is_paid: bool,
    pub payment_id: Option<String>,
    pub payment_amount_cents: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LeadLock {
    /// Decode the SMALLINT lock type code.
    pub fn lock_type(&self) -> Option<LockType> {
        LockType::from_id(self.lock_type_id)
    }
}

/// DTO for `POST /dealer/leads/{id}/lock`.
#[derive(Debug, Deserialize)]
pub struct AcquireLockRequest {
    pub lock_type: LockType,
    /// Completed payment reference; required for paid lock types.
    pub payment_id: Option<String>,
    pub payment_amount_cents: Option<i64>,
}
