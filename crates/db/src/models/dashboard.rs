//! Read-model row for the dealer dashboard join.

use sqlx::FromRow;

use leadlot_core::locking::LockTypeId;
use leadlot_core::types::{DbId, Timestamp};

use crate::models::lead::LeadStatusId;

/// One lead joined with its latest active lock and the requesting dealer's
/// purchase state. Contact fields are deliberately absent; this row feeds
/// the pre-purchase listing.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardRow {
    pub id: DbId,
    pub full_name: String,
    pub city: Option<String>,
    pub vehicle_type: Option<String>,
    pub status_id: LeadStatusId,
    pub submitted_at: Timestamp,
    /// Latest active lock, if any.
    pub lock_dealer_id: Option<DbId>,
    pub lock_type_id: Option<LockTypeId>,
    pub lock_expires_at: Option<Timestamp>,
    /// True when the requesting dealer holds an active purchase.
    pub is_purchased: bool,
}
