//! Read path for the dealer dashboard.
//!
//! One query joins `leads` with the latest active lock per lead (LATERAL)
//! and the requesting dealer's active purchase. Visibility filtering and
//! pricing happen above this layer on the returned rows; the repository
//! only guarantees the stable most-recent-first ordering.

use sqlx::PgPool;

use leadlot_core::types::DbId;

use crate::models::dashboard::DashboardRow;
use crate::models::lead::LeadStatus;

/// Provides the dashboard listing query.
pub struct DashboardRepo;

impl DashboardRepo {
    /// All dealer-visible leads (drafts excluded) with lock and purchase
    /// state relative to `dealer_id`, newest submission first. The
    /// secondary `id` sort keeps the ordering stable across equal
    /// timestamps.
    pub async fn list_available(
        pool: &PgPool,
        dealer_id: DbId,
    ) -> Result<Vec<DashboardRow>, sqlx::Error> {
        sqlx::query_as::<_, DashboardRow>(
            "SELECT l.id, l.full_name, l.city, l.vehicle_type, l.status_id, \
                    l.submitted_at, \
                    al.dealer_id AS lock_dealer_id, \
                    al.lock_type_id AS lock_type_id, \
                    al.expires_at AS lock_expires_at, \
                    (p.id IS NOT NULL) AS is_purchased \
             FROM leads l \
             LEFT JOIN LATERAL ( \
                 SELECT dealer_id, lock_type_id, expires_at \
                 FROM lead_locks \
                 WHERE lead_id = l.id \
                   AND (expires_at IS NULL OR expires_at > NOW()) \
                 ORDER BY locked_at DESC, id DESC \
                 LIMIT 1 \
             ) al ON TRUE \
             LEFT JOIN purchases p \
                 ON p.lead_id = l.id AND p.dealer_id = $1 AND p.is_active \
             WHERE l.status_id <> $2 \
             ORDER BY l.submitted_at DESC, l.id DESC",
        )
        .bind(dealer_id)
        .bind(LeadStatus::Draft.id())
        .fetch_all(pool)
        .await
    }
}
