//! Periodic retry of partially failed reconciliations.
//!
//! The webhook acks 2xx even when individual leads fail, so those leads
//! wait on the pending-checkout row's failure marker. This task replays
//! just the failed leads on an interval until the marker clears. Lock
//! expiry needs no sweeping -- locks expire by timestamp comparison at
//! read time.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use leadlot_db::repositories::CheckoutRepo;

use crate::reconcile::{self, CompletedSession};

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Maximum pending rows retried per tick.
const SWEEP_BATCH: i64 = 20;

/// Run the reconciliation sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("RECONCILE_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(SWEEP_INTERVAL.as_secs());

    tracing::info!(interval_secs, "Reconciliation sweep started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reconciliation sweep stopping");
                break;
            }
            _ = interval.tick() => {
                sweep_once(&pool).await;
            }
        }
    }
}

/// One sweep pass: replay the failed leads of each marked checkout.
async fn sweep_once(pool: &PgPool) {
    let rows = match CheckoutRepo::list_with_failures(pool, SWEEP_BATCH).await {
        Ok(rows) => rows,
        Err(error) => {
            tracing::error!(%error, "Reconciliation sweep: listing failed");
            return;
        }
    };

    if rows.is_empty() {
        tracing::debug!("Reconciliation sweep: nothing to retry");
        return;
    }

    for pending in rows {
        let failed = pending.failed_lead_list();
        let payment_id = pending
            .payment_id
            .clone()
            .unwrap_or_else(|| pending.session_id.clone());

        // Replay only the failed leads; the successful ones are durable.
        let mut session = CompletedSession::from_pending(&pending, &payment_id);
        session.lead_ids = failed;

        tracing::info!(
            session_id = %session.session_id,
            retry_count = session.lead_ids.len(),
            "Reconciliation sweep: retrying failed leads",
        );

        reconcile::process_and_record(pool, pending.id, &session).await;
    }
}
