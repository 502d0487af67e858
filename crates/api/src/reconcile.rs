//! Payment reconciliation: converts a confirmed checkout session into
//! durable purchase and lock state.
//!
//! Invoked from the webhook, from the client-side completion fallback, and
//! from the background sweep. Delivery is at-least-once, so every step is
//! idempotent: the purchase insert is a conditional no-op on redelivery and
//! the lock step checks for an existing hold first.
//!
//! Each lead is processed independently. A failure on one lead is logged
//! with full replay context (lead, dealer, payment) and recorded for the
//! sweep; it never aborts the remaining leads and never fails the webhook
//! acknowledgment.

use std::collections::HashMap;

use chrono::Utc;

use leadlot_core::locking::LockType;
use leadlot_core::types::DbId;
use leadlot_db::models::checkout::PendingCheckout;
use leadlot_db::models::purchase::NewPurchase;
use leadlot_db::repositories::{AcquireOutcome, CheckoutRepo, LockRepo, PurchaseRepo};
use leadlot_db::DbPool;

/// A confirmed payment session, normalized from either the pending-checkout
/// record or raw event metadata.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub session_id: String,
    pub payment_id: String,
    pub dealer_id: DbId,
    pub lead_ids: Vec<DbId>,
    /// Charged amount per lead, in cents.
    pub lead_prices: HashMap<DbId, i64>,
    /// Present when the dealer paid for a lock rather than a purchase.
    pub pending_lock_type: Option<LockType>,
    pub discount_applied: bool,
    pub discount_type: Option<String>,
    pub discount_amount_cents: Option<i64>,
}

impl CompletedSession {
    /// Build from a claimed pending-checkout row plus the payment reference
    /// reported by the gateway.
    pub fn from_pending(pending: &PendingCheckout, payment_id: &str) -> Self {
        Self {
            session_id: pending.session_id.clone(),
            payment_id: payment_id.to_string(),
            dealer_id: pending.dealer_id,
            lead_ids: pending.lead_id_list(),
            lead_prices: pending.lead_price_map(),
            pending_lock_type: pending.lock_type_id.and_then(LockType::from_id),
            discount_applied: pending.discount_applied,
            discount_type: pending.discount_type.clone(),
            discount_amount_cents: pending.discount_amount_cents,
        }
    }
}

/// What happened to each lead in a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Purchases recorded for the first time.
    pub purchased: Vec<DbId>,
    /// Leads already purchased by this dealer (duplicate delivery).
    pub already_purchased: Vec<DbId>,
    /// Paid locks applied (lock-purchase sessions).
    pub locked: Vec<DbId>,
    /// Leads whose processing failed and needs the sweep.
    pub failed: Vec<DbId>,
}

/// Per-lead result, folded into [`ReconcileOutcome`].
enum LeadOutcome {
    Purchased,
    AlreadyPurchased,
    Locked,
}

/// Per-lead failure modes.
#[derive(Debug, thiserror::Error)]
enum ReconcileError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    /// A paid lock could not be applied because another dealer holds an
    /// active lock. Retried by the sweep once that lock expires.
    #[error("paid lock blocked by a competing active lock")]
    LockConflict,
}

/// Process every lead in a completed session.
///
/// Never returns an error: per-lead failures are logged and collected in
/// the outcome so the caller can record them for the sweep.
pub async fn process_completed_session(
    pool: &DbPool,
    session: &CompletedSession,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for &lead_id in &session.lead_ids {
        match reconcile_lead(pool, session, lead_id).await {
            Ok(LeadOutcome::Purchased) => outcome.purchased.push(lead_id),
            Ok(LeadOutcome::AlreadyPurchased) => outcome.already_purchased.push(lead_id),
            Ok(LeadOutcome::Locked) => outcome.locked.push(lead_id),
            Err(error) => {
                tracing::error!(
                    lead_id,
                    dealer_id = session.dealer_id,
                    payment_id = %session.payment_id,
                    session_id = %session.session_id,
                    %error,
                    "Reconciliation failed for lead",
                );
                outcome.failed.push(lead_id);
            }
        }
    }

    tracing::info!(
        session_id = %session.session_id,
        dealer_id = session.dealer_id,
        purchased = outcome.purchased.len(),
        already_purchased = outcome.already_purchased.len(),
        locked = outcome.locked.len(),
        failed = outcome.failed.len(),
        "Reconciliation pass complete",
    );

    outcome
}

/// Process a completed session and record any per-lead failures on the
/// pending-checkout row for the background sweep.
pub async fn process_and_record(
    pool: &DbPool,
    pending_id: DbId,
    session: &CompletedSession,
) -> ReconcileOutcome {
    let outcome = process_completed_session(pool, session).await;
    if let Err(error) = CheckoutRepo::record_failed_leads(pool, pending_id, &outcome.failed).await {
        // The failed leads are already in the log above; losing the sweep
        // marker only means manual replay instead of automatic.
        tracing::error!(pending_id, %error, "Failed to record reconciliation failures");
    }
    outcome
}

/// Run the reconciliation sequence for one lead.
async fn reconcile_lead(
    pool: &DbPool,
    session: &CompletedSession,
    lead_id: DbId,
) -> Result<LeadOutcome, ReconcileError> {
    // Lock-purchase sessions create the paid lock and nothing else.
    if let Some(lock_type) = session.pending_lock_type {
        return apply_paid_lock(pool, session, lead_id, lock_type).await;
    }

    let amount_cents = match session.lead_prices.get(&lead_id) {
        Some(&cents) => cents,
        None => {
            tracing::warn!(
                lead_id,
                session_id = %session.session_id,
                "Lead missing from session price map; recording zero amount",
            );
            0
        }
    };

    // Idempotency: a prior delivery may have inserted the purchase already.
    // The lock steps below still run so a half-applied delivery converges.
    let inserted = PurchaseRepo::insert(
        pool,
        &NewPurchase {
            lead_id,
            dealer_id: session.dealer_id,
            payment_id: session.payment_id.clone(),
            payment_amount_cents: amount_cents,
            discount_applied: session.discount_applied,
            discount_type: session.discount_type.clone(),
            discount_amount_cents: session.discount_amount_cents,
            checkout_session_id: Some(session.session_id.clone()),
        },
    )
    .await?;

    // A completed purchase revokes competing exclusivity claims.
    let expired = LockRepo::expire_competing(pool, lead_id, session.dealer_id).await?;
    if expired > 0 {
        tracing::info!(
            lead_id,
            dealer_id = session.dealer_id,
            expired,
            "Expired competing locks after purchase",
        );
    }

    // Grant the buyer the post-purchase grace lock, unless they already
    // hold a live one.
    if !LockRepo::has_active_by_dealer(pool, lead_id, session.dealer_id).await? {
        let expires = LockType::PurchaseLock.expiry_from(Utc::now());
        let acquired = LockRepo::acquire(
            pool,
            lead_id,
            session.dealer_id,
            LockType::PurchaseLock,
            expires,
            true,
            Some(&session.payment_id),
            Some(0), // the grace lock itself carries no charge
        )
        .await?;
        if matches!(acquired, AcquireOutcome::Conflict) {
            // Can only happen if another dealer slipped a lock in between
            // the forced expiry and this insert. The purchase itself
            // stands; the grace lock is best-effort.
            tracing::warn!(
                lead_id,
                dealer_id = session.dealer_id,
                "Post-purchase lock lost a race; purchase recorded without grace lock",
            );
        }
    }

    Ok(match inserted {
        Some(_) => LeadOutcome::Purchased,
        None => LeadOutcome::AlreadyPurchased,
    })
}

/// Apply the lock a dealer paid for in a lock-purchase session.
async fn apply_paid_lock(
    pool: &DbPool,
    session: &CompletedSession,
    lead_id: DbId,
    lock_type: LockType,
) -> Result<LeadOutcome, ReconcileError> {
    let amount_cents = session.lead_prices.get(&lead_id).copied().unwrap_or(0);
    let expires = lock_type.expiry_from(Utc::now());

    let outcome = LockRepo::acquire(
        pool,
        lead_id,
        session.dealer_id,
        lock_type,
        expires,
        true,
        Some(&session.payment_id),
        Some(amount_cents),
    )
    .await?;

    match outcome {
        AcquireOutcome::Acquired(_) | AcquireOutcome::Extended(_) => Ok(LeadOutcome::Locked),
        // The dealer paid but another dealer locked the lead first. The
        // sweep retries once the competing lock expires; manual
        // reconciliation covers refunds.
        AcquireOutcome::Conflict => Err(ReconcileError::LockConflict),
    }
}
