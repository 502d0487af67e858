//! Repository for the `lead_locks` table.
//!
//! Exclusivity is not enforced by a table constraint: whether a lead is
//! locked is computed from the most recent non-expired row. What the
//! repository does guarantee is serialization of acquisition per lead:
//! `acquire` takes the lead's row lock (`SELECT ... FOR UPDATE`) for the
//! duration of its check-and-insert transaction, so two dealers racing for
//! the same lead cannot both win.

use sqlx::PgPool;

use leadlot_core::locking::LockType;
use leadlot_core::types::{DbId, Timestamp};

use crate::models::lock::LeadLock;

/// Column list for `lead_locks` queries.
const COLUMNS: &str = "\
    id, lead_id, dealer_id, lock_type_id, locked_at, expires_at, \
    is_paid, payment_id, payment_amount_cents, created_at, updated_at";

/// Result of a lock acquisition attempt.
#[derive(Debug)]
pub enum AcquireOutcome {
    /// A new lock row was inserted.
    Acquired(LeadLock),
    /// The dealer already held an active lock; its expiry was extended to
    /// the later of the existing and requested expiry (idempotent re-lock).
    Extended(LeadLock),
    /// Another dealer holds an active lock.
    Conflict,
}

/// Provides operations on lead locks.
pub struct LockRepo;

impl LockRepo {
    /// Attempt to acquire a lock on `lead_id` for `dealer_id`.
    ///
    /// Runs in one transaction that first takes the lead's row lock
    /// (`SELECT ... FOR UPDATE`), serializing concurrent acquisitions of
    /// the same lead. Then:
    ///
    /// 1. If the dealer already holds an active lock, extend it: the new
    ///    expiry is the later of existing and requested, and a permanent
    ///    lock on either side stays permanent.
    /// 2. Otherwise insert a new row, conditional on no *other* dealer
    ///    holding an active lock.
    #[allow(clippy::too_many_arguments)]
    pub async fn acquire(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
        lock_type: LockType,
        expires_at: Option<Timestamp>,
        is_paid: bool,
        payment_id: Option<&str>,
        payment_amount_cents: Option<i64>,
    ) -> Result<AcquireOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialize per-lead: competing acquires queue on this row lock
        // until the transaction commits.
        sqlx::query("SELECT id FROM leads WHERE id = $1 FOR UPDATE")
            .bind(lead_id)
            .execute(&mut *tx)
            .await?;

        // Step 1: idempotent re-lock / extend for the holder.
        let extend = format!(
            "UPDATE lead_locks \
             SET expires_at = CASE \
                     WHEN expires_at IS NULL OR $3::timestamptz IS NULL THEN NULL \
                     ELSE GREATEST(expires_at, $3::timestamptz) \
                 END, \
                 updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM lead_locks \
                 WHERE lead_id = $1 AND dealer_id = $2 \
                   AND (expires_at IS NULL OR expires_at > NOW()) \
                 ORDER BY locked_at DESC, id DESC \
                 LIMIT 1 \
             ) \
             RETURNING {COLUMNS}"
        );
        if let Some(lock) = sqlx::query_as::<_, LeadLock>(&extend)
            .bind(lead_id)
            .bind(dealer_id)
            .bind(expires_at)
            .fetch_optional(&mut *tx)
            .await?
        {
            tx.commit().await?;
            return Ok(AcquireOutcome::Extended(lock));
        }

        // Step 2: insert, conditional on no competing active lock.
        let insert = format!(
            "INSERT INTO lead_locks \
                 (lead_id, dealer_id, lock_type_id, expires_at, is_paid, \
                  payment_id, payment_amount_cents) \
             SELECT $1, $2, $3, $4, $5, $6, $7 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM lead_locks \
                 WHERE lead_id = $1 AND dealer_id <> $2 \
                   AND (expires_at IS NULL OR expires_at > NOW()) \
             ) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, LeadLock>(&insert)
            .bind(lead_id)
            .bind(dealer_id)
            .bind(lock_type.id())
            .bind(expires_at)
            .bind(is_paid)
            .bind(payment_id)
            .bind(payment_amount_cents)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(match inserted {
            Some(lock) => AcquireOutcome::Acquired(lock),
            None => AcquireOutcome::Conflict,
        })
    }

    /// Release the dealer's own active lock early by setting its expiry to
    /// now. Logical expiry, not deletion, so the row stays auditable.
    ///
    /// Returns `true` when an active lock was released, `false` when the
    /// dealer held none.
    pub async fn release(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lead_locks \
             SET expires_at = NOW(), updated_at = NOW() \
             WHERE lead_id = $1 AND dealer_id = $2 \
               AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(lead_id)
        .bind(dealer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The most recent active lock on a lead, if any. This is the row that
    /// defines the lead's lock state.
    pub async fn latest_active(
        pool: &PgPool,
        lead_id: DbId,
    ) -> Result<Option<LeadLock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lead_locks \
             WHERE lead_id = $1 \
               AND (expires_at IS NULL OR expires_at > NOW()) \
             ORDER BY locked_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, LeadLock>(&query)
            .bind(lead_id)
            .fetch_optional(pool)
            .await
    }

    /// All active locks on a lead.
    pub async fn find_active(
        pool: &PgPool,
        lead_id: DbId,
    ) -> Result<Vec<LeadLock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lead_locks \
             WHERE lead_id = $1 \
               AND (expires_at IS NULL OR expires_at > NOW()) \
             ORDER BY locked_at DESC, id DESC"
        );
        sqlx::query_as::<_, LeadLock>(&query)
            .bind(lead_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the dealer holds an active lock on the lead.
    pub async fn has_active_by_dealer(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM lead_locks \
                 WHERE lead_id = $1 AND dealer_id = $2 \
                   AND (expires_at IS NULL OR expires_at > NOW()) \
             )",
        )
        .bind(lead_id)
        .bind(dealer_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Forcibly expire every active lock on `lead_id` held by a dealer
    /// other than `dealer_id`. A completed purchase is stronger than any
    /// temporary claim, permanent locks included.
    ///
    /// Returns the number of locks expired.
    pub async fn expire_competing(
        pool: &PgPool,
        lead_id: DbId,
        dealer_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lead_locks \
             SET expires_at = NOW(), updated_at = NOW() \
             WHERE lead_id = $1 AND dealer_id <> $2 \
               AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(lead_id)
        .bind(dealer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
