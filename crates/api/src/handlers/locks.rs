//! Handlers for lead lock operations: status, acquire, release.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use leadlot_core::error::CoreError;
use leadlot_core::locking::{LockStatus, LockType};
use leadlot_core::types::DbId;
use leadlot_db::repositories::{AcquireOutcome, LeadRepo, LockRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDealer;
use crate::response::DataResponse;
use crate::state::AppState;

use leadlot_db::models::lock::AcquireLockRequest;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/dealer/leads/{id}/lock
///
/// The requester-relative lock state of a lead. `is_own_lock` tells the
/// client whether the lead is "mine" or blocked by someone else.
pub async fn lock_status(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Path(lead_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_lead_exists(&state, lead_id).await?;

    let status = match LockRepo::latest_active(&state.pool, lead_id).await? {
        Some(lock) => match lock.lock_type() {
            Some(lock_type) => LockStatus::from_active_lock(
                lock.dealer_id,
                lock_type,
                lock.expires_at,
                dealer.dealer_id,
            ),
            None => LockStatus::unlocked(),
        },
        None => LockStatus::unlocked(),
    };

    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Acquire
// ---------------------------------------------------------------------------

/// POST /api/v1/dealer/leads/{id}/lock
///
/// Acquire (or idempotently extend) a lock. Paid lock types require a
/// completed payment reference; the store never charges anyone itself.
/// Returns 201 for a new lock, 200 for an extension, 409 `ALREADY_LOCKED`
/// when another dealer holds the lead.
pub async fn acquire_lock(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Path(lead_id): Path<DbId>,
    Json(input): Json<AcquireLockRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_lead_exists(&state, lead_id).await?;

    if input.lock_type == LockType::PurchaseLock {
        return Err(AppError::BadRequest(
            "purchase_lock is applied by payment reconciliation, not directly".into(),
        ));
    }
    if input.lock_type.requires_payment() && input.payment_id.is_none() {
        return Err(AppError::BadRequest(format!(
            "Lock type {:?} requires a completed payment reference",
            input.lock_type
        )));
    }

    let expires_at = input.lock_type.expiry_from(Utc::now());
    let outcome = LockRepo::acquire(
        &state.pool,
        lead_id,
        dealer.dealer_id,
        input.lock_type,
        expires_at,
        input.payment_id.is_some(),
        input.payment_id.as_deref(),
        input.payment_amount_cents,
    )
    .await?;

    match outcome {
        AcquireOutcome::Acquired(lock) => {
            tracing::info!(
                lead_id,
                dealer_id = dealer.dealer_id,
                lock_id = lock.id,
                lock_type = ?input.lock_type,
                "Lock acquired",
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: lock })))
        }
        AcquireOutcome::Extended(lock) => {
            tracing::info!(
                lead_id,
                dealer_id = dealer.dealer_id,
                lock_id = lock.id,
                "Lock extended",
            );
            Ok((StatusCode::OK, Json(DataResponse { data: lock })))
        }
        AcquireOutcome::Conflict => Err(AppError::Core(CoreError::AlreadyLocked { lead_id })),
    }
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// DELETE /api/v1/dealer/leads/{id}/lock
///
/// Release the caller's own active lock early. Only the holder can; the
/// lock is logically expired, not deleted.
pub async fn release_lock(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Path(lead_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_lead_exists(&state, lead_id).await?;

    let released = LockRepo::release(&state.pool, lead_id, dealer.dealer_id).await?;
    if !released {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Lock",
            id: lead_id,
        }));
    }

    tracing::info!(lead_id, dealer_id = dealer.dealer_id, "Lock released");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_lead_exists(state: &AppState, lead_id: DbId) -> AppResult<()> {
    LeadRepo::find_by_id(&state.pool, lead_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lead",
            id: lead_id,
        }))?;
    Ok(())
}
