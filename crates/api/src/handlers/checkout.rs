//! Handlers for the checkout flow: session creation and the client-side
//! completion fallback.
//!
//! Session creation prices every lead server-side and records a pending
//! checkout before handing the browser to the gateway. No purchase or lock
//! row is written here: an abandoned session leaves nothing behind but an
//! unclaimed pending row.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use leadlot_core::locking::LockType;
use leadlot_core::pricing::price_cents;
use leadlot_core::types::DbId;
use leadlot_db::models::checkout::NewPendingCheckout;
use leadlot_db::repositories::{CheckoutRepo, LeadRepo, LockRepo, PurchaseRepo, SettingsRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDealer;
use crate::payments::gateway::CheckoutSessionRequest;
use crate::reconcile::{self, CompletedSession};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum leads per checkout session.
const MAX_CHECKOUT_LEADS: usize = 50;

// ---------------------------------------------------------------------------
// Create session
// ---------------------------------------------------------------------------

/// DTO for `POST /dealer/checkout`.
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub lead_ids: Vec<DbId>,
    /// Present when paying for a lock instead of a purchase.
    pub lock_type: Option<LockType>,
}

/// Response for a created checkout session.
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub session_id: String,
    pub redirect_url: String,
    pub total_cents: i64,
    pub lead_count: usize,
}

/// POST /api/v1/dealer/checkout
///
/// Price the cart, open a gateway session, and record the pending
/// checkout. The client-displayed price is never trusted; each lead is
/// re-priced here from current lock state and settings.
pub async fn create_checkout(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Json(input): Json<CreateCheckoutRequest>,
) -> AppResult<impl IntoResponse> {
    let mut lead_ids = input.lead_ids;
    lead_ids.sort_unstable();
    lead_ids.dedup();

    if lead_ids.is_empty() {
        return Err(AppError::BadRequest("lead_ids must not be empty".into()));
    }
    if lead_ids.len() > MAX_CHECKOUT_LEADS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_CHECKOUT_LEADS} leads per checkout"
        )));
    }
    if input.lock_type == Some(LockType::PurchaseLock) {
        return Err(AppError::BadRequest(
            "purchase_lock cannot be bought directly".into(),
        ));
    }

    let settings = SettingsRepo::get(&state.pool).await?;
    let pricing = settings.pricing();
    let now = Utc::now();

    let leads = LeadRepo::find_by_ids(&state.pool, &lead_ids).await?;
    if leads.len() != lead_ids.len() {
        return Err(AppError::BadRequest(
            "One or more leads do not exist".into(),
        ));
    }

    // Price each lead individually; a mixed cart records per-lead amounts.
    let mut lead_prices: HashMap<DbId, i64> = HashMap::new();
    let mut total_cents: i64 = 0;
    let mut any_discounted = false;
    let mut any_age_discounted = false;

    for lead in &leads {
        if input.lock_type.is_none()
            && PurchaseRepo::exists_active(&state.pool, lead.id, dealer.dealer_id).await?
        {
            return Err(AppError::Core(leadlot_core::error::CoreError::Conflict(
                format!("Lead {} is already purchased", lead.id),
            )));
        }

        let contested = match LockRepo::latest_active(&state.pool, lead.id).await? {
            Some(lock) => {
                lock.dealer_id != dealer.dealer_id
                    && lock.lock_type().is_some_and(LockType::contests_pricing)
            }
            None => false,
        };

        let age_days = (now - lead.submitted_at).num_days();
        let cents = price_cents(age_days, contested, &pricing);
        if cents < pricing.standard_price_cents {
            any_discounted = true;
            if pricing.age_discount_enabled && age_days >= pricing.age_discount_threshold_days {
                any_age_discounted = true;
            }
        }
        total_cents += cents;
        lead_prices.insert(lead.id, cents);
    }

    let description = match input.lock_type {
        Some(lock_type) => format!(
            "Lead lock ({}) for {} lead(s)",
            lock_type.label(),
            lead_ids.len()
        ),
        None => format!("Lead access for {} lead(s)", lead_ids.len()),
    };

    let session = state
        .gateway
        .create_checkout_session(&CheckoutSessionRequest {
            dealer_id: dealer.dealer_id,
            lead_ids: lead_ids.clone(),
            amount_cents: total_cents,
            description,
            lock_type: input.lock_type,
        })
        .await
        .map_err(|e| AppError::PaymentSetup(e.to_string()))?;

    let discount_type = if any_age_discounted {
        Some("age".to_string())
    } else if any_discounted {
        Some("contested".to_string())
    } else {
        None
    };
    let discount_amount_cents = if any_discounted {
        Some(pricing.standard_price_cents * lead_ids.len() as i64 - total_cents)
    } else {
        None
    };

    CheckoutRepo::create(
        &state.pool,
        &NewPendingCheckout {
            session_id: session.session_id.clone(),
            dealer_id: dealer.dealer_id,
            lead_ids: lead_ids.clone(),
            lead_prices,
            lock_type_id: input.lock_type.map(LockType::id),
            discount_applied: any_discounted,
            discount_type,
            discount_amount_cents,
        },
    )
    .await?;

    tracing::info!(
        dealer_id = dealer.dealer_id,
        session_id = %session.session_id,
        lead_count = lead_ids.len(),
        total_cents,
        lock_type = ?input.lock_type,
        "Checkout session created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateCheckoutResponse {
                session_id: session.session_id,
                redirect_url: session.redirect_url,
                total_cents,
                lead_count: lead_ids.len(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Complete (client-side fallback)
// ---------------------------------------------------------------------------

/// DTO for `POST /dealer/checkout/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteCheckoutRequest {
    pub session_id: String,
}

/// Response summarizing a completion attempt.
#[derive(Debug, Serialize)]
pub struct CompleteCheckoutResponse {
    pub session_id: String,
    /// True when this call performed the reconciliation; false when the
    /// webhook (or an earlier call) had already claimed the session.
    pub reconciled_now: bool,
    pub purchased: Vec<DbId>,
    pub locked: Vec<DbId>,
    pub failed: Vec<DbId>,
}

/// POST /api/v1/dealer/checkout/complete
///
/// Client-side confirmation path for when the user returns from the
/// gateway before the webhook lands. Verifies payment state with the
/// gateway, then claims and reconciles the pending checkout. Racing the
/// webhook is safe: whoever claims the row first does the work.
pub async fn complete_checkout(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Json(input): Json<CompleteCheckoutRequest>,
) -> AppResult<impl IntoResponse> {
    let status = state
        .gateway
        .retrieve_session(&input.session_id)
        .await
        .map_err(|e| AppError::PaymentSetup(e.to_string()))?;

    if !status.paid {
        return Err(AppError::BadRequest(
            "Payment for this session has not completed".into(),
        ));
    }

    // Ownership check happens before the claim so a foreign caller cannot
    // consume someone else's session.
    let known = CheckoutRepo::find_by_session(&state.pool, &input.session_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown checkout session".into()))?;
    if known.dealer_id != dealer.dealer_id {
        return Err(AppError::Core(leadlot_core::error::CoreError::Forbidden(
            "Session belongs to another dealer".into(),
        )));
    }

    let pending =
        CheckoutRepo::claim(&state.pool, &input.session_id, Some(&status.payment_id)).await?;

    let Some(pending) = pending else {
        // The webhook (or an earlier call) already reconciled this session.
        return Ok(Json(DataResponse {
            data: CompleteCheckoutResponse {
                session_id: input.session_id,
                reconciled_now: false,
                purchased: vec![],
                locked: vec![],
                failed: vec![],
            },
        }));
    };

    let session = CompletedSession::from_pending(&pending, &status.payment_id);
    let outcome = reconcile::process_and_record(&state.pool, pending.id, &session).await;

    Ok(Json(DataResponse {
        data: CompleteCheckoutResponse {
            session_id: session.session_id,
            reconciled_now: true,
            purchased: outcome.purchased,
            locked: outcome.locked,
            failed: outcome.failed,
        },
    }))
}
