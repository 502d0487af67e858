//! Handler for the dealer dashboard listing.
//!
//! Joins lead, lock, and purchase state, derives the per-item price and
//! lock status, applies the dealer's visibility filters, and returns the
//! pre-purchase view (no contact fields).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use leadlot_core::locking::{LockStatus, LockType};
use leadlot_core::pricing::{price_cents, PricingSettings};
use leadlot_core::types::{DbId, Timestamp};
use leadlot_core::visibility::{passes_filters, DashboardFilters, LeadVisibility};
use leadlot_db::models::dashboard::DashboardRow;
use leadlot_db::models::lead::{LeadStatus, LeadStatusId};
use leadlot_db::repositories::{DashboardRepo, SettingsRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthDealer;
use crate::response::DataResponse;
use crate::state::AppState;

/// One dashboard entry: the dealer-visible slice of a lead plus derived
/// lock, purchase, and pricing state.
#[derive(Debug, Serialize)]
pub struct ApplicationItem {
    pub id: DbId,
    pub full_name: String,
    pub city: Option<String>,
    pub vehicle_type: Option<String>,
    pub status: Option<LeadStatus>,
    pub submission_date: Timestamp,
    pub lock_info: LockStatus,
    pub is_purchased: bool,
    /// Alias of `is_purchased`: purchased leads are downloadable.
    pub is_downloaded: bool,
    pub price_cents: i64,
    pub is_age_discounted: bool,
}

/// GET /api/v1/dealer/leads
///
/// List available leads for the requesting dealer, newest first. Filters
/// (`hide_purchased`, `hide_locked`, `hide_older_than_90_days`) are
/// independently togglable query parameters.
pub async fn list_leads(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Query(filters): Query<DashboardFilters>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;
    let pricing = settings.pricing();
    let rows = DashboardRepo::list_available(&state.pool, dealer.dealer_id).await?;
    let now = Utc::now();

    let items: Vec<ApplicationItem> = rows
        .into_iter()
        .filter_map(|row| {
            let item = build_item(&row, dealer.dealer_id, now, &pricing);
            let visibility = LeadVisibility {
                is_purchased: item.is_purchased,
                locked_by_other: item.lock_info.blocked_for_requester(),
                age_days: (now - row.submitted_at).num_days(),
            };
            passes_filters(&visibility, &filters).then_some(item)
        })
        .collect();

    tracing::debug!(
        dealer_id = dealer.dealer_id,
        count = items.len(),
        "Dashboard listing served",
    );

    Ok(Json(DataResponse { data: items }))
}

/// Derive one dashboard item from a join row.
fn build_item(
    row: &DashboardRow,
    dealer_id: DbId,
    now: Timestamp,
    pricing: &PricingSettings,
) -> ApplicationItem {
    let lock_info = lock_status_from_row(row, dealer_id);

    // A lead is contested only while another dealer holds a live temporary
    // hold; permanent and post-purchase locks do not discount it.
    let contested = lock_info.blocked_for_requester()
        && lock_info
            .lock_type
            .is_some_and(LockType::contests_pricing);

    let age_days = (now - row.submitted_at).num_days();
    let is_age_discounted =
        pricing.age_discount_enabled && age_days >= pricing.age_discount_threshold_days;

    ApplicationItem {
        id: row.id,
        full_name: row.full_name.clone(),
        city: row.city.clone(),
        vehicle_type: row.vehicle_type.clone(),
        status: decode_status(row.status_id),
        submission_date: row.submitted_at,
        lock_info,
        is_purchased: row.is_purchased,
        is_downloaded: row.is_purchased,
        price_cents: price_cents(age_days, contested, pricing),
        is_age_discounted,
    }
}

fn decode_status(status_id: LeadStatusId) -> Option<LeadStatus> {
    LeadStatus::from_id(status_id)
}

/// Derive the requester-relative lock status from the join columns.
fn lock_status_from_row(row: &DashboardRow, requester: DbId) -> LockStatus {
    match (row.lock_dealer_id, row.lock_type_id) {
        (Some(holder), Some(type_id)) => match LockType::from_id(type_id) {
            Some(lock_type) => LockStatus::from_active_lock(
                holder,
                lock_type,
                row.lock_expires_at,
                requester,
            ),
            None => {
                tracing::warn!(lead_id = row.id, type_id, "Unknown lock type id in store");
                LockStatus::unlocked()
            }
        },
        _ => LockStatus::unlocked(),
    }
}
