//! Handlers for purchased leads: listing and the gated contact download.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use leadlot_core::error::CoreError;
use leadlot_core::search::{clamp_limit, clamp_offset};
use leadlot_core::types::DbId;
use leadlot_db::models::lead::Lead;
use leadlot_db::models::purchase::Purchase;
use leadlot_db::repositories::{LeadRepo, PurchaseRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthDealer;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for the purchases listing.
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size for the purchases listing.
const MAX_LIMIT: i64 = 200;

/// A purchase joined with the full lead record, contact fields included.
/// Only ever returned to the purchasing dealer.
#[derive(Debug, Serialize)]
pub struct PurchasedLead {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub lead: Option<Lead>,
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/dealer/purchases
///
/// The dealer's purchased leads with download bookkeeping, newest first.
pub async fn list_purchases(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let purchases =
        PurchaseRepo::list_for_dealer(&state.pool, dealer.dealer_id, limit, offset).await?;

    let lead_ids: Vec<DbId> = purchases.iter().map(|p| p.lead_id).collect();
    let mut leads: HashMap<DbId, Lead> = LeadRepo::find_by_ids(&state.pool, &lead_ids)
        .await?
        .into_iter()
        .map(|lead| (lead.id, lead))
        .collect();

    let items: Vec<PurchasedLead> = purchases
        .into_iter()
        .map(|purchase| {
            let lead = leads.remove(&purchase.lead_id);
            PurchasedLead { purchase, lead }
        })
        .collect();

    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// POST /api/v1/dealer/leads/{id}/download
///
/// Return the full lead record, contact details included, and record the
/// download. Requires an active purchase; there is no way to pay here --
/// payment goes through checkout and reconciliation.
pub async fn download_lead(
    dealer: AuthDealer,
    State(state): State<AppState>,
    Path(lead_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let purchase = PurchaseRepo::mark_downloaded(&state.pool, lead_id, dealer.dealer_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Lead has not been purchased by this dealer".into(),
            ))
        })?;

    let lead = LeadRepo::find_by_id(&state.pool, lead_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lead",
            id: lead_id,
        }))?;

    tracing::info!(
        lead_id,
        dealer_id = dealer.dealer_id,
        download_count = purchase.download_count,
        "Lead downloaded",
    );

    Ok(Json(DataResponse {
        data: PurchasedLead {
            purchase,
            lead: Some(lead),
        },
    }))
}
