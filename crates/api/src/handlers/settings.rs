//! Admin handlers for the system settings singleton.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use leadlot_db::models::settings::UpdateSystemSettings;
use leadlot_db::repositories::SettingsRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/settings
///
/// Read the settings singleton.
pub async fn get_settings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings
///
/// Partially update the settings singleton. Absent fields keep their
/// current values.
pub async fn update_settings(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<UpdateSystemSettings>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid settings: {e}")))?;

    let updated = SettingsRepo::update(&state.pool, &input).await?;

    tracing::info!(
        admin_id = admin.dealer_id,
        standard_price_cents = updated.standard_price_cents,
        discounted_price_cents = updated.discounted_price_cents,
        age_discount_enabled = updated.age_discount_enabled,
        "System settings updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
