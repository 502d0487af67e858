//! System settings singleton model and update DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use leadlot_core::pricing::PricingSettings;
use leadlot_core::types::{DbId, Timestamp};

/// The `system_settings` singleton row (id = 1). Read by the pricing
/// engine and dashboard; mutated only through the admin API.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemSettings {
    pub id: DbId,
    pub standard_price_cents: i64,
    pub discounted_price_cents: i64,
    pub temporary_lock_minutes: i32,
    pub age_discount_enabled: bool,
    pub age_discount_threshold_days: i64,
    pub age_discount_percentage: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SystemSettings {
    /// Project the pricing-relevant slice for the pure pricing function.
    pub fn pricing(&self) -> PricingSettings {
        PricingSettings {
            standard_price_cents: self.standard_price_cents,
            discounted_price_cents: self.discounted_price_cents,
            age_discount_enabled: self.age_discount_enabled,
            age_discount_threshold_days: self.age_discount_threshold_days,
            age_discount_percentage: self.age_discount_percentage,
        }
    }
}

/// DTO for `PUT /admin/settings`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct UpdateSystemSettings {
    #[validate(range(min = 0))]
    pub standard_price_cents: Option<i64>,
    #[validate(range(min = 0))]
    pub discounted_price_cents: Option<i64>,
    #[validate(range(min = 1))]
    pub temporary_lock_minutes: Option<i32>,
    pub age_discount_enabled: Option<bool>,
    #[validate(range(min = 0))]
    pub age_discount_threshold_days: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub age_discount_percentage: Option<i64>,
}
