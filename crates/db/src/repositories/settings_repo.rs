//! Repository for the `system_settings` singleton.

use sqlx::PgPool;

use crate::models::settings::{SystemSettings, UpdateSystemSettings};

/// Column list for `system_settings` queries.
const COLUMNS: &str = "\
    id, standard_price_cents, discounted_price_cents, temporary_lock_minutes, \
    age_discount_enabled, age_discount_threshold_days, age_discount_percentage, \
    created_at, updated_at";

/// The singleton row id. The table CHECK-constrains id to this value.
const SINGLETON_ID: i64 = 1;

/// Provides access to the settings singleton.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Fetch the settings row. The row is seeded by migration, so absence
    /// is a deployment error and surfaces as `RowNotFound`.
    pub async fn get(pool: &PgPool) -> Result<SystemSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_settings WHERE id = $1");
        sqlx::query_as::<_, SystemSettings>(&query)
            .bind(SINGLETON_ID)
            .fetch_one(pool)
            .await
    }

    /// Partially update the settings row; absent fields keep their value.
    pub async fn update(
        pool: &PgPool,
        input: &UpdateSystemSettings,
    ) -> Result<SystemSettings, sqlx::Error> {
        let query = format!(
            "UPDATE system_settings \
             SET standard_price_cents = COALESCE($2, standard_price_cents), \
                 discounted_price_cents = COALESCE($3, discounted_price_cents), \
                 temporary_lock_minutes = COALESCE($4, temporary_lock_minutes), \
                 age_discount_enabled = COALESCE($5, age_discount_enabled), \
                 age_discount_threshold_days = COALESCE($6, age_discount_threshold_days), \
                 age_discount_percentage = COALESCE($7, age_discount_percentage), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemSettings>(&query)
            .bind(SINGLETON_ID)
            .bind(input.standard_price_cents)
            .bind(input.discounted_price_cents)
            .bind(input.temporary_lock_minutes)
            .bind(input.age_discount_enabled)
            .bind(input.age_discount_threshold_days)
            .bind(input.age_discount_percentage)
            .fetch_one(pool)
            .await
    }
}
