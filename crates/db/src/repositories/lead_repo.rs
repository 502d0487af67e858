//! Repository for the `leads` table.
//!
//! Bulk ingestion lives in admin tooling outside this service; the insert
//! here is the seam it (and the test fixtures) goes through.

use sqlx::PgPool;

use leadlot_core::types::DbId;

use crate::models::lead::{Lead, LeadStatus, NewLead};

/// Column list for `leads` queries.
const COLUMNS: &str = "\
    id, full_name, email, phone_number, street_address, city, province, \
    postal_code, vehicle_type, status_id, submitted_at, created_at, updated_at";

/// Provides operations on leads.
pub struct LeadRepo;

impl LeadRepo {
    /// Find a lead by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several leads by id. Missing ids are silently absent from the
    /// result; callers that care must compare lengths.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = ANY($1)");
        sqlx::query_as::<_, Lead>(&query)
            .bind(ids.to_vec())
            .fetch_all(pool)
            .await
    }

    /// Insert a new lead. Defaults: status `submitted`, submitted now.
    pub async fn insert(pool: &PgPool, input: &NewLead) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads \
                 (full_name, email, phone_number, street_address, city, province, \
                  postal_code, vehicle_type, status_id, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&input.full_name)
            .bind(input.email.as_deref())
            .bind(input.phone_number.as_deref())
            .bind(input.street_address.as_deref())
            .bind(input.city.as_deref())
            .bind(input.province.as_deref())
            .bind(input.postal_code.as_deref())
            .bind(input.vehicle_type.as_deref())
            .bind(input.status.unwrap_or(LeadStatus::Submitted).id())
            .bind(input.submitted_at)
            .fetch_one(pool)
            .await
    }

    /// Update a lead's lifecycle status.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: LeadStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE leads SET status_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
