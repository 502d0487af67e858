//! Lead entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use leadlot_core::types::{DbId, Timestamp};

/// Lead status id type matching SMALLINT in the database.
pub type LeadStatusId = i16;

/// Lead lifecycle status. Discriminants match `leads.status_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Draft = 1,
    Submitted = 2,
    Processing = 3,
    Other = 4,
}

impl LeadStatus {
    /// Return the database status id.
    pub fn id(self) -> LeadStatusId {
        self as LeadStatusId
    }

    pub fn from_id(id: LeadStatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::Submitted),
            3 => Some(Self::Processing),
            4 => Some(Self::Other),
            _ => None,
        }
    }
}

/// A full row from the `leads` table, including the purchase-gated contact
/// fields. Only ever serialized to a dealer who holds an active purchase.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub vehicle_type: Option<String>,
    pub status_id: LeadStatusId,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for ingesting a lead (admin upload path, also used by tests).
#[derive(Debug, Deserialize)]
pub struct NewLead {
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub vehicle_type: Option<String>,
    pub status: Option<LeadStatus>,
    pub submitted_at: Option<Timestamp>,
}
