use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another dealer holds an active lock on the lead. Surfaced to the
    /// caller as a business-rule conflict; retrying is pointless until the
    /// lock expires or is purchased over.
    #[error("Lead {lead_id} is locked by another dealer")]
    AlreadyLocked { lead_id: DbId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
