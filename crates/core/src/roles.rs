//! Role name constants matching the `role` claim in access tokens.

/// Administrators manage system settings and lead ingestion.
pub const ROLE_ADMIN: &str = "admin";

/// Dealers browse, lock, and purchase leads.
pub const ROLE_DEALER: &str = "dealer";
