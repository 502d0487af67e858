//! Access-token handling. Token *issuance* (login flows) lives in the
//! identity service; this module only generates tokens for tooling/tests
//! and validates incoming bearer tokens.

pub mod jwt;
