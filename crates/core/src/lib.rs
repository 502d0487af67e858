//! Pure domain logic for the lead marketplace: lock semantics, pricing,
//! dashboard visibility rules, and webhook signature verification.
//!
//! This crate performs no I/O. Everything here is deterministic given its
//! inputs, which is what makes the pricing and lock rules testable without
//! a database.

pub mod error;
pub mod locking;
pub mod pricing;
pub mod roles;
pub mod search;
pub mod signature;
pub mod types;
pub mod visibility;
