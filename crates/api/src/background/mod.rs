//! Background tasks spawned by the server binary.

pub mod reconcile_sweep;
