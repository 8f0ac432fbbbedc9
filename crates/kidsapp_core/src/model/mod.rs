//! Domain model for the user store.
//!
//! # Invariants
//! - A persisted user is identified by a store-assigned `UserId`.
//! - Identity never changes once assigned.

pub mod user;
