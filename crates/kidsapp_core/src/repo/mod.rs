//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the user data access contract and its SQLite implementation.
//! - Serialize store access through one worker and publish live results.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `MissingId`) in
//!   addition to DB transport errors.

pub mod user_dao;
pub mod user_repository;
