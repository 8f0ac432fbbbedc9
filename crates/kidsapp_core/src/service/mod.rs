//! Core use-case services.
//!
//! # Responsibility
//! - Hold per-screen state for UI callers.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod user_view_model;
