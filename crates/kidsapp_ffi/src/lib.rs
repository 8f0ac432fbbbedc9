//! Flutter-facing bindings for the KidsApp user store.

pub mod api;
