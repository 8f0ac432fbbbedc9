//! User domain model.
//!
//! # Responsibility
//! - Define the single record persisted by the user store.
//! - Track whether a record has been assigned an identity yet.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on first insert.
//! - An assigned `id` is unique and is never reused for another user.

use serde::{Deserialize, Serialize};

/// Store-assigned identity of a persisted user row.
pub type UserId = i64;

/// One row of `user_table`.
///
/// Name and age carry no validation rules; the UI owns transient instances
/// while the store owns the durable copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store; `None` for records not persisted yet.
    pub id: Option<UserId>,
    pub name: String,
    pub age: i32,
}

impl User {
    /// Creates an in-memory user that has not been persisted yet.
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }

    /// Creates a user bound to an identity already assigned by the store.
    ///
    /// Used by edit flows that address an existing row.
    pub fn with_id(id: UserId, name: impl Into<String>, age: i32) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            age,
        }
    }

    /// Returns whether the store has assigned this user an identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
