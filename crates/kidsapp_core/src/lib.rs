//! Core data layer for the KidsApp user store.
//! This crate owns the user schema, its persistence and the UI-facing
//! view-model.

pub mod config;
pub mod db;
pub mod live;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod worker;

pub use config::{ConfigError, DbLocation, StoreConfig};
pub use db::DbError;
pub use live::{LiveUsers, UserSubscription, UsersSnapshot};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::user::{User, UserId};
pub use repo::user_dao::{RepoError, RepoResult, SqliteUserDao, UserDao};
pub use repo::user_repository::UserRepository;
pub use service::user_view_model::UserViewModel;
pub use worker::{DbWorker, Pending};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
