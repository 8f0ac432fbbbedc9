//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the user view-model to Dart via FRB as sync functions.
//! - Flatten core results into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide view-model serves every call; it is opened lazily
//!   from `StoreConfig::from_env()` on first use.

use kidsapp_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    RepoResult, StoreConfig, User, UserId, UserViewModel, UsersSnapshot,
};
use log::error;
use once_cell::sync::OnceCell;

static USER_VIEW_MODEL: OnceCell<UserViewModel> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One persisted user as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItem {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

/// Result envelope for insert/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActionResponse {
    pub ok: bool,
    /// Identity of the affected user when known.
    pub user_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl UserActionResponse {
    fn success(message: impl Into<String>, user_id: UserId) -> Self {
        Self {
            ok: true,
            user_id: Some(user_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            user_id: None,
            message: message.into(),
        }
    }
}

/// Result envelope for single-user lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGetResponse {
    pub ok: bool,
    /// `None` when no user has the requested id or the lookup failed.
    pub item: Option<UserItem>,
    pub message: String,
}

/// Result envelope for the full user list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListResponse {
    pub ok: bool,
    pub items: Vec<UserItem>,
    /// Live list version at the time of the call; see [`user_list_version`].
    pub version: u64,
    pub message: String,
}

/// Inserts a user and returns the store-assigned id.
///
/// # FFI contract
/// - Sync call; blocks until the write has run on the store worker.
/// - `name` is trimmed before persistence.
#[flutter_rust_bridge::frb(sync)]
pub fn user_insert(name: String, age: i32) -> UserActionResponse {
    let user = User::new(name.trim(), age);
    match with_view_model(|view_model| view_model.insert(user).wait()) {
        Ok(id) => UserActionResponse::success("User created.", id),
        Err(err) => UserActionResponse::failure(format!("user_insert failed: {err}")),
    }
}

/// Replaces name and age of the user with `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn user_update(id: i64, name: String, age: i32) -> UserActionResponse {
    let user = User::with_id(id, name.trim(), age);
    match with_view_model(|view_model| view_model.update(user).wait()) {
        Ok(()) => UserActionResponse::success("User updated.", id),
        Err(err) => UserActionResponse::failure(format!("user_update failed: {err}")),
    }
}

/// Deletes the user with `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn user_delete(id: i64) -> UserActionResponse {
    match with_view_model(|view_model| view_model.delete_by_id(id).wait()) {
        Ok(()) => UserActionResponse::success("User deleted.", id),
        Err(err) => UserActionResponse::failure(format!("user_delete failed: {err}")),
    }
}

/// Looks up one user by id.
#[flutter_rust_bridge::frb(sync)]
pub fn user_get(id: i64) -> UserGetResponse {
    match with_view_model(|view_model| view_model.get_user_by_id(id).wait()) {
        Ok(Some(user)) => UserGetResponse {
            ok: true,
            item: to_user_item(user),
            message: "User found.".to_string(),
        },
        Ok(None) => UserGetResponse {
            ok: true,
            item: None,
            message: "No user.".to_string(),
        },
        Err(err) => UserGetResponse {
            ok: false,
            item: None,
            message: format!("user_get failed: {err}"),
        },
    }
}

/// Lists every user ordered by id.
///
/// Items and version come from one live snapshot, so the returned version
/// always describes exactly the returned items.
#[flutter_rust_bridge::frb(sync)]
pub fn user_list() -> UserListResponse {
    match with_view_model(|view_model| Ok(view_model.all_users().current())) {
        Ok(UsersSnapshot { version, users }) => {
            let items = users
                .iter()
                .cloned()
                .filter_map(to_user_item)
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No users.".to_string()
            } else {
                format!("Found {} user(s).", items.len())
            };
            UserListResponse {
                ok: true,
                items,
                version,
                message,
            }
        }
        Err(err) => UserListResponse {
            ok: false,
            items: Vec::new(),
            version: 0,
            message: format!("user_list failed: {err}"),
        },
    }
}

/// Returns the live list version; it changes after every successful write.
///
/// Dart polls this cheaply and calls [`user_list`] only when it moved.
/// Returns 0 when the store cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn user_list_version() -> u64 {
    with_view_model(|view_model| Ok(view_model.all_users().version())).unwrap_or(0)
}

fn with_view_model<T>(f: impl FnOnce(&UserViewModel) -> RepoResult<T>) -> Result<T, String> {
    let view_model = USER_VIEW_MODEL.get_or_try_init(open_view_model)?;
    f(view_model).map_err(|err| err.to_string())
}

fn open_view_model() -> Result<UserViewModel, String> {
    let config = StoreConfig::from_env().map_err(|err| {
        error!("event=store_open module=ffi status=error error_code=config_invalid error={err}");
        format!("user store config invalid: {err}")
    })?;
    UserViewModel::open(&config).map_err(|err| {
        error!("event=store_open module=ffi status=error error_code=open_failed error={err}");
        format!("user store open failed: {err}")
    })
}

fn to_user_item(user: User) -> Option<UserItem> {
    Some(UserItem {
        id: user.id?,
        name: user.name,
        age: user.age,
    })
}
