//! User data access contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `user_table` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Identity is assigned by SQLite on insert and never written afterwards.
//! - Update/delete address rows by identity only and report missing rows.
//! - Read paths reject persisted values that do not fit the domain model.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::user::{User, UserId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    age
FROM user_table";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence, query and dispatch operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No row exists for the addressed identity.
    NotFound(UserId),
    /// Update/delete was called with a user that was never persisted.
    MissingId,
    /// Persisted data cannot be converted to a valid `User`.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Worker queue is at capacity and the caller asked not to block.
    QueueFull,
    /// Worker thread has shut down; the operation was not executed.
    WorkerStopped,
    /// The OS refused to start the worker thread.
    WorkerSpawn(std::io::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::MissingId => write!(f, "user has no id; insert it before update/delete"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "user repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "user repository requires column `{column}` in table `{table}`"
            ),
            Self::QueueFull => write!(f, "user store queue is full"),
            Self::WorkerStopped => write!(f, "user store worker has stopped"),
            Self::WorkerSpawn(err) => write!(f, "failed to start user store worker: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::MissingId => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::QueueFull => None,
            Self::WorkerStopped => None,
            Self::WorkerSpawn(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access interface for user CRUD operations.
pub trait UserDao {
    /// Inserts a new row and returns the identity assigned by the store.
    ///
    /// Any `id` already carried by `user` is ignored.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Persists `name` and `age` of the row addressed by `user.id`.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    /// Removes the row addressed by `user.id`.
    fn delete_user(&self, user: &User) -> RepoResult<()>;
    /// Removes the row with the given identity.
    fn delete_user_by_id(&self, id: UserId) -> RepoResult<()>;
    /// Returns all rows ordered by identity.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Returns the row with the given identity, if any.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// SQLite-backed user data access.
pub struct SqliteUserDao<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserDao<'conn> {
    /// Constructs a DAO from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_user_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection already checked by [`SqliteUserDao::try_new`].
    pub(crate) fn assume_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserDao for SqliteUserDao<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO user_table (name, age) VALUES (?1, ?2);",
            params![user.name.as_str(), user.age],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let id = user.id.ok_or(RepoError::MissingId)?;

        let changed = self.conn.execute(
            "UPDATE user_table
             SET
                name = ?1,
                age = ?2
             WHERE id = ?3;",
            params![user.name.as_str(), user.age, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_user(&self, user: &User) -> RepoResult<()> {
        let id = user.id.ok_or(RepoError::MissingId)?;
        self.delete_user_by_id(id)
    }

    fn delete_user_by_id(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM user_table WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id: UserId = row.get("id")?;
    let raw_age: i64 = row.get("age")?;
    let age = i32::try_from(raw_age).map_err(|_| {
        RepoError::InvalidData(format!(
            "age `{raw_age}` out of range in user_table.age (id={id})"
        ))
    })?;

    Ok(User {
        id: Some(id),
        name: row.get("name")?,
        age,
    })
}

fn ensure_user_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "user_table")? {
        return Err(RepoError::MissingRequiredTable("user_table"));
    }

    for column in ["id", "name", "age"] {
        if !table_has_column(conn, "user_table", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "user_table",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
