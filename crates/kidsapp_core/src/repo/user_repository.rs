//! User repository: single-worker dispatch plus live query handle.
//!
//! # Responsibility
//! - Route every user operation through one [`DbWorker`].
//! - Keep the [`LiveUsers`] handle bound to the "all users" query.
//!
//! # Invariants
//! - Operations run in submission order; a read submitted after a write
//!   observes that write.
//! - Every successful mutation is followed by a fresh publish on the live
//!   handle before the next job runs.
//! - Failed mutations publish nothing.

use crate::config::StoreConfig;
use crate::db::open_location;
use crate::live::LiveUsers;
use crate::model::user::{User, UserId};
use crate::repo::user_dao::{RepoResult, SqliteUserDao, UserDao};
use crate::worker::{DbWorker, Pending};
use log::{info, warn};
use rusqlite::Connection;

/// Serialization point for user operations and owner of the live list.
pub struct UserRepository {
    worker: DbWorker,
    all_users: LiveUsers,
}

impl UserRepository {
    /// Opens the configured database and starts the worker.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let conn = open_location(&config.location)?;
        Self::from_connection(conn, config.queue_capacity)
    }

    /// Starts the worker on an already-migrated connection.
    ///
    /// The live handle is populated with the current rows before returning.
    pub fn from_connection(conn: Connection, queue_capacity: usize) -> RepoResult<Self> {
        let initial = SqliteUserDao::try_new(&conn)?.list_users()?;
        let all_users = LiveUsers::new();
        all_users.publish(initial);

        let worker = DbWorker::spawn(conn, queue_capacity)?;
        info!(
            "event=repo_open module=repo status=ok queue_capacity={} users={}",
            queue_capacity,
            all_users.current().users.len()
        );

        Ok(Self { worker, all_users })
    }

    /// Live handle to the "all users" query.
    pub fn all_users(&self) -> LiveUsers {
        self.all_users.clone()
    }

    /// Queues an insert; resolves to the identity assigned by the store.
    pub fn insert(&self, user: User) -> Pending<UserId> {
        self.mutate("insert", move |dao| dao.create_user(&user))
    }

    pub fn update(&self, user: User) -> Pending<()> {
        self.mutate("update", move |dao| dao.update_user(&user))
    }

    pub fn delete(&self, user: User) -> Pending<()> {
        self.mutate("delete", move |dao| dao.delete_user(&user))
    }

    pub fn delete_by_id(&self, id: UserId) -> Pending<()> {
        self.mutate("delete_by_id", move |dao| dao.delete_user_by_id(id))
    }

    /// Queues a lookup behind every previously submitted operation.
    pub fn get_user_by_id(&self, id: UserId) -> Pending<Option<User>> {
        self.worker.submit("get_by_id", move |conn| {
            SqliteUserDao::assume_ready(conn).get_user(id)
        })
    }

    pub fn list_users(&self) -> Pending<Vec<User>> {
        self.worker
            .submit("list", |conn| SqliteUserDao::assume_ready(conn).list_users())
    }

    fn mutate<T, F>(&self, op: &'static str, apply: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn UserDao) -> RepoResult<T> + Send + 'static,
    {
        let all_users = self.all_users.clone();
        self.worker.submit(op, move |conn| {
            let dao = SqliteUserDao::assume_ready(conn);
            let value = apply(&dao)?;
            refresh_all_users(&dao, &all_users, op);
            Ok(value)
        })
    }
}

fn refresh_all_users(dao: &dyn UserDao, all_users: &LiveUsers, op: &'static str) {
    match dao.list_users() {
        Ok(users) => {
            all_users.publish(users);
        }
        Err(err) => warn!(
            "event=live_publish module=repo status=error op={} error={}",
            op, err
        ),
    }
}
