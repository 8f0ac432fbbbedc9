//! User screen view-model.
//!
//! # Responsibility
//! - Own one [`UserRepository`] for the lifetime of a UI screen.
//! - Forward user operations unchanged and expose the live list.
//!
//! # Invariants
//! - The view-model adds no logic of its own; results and errors are the
//!   repository's.
//! - Dropping the view-model stops its worker after queued work completes.

use crate::config::StoreConfig;
use crate::live::LiveUsers;
use crate::model::user::{User, UserId};
use crate::repo::user_dao::RepoResult;
use crate::repo::user_repository::UserRepository;
use crate::worker::Pending;

/// View-state holder for user screens.
pub struct UserViewModel {
    repository: UserRepository,
    all_users: LiveUsers,
}

impl UserViewModel {
    pub fn new(repository: UserRepository) -> Self {
        let all_users = repository.all_users();
        Self {
            repository,
            all_users,
        }
    }

    /// Opens a repository for `config` and wraps it.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        UserRepository::open(config).map(Self::new)
    }

    pub fn all_users(&self) -> LiveUsers {
        self.all_users.clone()
    }

    pub fn insert(&self, user: User) -> Pending<UserId> {
        self.repository.insert(user)
    }

    pub fn update(&self, user: User) -> Pending<()> {
        self.repository.update(user)
    }

    pub fn delete(&self, user: User) -> Pending<()> {
        self.repository.delete(user)
    }

    pub fn delete_by_id(&self, id: UserId) -> Pending<()> {
        self.repository.delete_by_id(id)
    }

    pub fn get_user_by_id(&self, id: UserId) -> Pending<Option<User>> {
        self.repository.get_user_by_id(id)
    }

    pub fn list_users(&self) -> Pending<Vec<User>> {
        self.repository.list_users()
    }
}
