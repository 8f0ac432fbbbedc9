//! Observable user list.
//!
//! # Responsibility
//! - Hold the latest result of the "all users" query.
//! - Wake subscribers whenever a newer result is published.
//!
//! # Invariants
//! - `version` increases by one per publish; version 0 means nothing has
//!   been published yet.
//! - Only the newest snapshot is retained. A subscriber that falls behind
//!   skips straight to it, so an idle subscriber holds at most one pending
//!   snapshot.
//! - A new subscriber first observes the current snapshot.
//! - Once every [`LiveUsers`] handle is dropped and the newest snapshot has
//!   been read, subscriptions report end of stream.

use crate::model::user::User;
use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One published result of the live "all users" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersSnapshot {
    pub version: u64,
    pub users: Arc<Vec<User>>,
}

#[derive(Debug)]
struct LiveShared {
    state: Mutex<LiveState>,
    changed: Condvar,
}

#[derive(Debug)]
struct LiveState {
    current: UsersSnapshot,
    /// Live `LiveUsers` handles; zero means no further publishes can happen.
    publishers: usize,
    subscribers: usize,
}

/// Cloneable handle to the live "all users" query.
#[derive(Debug)]
pub struct LiveUsers {
    shared: Arc<LiveShared>,
}

impl LiveUsers {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(LiveShared {
                state: Mutex::new(LiveState {
                    current: UsersSnapshot {
                        version: 0,
                        users: Arc::new(Vec::new()),
                    },
                    publishers: 1,
                    subscribers: 0,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Returns the most recently published snapshot.
    pub fn current(&self) -> UsersSnapshot {
        self.shared.state.lock().current.clone()
    }

    pub fn version(&self) -> u64 {
        self.shared.state.lock().current.version
    }

    /// Registers a subscriber; its first read yields the current snapshot.
    pub fn subscribe(&self) -> UserSubscription {
        self.shared.state.lock().subscribers += 1;
        UserSubscription {
            shared: Arc::clone(&self.shared),
            last_seen: None,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().subscribers
    }

    pub(crate) fn publish(&self, users: Vec<User>) -> u64 {
        let mut state = self.shared.state.lock();
        state.current = UsersSnapshot {
            version: state.current.version + 1,
            users: Arc::new(users),
        };
        debug!(
            "event=live_publish module=live status=ok version={} users={} subscribers={}",
            state.current.version,
            state.current.users.len(),
            state.subscribers
        );
        let version = state.current.version;
        drop(state);
        self.shared.changed.notify_all();
        version
    }
}

impl Clone for LiveUsers {
    fn clone(&self) -> Self {
        self.shared.state.lock().publishers += 1;
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for LiveUsers {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.publishers -= 1;
        let closed = state.publishers == 0;
        drop(state);
        if closed {
            self.shared.changed.notify_all();
        }
    }
}

/// Receiving side of a [`LiveUsers`] subscription.
///
/// Reads return the newest snapshot not yet seen by this subscription;
/// intermediate versions published between reads are skipped.
#[derive(Debug)]
pub struct UserSubscription {
    shared: Arc<LiveShared>,
    last_seen: Option<u64>,
}

impl UserSubscription {
    /// Blocks until a newer snapshot is available. Returns `None` once every
    /// publisher handle is gone.
    pub fn recv(&mut self) -> Option<UsersSnapshot> {
        let shared = Arc::clone(&self.shared);
        let mut state = shared.state.lock();
        loop {
            if let Some(snapshot) = self.take_unseen(&state) {
                return Some(snapshot);
            }
            if state.publishers == 0 {
                return None;
            }
            shared.changed.wait(&mut state);
        }
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<UsersSnapshot> {
        let deadline = Instant::now() + timeout;
        let shared = Arc::clone(&self.shared);
        let mut state = shared.state.lock();
        loop {
            if let Some(snapshot) = self.take_unseen(&state) {
                return Some(snapshot);
            }
            if state.publishers == 0 {
                return None;
            }
            if shared
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return self.take_unseen(&state);
            }
        }
    }

    /// Returns the newest unseen snapshot without blocking.
    pub fn try_recv(&mut self) -> Option<UsersSnapshot> {
        let shared = Arc::clone(&self.shared);
        let state = shared.state.lock();
        self.take_unseen(&state)
    }

    fn take_unseen(&mut self, state: &MutexGuard<'_, LiveState>) -> Option<UsersSnapshot> {
        let current = &state.current;
        if self.last_seen.is_some_and(|seen| current.version <= seen) {
            return None;
        }
        self.last_seen = Some(current.version);
        Some(current.clone())
    }
}

impl Drop for UserSubscription {
    fn drop(&mut self) {
        self.shared.state.lock().subscribers -= 1;
    }
}
