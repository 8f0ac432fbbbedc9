//! Single-thread database worker.
//!
//! # Responsibility
//! - Own the only SQLite connection of a user store.
//! - Run submitted jobs one at a time in submission order.
//! - Hand each job's result back through a [`Pending`] handle.
//!
//! # Invariants
//! - At most one job runs at any time; jobs never overlap.
//! - The queue is bounded; `submit` blocks while it is full.
//! - On shutdown, already-queued jobs run before the thread exits.

use crate::repo::user_dao::{RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_THREAD_NAME: &str = "kidsapp-db-worker";

type Job = Box<dyn FnOnce(&Connection) + Send + 'static>;

/// Dedicated worker thread serializing all access to one connection.
pub struct DbWorker {
    sender: Option<SyncSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

/// Result handle for one submitted job.
///
/// Dropping it discards the result; failures are still logged by the worker.
#[must_use = "dropping a Pending discards the operation result"]
#[derive(Debug)]
pub struct Pending<T> {
    state: PendingState<T>,
}

#[derive(Debug)]
enum PendingState<T> {
    Queued(Receiver<RepoResult<T>>),
    Rejected(RepoError),
}

impl<T> Pending<T> {
    fn rejected(err: RepoError) -> Self {
        Self {
            state: PendingState::Rejected(err),
        }
    }

    /// Blocks until the job has run and returns its result.
    ///
    /// Returns `RepoError::WorkerStopped` when the worker exited without
    /// running the job.
    pub fn wait(self) -> RepoResult<T> {
        match self.state {
            PendingState::Queued(receiver) => receiver
                .recv()
                .unwrap_or(Err(RepoError::WorkerStopped)),
            PendingState::Rejected(err) => Err(err),
        }
    }
}

impl DbWorker {
    /// Moves `conn` onto a new worker thread with a queue of `capacity` jobs.
    pub fn spawn(conn: Connection, capacity: usize) -> RepoResult<Self> {
        let (sender, receiver) = mpsc::sync_channel::<Job>(capacity.max(1));

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || run_jobs(conn, receiver))
            .map_err(spawn_failed)?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queues `job`, blocking while the queue is full.
    pub fn submit<T, F>(&self, op: &'static str, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
    {
        let Some(sender) = self.sender.as_ref() else {
            return Pending::rejected(RepoError::WorkerStopped);
        };
        let (job, pending) = wrap_job(op, job);
        match sender.send(job) {
            Ok(()) => pending,
            Err(_) => Pending::rejected(RepoError::WorkerStopped),
        }
    }

    /// Queues `job` without blocking; fails with `RepoError::QueueFull` when
    /// the queue is at capacity.
    pub fn try_submit<T, F>(&self, op: &'static str, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
    {
        let Some(sender) = self.sender.as_ref() else {
            return Pending::rejected(RepoError::WorkerStopped);
        };
        let (job, pending) = wrap_job(op, job);
        match sender.try_send(job) {
            Ok(()) => pending,
            Err(TrySendError::Full(_)) => Pending::rejected(RepoError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Pending::rejected(RepoError::WorkerStopped),
        }
    }

    /// Stops accepting jobs, drains the queue and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=worker_stop module=worker status=error error_code=worker_panicked");
            }
        }
    }
}

impl Drop for DbWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wrap_job<T, F>(op: &'static str, job: F) -> (Job, Pending<T>)
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
{
    let (reply, receiver) = mpsc::sync_channel(1);
    let wrapped: Job = Box::new(move |conn: &Connection| {
        let started_at = Instant::now();
        let result = job(conn);
        match &result {
            Ok(_) => debug!(
                "event=user_op module=worker status=ok op={} duration_ms={}",
                op,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=user_op module=worker status=error op={} duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        // Why: callers may drop the Pending handle without waiting; the outcome
        // is already logged above, so a closed reply channel is not an error.
        let _ = reply.send(result);
    });

    (
        wrapped,
        Pending {
            state: PendingState::Queued(receiver),
        },
    )
}

fn spawn_failed(err: io::Error) -> RepoError {
    error!(
        "event=worker_start module=worker status=error error_code=spawn_failed error={}",
        err
    );
    RepoError::WorkerSpawn(err)
}

fn run_jobs(conn: Connection, receiver: Receiver<Job>) {
    info!("event=worker_start module=worker status=ok");
    let mut processed: u64 = 0;
    while let Ok(job) = receiver.recv() {
        job(&conn);
        processed += 1;
    }
    info!("event=worker_stop module=worker status=ok jobs={processed}");
}
