//! Background search execution
//!
//! Queries run on a single dedicated worker thread so the caller stays
//! responsive. One worker means queries are serialized: a new query queues
//! behind the running one instead of racing it, and outcomes arrive in
//! submission order.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::EngineError;
use crate::models::{QueryFilter, SearchResult};
use crate::search::SearchCoordinator;

enum Job {
    Query(QueryFilter),
    Shutdown,
}

/// Completed query, echoing the filter it ran with so a caller that moved
/// on can discard stale outcomes.
pub struct QueryOutcome {
    pub filter: QueryFilter,
    pub result: Result<Vec<SearchResult>, EngineError>,
}

/// Serialized search worker.
///
/// Dropping the worker shuts the thread down after the jobs already queued
/// have finished.
pub struct SearchWorker {
    jobs: Sender<Job>,
    outcomes: Receiver<QueryOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SearchWorker {
    pub fn spawn(coordinator: Arc<SearchCoordinator>) -> std::io::Result<SearchWorker> {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (outcome_tx, outcomes) = mpsc::channel::<QueryOutcome>();

        let handle = thread::Builder::new()
            .name(String::from("filesift-search"))
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let filter = match job {
                        Job::Query(filter) => filter,
                        Job::Shutdown => break,
                    };
                    let result = coordinator.execute(&filter);
                    if let Err(e) = &result {
                        log::warn!("search failed: {e}");
                    }
                    // Receiver gone means the owner is shutting down.
                    if outcome_tx.send(QueryOutcome { filter, result }).is_err() {
                        break;
                    }
                }
            })?;

        Ok(SearchWorker {
            jobs,
            outcomes,
            handle: Some(handle),
        })
    }

    /// Queue a query behind whatever is already running.
    pub fn submit(&self, filter: QueryFilter) {
        // Send fails only after shutdown, when nobody is waiting anyway.
        let _ = self.jobs.send(Job::Query(filter));
    }

    /// Block until the next queued query finishes. `None` after the worker
    /// thread has gone away.
    pub fn recv(&self) -> Option<QueryOutcome> {
        self.outcomes.recv().ok()
    }

    /// Non-blocking poll for a finished query.
    pub fn try_recv(&self) -> Option<QueryOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
