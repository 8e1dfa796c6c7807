//! Snapshot storage use-case service.
//!
//! # Responsibility
//! - Load the persisted store at startup.
//! - Persist every committed store change when attached to a logic service.
//!
//! # Invariants
//! - Save failures are logged and never propagate into command execution.
//! - Saves are serialized through one repository lock.

use crate::model::planner::EventPlanner;
use crate::repo::planner_repo::{PlannerRepository, RepoResult};
use crate::service::logic_service::LogicService;
use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Persists store snapshots through a [`PlannerRepository`].
pub struct StorageService<R: PlannerRepository> {
    repo: Mutex<R>,
}

impl<R: PlannerRepository> StorageService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo: Mutex::new(repo),
        }
    }

    /// Reads the persisted snapshot.
    pub fn load(&self) -> RepoResult<EventPlanner> {
        let started_at = Instant::now();
        match self.lock().load_planner() {
            Ok(planner) => {
                info!(
                    "event=snapshot_load module=storage status=ok persons={} events={} duration_ms={}",
                    planner.persons().len(),
                    planner.events().len(),
                    started_at.elapsed().as_millis()
                );
                Ok(planner)
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=storage status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces the persisted snapshot with `planner`.
    pub fn save(&self, planner: &EventPlanner) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.lock().save_planner(planner);
        match &result {
            Ok(()) => info!(
                "event=snapshot_save module=storage status=ok persons={} events={} duration_ms={}",
                planner.persons().len(),
                planner.events().len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_save module=storage status=error error={}",
                err
            ),
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, R> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: PlannerRepository + Send + 'static> StorageService<R> {
    /// Subscribes this service to `logic` so each committed change is saved.
    pub fn attach(self: Arc<Self>, logic: &LogicService) {
        logic.on_store_changed(Arc::new(move |snapshot: &EventPlanner| {
            // Already logged by `save`.
            let _ = self.save(snapshot);
        }));
    }
}
