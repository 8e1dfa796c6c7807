//! Snapshot persistence for the event planner store.
//!
//! # Responsibility
//! - Define the snapshot save/load contract used by the storage service.
//! - Isolate SQLite query details from command and service orchestration.
//!
//! # Invariants
//! - A save replaces the whole persisted snapshot atomically.
//! - A load rebuilds the store through its own mutation rules, so persisted
//!   data that breaks a store invariant is reported as `InvalidData`.

pub mod planner_repo;

pub use planner_repo::{PlannerRepository, RepoError, RepoResult, SqlitePlannerRepository};
