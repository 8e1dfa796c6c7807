//! Event planner core: entity store, reversible commands and undo/redo.
//! All store invariants are enforced here; front ends only submit commands.

pub mod command;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use command::history::{CommandHistory, HistoryDirection, HistoryError};
pub use command::{Command, CommandError, CommandResult, Index, IndexTarget};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::EpicEvent;
pub use model::fields::{Address, Email, EventName, Name, Phone, Tag, ValidationError};
pub use model::person::{Person, PersonId};
pub use model::planner::{EventPlanner, StoreError, StoreResult};
pub use repo::planner_repo::{
    PlannerRepository, RepoError, RepoResult, SqlitePlannerRepository,
};
pub use service::logic_service::LogicService;
pub use service::storage_service::StorageService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
