//! Domain model for persons, events and their registrations.
//!
//! # Responsibility
//! - Define the entity records and their validated field types.
//! - Own the entity store and the model facade that commands mutate.
//!
//! # Invariants
//! - Persons are duplicates when their field values are equal; events are
//!   duplicates when their names are equal.
//! - Registrations reference persons by stable `PersonId`.

pub mod event;
pub mod fields;
pub mod filter;
pub mod manager;
pub mod notifier;
pub mod person;
pub mod planner;
