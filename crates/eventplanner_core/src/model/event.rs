//! Event domain model.
//!
//! # Responsibility
//! - Define the event record and the registrations it holds.
//!
//! # Invariants
//! - Events are identified by name; two events with the same name are
//!   duplicates regardless of their attendees.
//! - `attendees` lists each registered person id at most once, in
//!   registration order.

use crate::model::fields::EventName;
use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Event record with its registered persons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicEvent {
    pub name: EventName,
    attendees: Vec<PersonId>,
}

impl EpicEvent {
    /// Creates an event with no registrations.
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            attendees: Vec::new(),
        }
    }

    /// Returns a copy of this event under a new name, keeping registrations.
    pub fn renamed(&self, name: EventName) -> Self {
        Self {
            name,
            attendees: self.attendees.clone(),
        }
    }

    /// Returns whether both events share a name.
    pub fn same_name_as(&self, other: &EpicEvent) -> bool {
        self.name == other.name
    }

    /// Registered person ids in registration order.
    pub fn attendees(&self) -> &[PersonId] {
        &self.attendees
    }

    pub fn is_registered(&self, person_id: PersonId) -> bool {
        self.attendees.contains(&person_id)
    }

    pub(crate) fn attendee_position(&self, person_id: PersonId) -> Option<usize> {
        self.attendees.iter().position(|id| *id == person_id)
    }

    pub(crate) fn insert_attendee(&mut self, position: usize, person_id: PersonId) {
        self.attendees.insert(position, person_id);
    }

    pub(crate) fn remove_attendee_at(&mut self, position: usize) -> PersonId {
        self.attendees.remove(position)
    }
}

impl Display for EpicEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
