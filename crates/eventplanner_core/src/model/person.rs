//! Person domain model.
//!
//! # Responsibility
//! - Define the person record owned by the event planner store.
//! - Provide value-based duplicate detection independent of identity.
//!
//! # Invariants
//! - `id` is stable for a person's whole lifetime, including across edits.
//! - Tags are an unordered set; tag order never affects equality.

use crate::model::fields::{Address, Email, Name, Phone, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Surrogate identity used by event registrations.
pub type PersonId = Uuid;

/// Person record.
///
/// `PartialEq` is structural and includes `id`; use
/// [`Person::same_values_as`] for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: Name,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    pub tags: BTreeSet<Tag>,
}

impl Person {
    /// Creates a person with a freshly generated identity.
    pub fn new(
        name: Name,
        phone: Phone,
        email: Email,
        address: Address,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, phone, email, address, tags)
    }

    /// Creates a person with a caller-provided identity.
    ///
    /// Used when loading snapshots and when building the edited form of an
    /// existing person.
    pub fn with_id(
        id: PersonId,
        name: Name,
        phone: Phone,
        email: Email,
        address: Address,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            id,
            name,
            phone,
            email,
            address,
            tags: tags.into_iter().collect(),
        }
    }

    /// Returns whether both persons hold identical field values.
    ///
    /// Identity (`id`) is ignored: two persons with equal values are
    /// duplicates even when created independently.
    pub fn same_values_as(&self, other: &Person) -> bool {
        self.name == other.name
            && self.phone == other.phone
            && self.email == other.email
            && self.address == other.address
            && self.tags == other.tags
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Phone: {} Email: {} Address: {} Tags: ",
            self.name, self.phone, self.email, self.address
        )?;
        for tag in &self.tags {
            write!(f, "[{tag}]")?;
        }
        Ok(())
    }
}
