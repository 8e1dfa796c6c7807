//! Authoritative in-memory store of persons, events and registrations.
//!
//! # Responsibility
//! - Own the person and event sequences in stable insertion order.
//! - Enforce uniqueness and referential integrity on every mutation.
//! - Return removal records that let callers reinstate exact prior order.
//!
//! # Invariants
//! - No two persons hold equal values (`Person::same_values_as`).
//! - No two persons share a `PersonId`.
//! - No two events share a name.
//! - Every registered id refers to a person currently in the store.
//! - Every mutation validates all preconditions before its first write, so a
//!   failed call leaves the store untouched.

use crate::model::event::EpicEvent;
use crate::model::fields::EventName;
use crate::model::person::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicatePerson,
    PersonNotFound,
    DuplicateEvent(EventName),
    EventNotFound(EventName),
    AlreadyRegistered(EventName),
    NotRegistered(EventName),
    InvalidPosition { position: usize, len: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePerson => write!(f, "this person already exists in the event planner"),
            Self::PersonNotFound => write!(f, "the person cannot be found"),
            Self::DuplicateEvent(name) => {
                write!(f, "an event named `{name}` already exists in the event planner")
            }
            Self::EventNotFound(name) => write!(f, "the event `{name}` cannot be found"),
            Self::AlreadyRegistered(name) => {
                write!(f, "this person is already registered for event `{name}`")
            }
            Self::NotRegistered(name) => {
                write!(f, "this person is not registered for event `{name}`")
            }
            Self::InvalidPosition { position, len } => {
                write!(f, "position {position} is out of range for length {len}")
            }
        }
    }
}

impl Error for StoreError {}

/// One registration a removed person held, with its slot in the attendee list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSlot {
    pub event: EventName,
    pub position: usize,
}

/// Record of a person removal, sufficient to reinstate it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRemoval {
    pub person: Person,
    pub position: usize,
    pub registrations: Vec<RegistrationSlot>,
}

/// Record of an event removal. The event keeps its attendee list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRemoval {
    pub event: EpicEvent,
    pub position: usize,
}

/// The entity store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlanner {
    persons: Vec<Person>,
    events: Vec<EpicEvent>,
}

impl EventPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persons in insertion order.
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[EpicEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.events.is_empty()
    }

    pub fn has_person(&self, person: &Person) -> bool {
        self.person_position(person).is_some()
    }

    pub fn has_event(&self, name: &EventName) -> bool {
        self.event_position(name).is_some()
    }

    pub fn person_by_id(&self, id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|person| person.id == id)
    }

    pub fn event_by_name(&self, name: &EventName) -> Option<&EpicEvent> {
        self.events.iter().find(|event| &event.name == name)
    }

    /// Resolves the attendees of `event` to persons, in registration order.
    pub fn registered_persons(&self, event: &EpicEvent) -> Vec<&Person> {
        event
            .attendees()
            .iter()
            .filter_map(|id| self.person_by_id(*id))
            .collect()
    }

    /// Replaces the whole store content.
    pub fn reset_data(&mut self, other: EventPlanner) {
        *self = other;
    }

    //=========== Person operations ==========================================

    /// Appends a person.
    ///
    /// # Errors
    /// - `DuplicatePerson` when an equal person (or the same id) already exists.
    pub fn add_person(&mut self, person: Person) -> StoreResult<()> {
        self.ensure_person_admissible(&person, None)?;
        self.persons.push(person);
        Ok(())
    }

    /// Removes the person equal to `target` and cascades its registrations.
    ///
    /// # Errors
    /// - `PersonNotFound` when no equal person exists.
    pub fn remove_person(&mut self, target: &Person) -> StoreResult<PersonRemoval> {
        let position = self
            .person_position(target)
            .ok_or(StoreError::PersonNotFound)?;
        let person = self.persons.remove(position);

        let mut registrations = Vec::new();
        for event in &mut self.events {
            if let Some(slot) = event.attendee_position(person.id) {
                event.remove_attendee_at(slot);
                registrations.push(RegistrationSlot {
                    event: event.name.clone(),
                    position: slot,
                });
            }
        }

        Ok(PersonRemoval {
            person,
            position,
            registrations,
        })
    }

    /// Reinstates a removed person at its former position with its
    /// former registrations.
    pub fn restore_person(&mut self, removal: &PersonRemoval) -> StoreResult<()> {
        self.ensure_person_admissible(&removal.person, None)?;
        check_position(removal.position, self.persons.len())?;
        for slot in &removal.registrations {
            let event = self
                .event_by_name(&slot.event)
                .ok_or_else(|| StoreError::EventNotFound(slot.event.clone()))?;
            if event.is_registered(removal.person.id) {
                return Err(StoreError::AlreadyRegistered(slot.event.clone()));
            }
            check_position(slot.position, event.attendees().len())?;
        }

        self.persons
            .insert(removal.position, removal.person.clone());
        for slot in &removal.registrations {
            if let Some(index) = self.event_position(&slot.event) {
                self.events[index].insert_attendee(slot.position, removal.person.id);
            }
        }
        Ok(())
    }

    /// Replaces `target` with `edited` in place.
    ///
    /// Registrations follow the person id. When `edited` carries a different
    /// id, registrations are rewritten to the new id.
    ///
    /// # Errors
    /// - `PersonNotFound` when `target` is absent.
    /// - `DuplicatePerson` when `edited` collides with a different person.
    pub fn update_person(&mut self, target: &Person, edited: Person) -> StoreResult<()> {
        let position = self
            .person_position(target)
            .ok_or(StoreError::PersonNotFound)?;
        self.ensure_person_admissible(&edited, Some(position))?;

        let old_id = self.persons[position].id;
        if old_id != edited.id {
            for event in &mut self.events {
                if let Some(slot) = event.attendee_position(old_id) {
                    event.remove_attendee_at(slot);
                    event.insert_attendee(slot, edited.id);
                }
            }
        }
        self.persons[position] = edited;
        Ok(())
    }

    //=========== Event operations ===========================================

    /// Appends an event.
    ///
    /// # Errors
    /// - `DuplicateEvent` when an event with the same name exists.
    /// - `PersonNotFound` when the event lists an unknown attendee.
    pub fn add_event(&mut self, event: EpicEvent) -> StoreResult<()> {
        self.ensure_event_admissible(&event, None)?;
        self.events.push(event);
        Ok(())
    }

    /// Removes the event named like `target`, together with its registrations.
    ///
    /// # Errors
    /// - `EventNotFound` when no such event exists.
    pub fn remove_event(&mut self, target: &EpicEvent) -> StoreResult<EventRemoval> {
        let position = self
            .event_position(&target.name)
            .ok_or_else(|| StoreError::EventNotFound(target.name.clone()))?;
        let event = self.events.remove(position);
        Ok(EventRemoval { event, position })
    }

    /// Reinstates a removed event at its former position.
    pub fn restore_event(&mut self, removal: &EventRemoval) -> StoreResult<()> {
        self.ensure_event_admissible(&removal.event, None)?;
        check_position(removal.position, self.events.len())?;
        self.events.insert(removal.position, removal.event.clone());
        Ok(())
    }

    /// Replaces the event named like `target` with `edited` in place.
    ///
    /// # Errors
    /// - `EventNotFound` when `target` is absent.
    /// - `DuplicateEvent` when `edited` is named like a different event.
    pub fn update_event(&mut self, target: &EpicEvent, edited: EpicEvent) -> StoreResult<()> {
        let position = self
            .event_position(&target.name)
            .ok_or_else(|| StoreError::EventNotFound(target.name.clone()))?;
        self.ensure_event_admissible(&edited, Some(position))?;
        self.events[position] = edited;
        Ok(())
    }

    //=========== Registration operations ====================================

    /// Registers `person` for the event named `event_name`.
    ///
    /// # Errors
    /// - `PersonNotFound` / `EventNotFound` when either side is absent.
    /// - `AlreadyRegistered` when the registration already exists.
    pub fn register_person_for_event(
        &mut self,
        person: &Person,
        event_name: &EventName,
    ) -> StoreResult<()> {
        let (person_id, event_index) = self.resolve_registration(person, event_name)?;
        let event = &mut self.events[event_index];
        if event.is_registered(person_id) {
            return Err(StoreError::AlreadyRegistered(event_name.clone()));
        }
        let end = event.attendees().len();
        event.insert_attendee(end, person_id);
        Ok(())
    }

    /// Removes the registration of `person` for `event_name`.
    ///
    /// Returns the attendee slot the person occupied.
    pub fn deregister_person_from_event(
        &mut self,
        person: &Person,
        event_name: &EventName,
    ) -> StoreResult<usize> {
        let (person_id, event_index) = self.resolve_registration(person, event_name)?;
        let event = &mut self.events[event_index];
        let slot = event
            .attendee_position(person_id)
            .ok_or_else(|| StoreError::NotRegistered(event_name.clone()))?;
        event.remove_attendee_at(slot);
        Ok(slot)
    }

    /// Re-adds a registration at a specific attendee slot.
    pub fn reinstate_registration(
        &mut self,
        person: &Person,
        event_name: &EventName,
        position: usize,
    ) -> StoreResult<()> {
        let (person_id, event_index) = self.resolve_registration(person, event_name)?;
        let event = &mut self.events[event_index];
        if event.is_registered(person_id) {
            return Err(StoreError::AlreadyRegistered(event_name.clone()));
        }
        check_position(position, event.attendees().len())?;
        event.insert_attendee(position, person_id);
        Ok(())
    }

    /// Checks every store invariant. Used when adopting external snapshots.
    pub fn verify_integrity(&self) -> StoreResult<()> {
        let mut ids = HashSet::new();
        for (index, person) in self.persons.iter().enumerate() {
            if !ids.insert(person.id)
                || self.persons[..index]
                    .iter()
                    .any(|other| other.same_values_as(person))
            {
                return Err(StoreError::DuplicatePerson);
            }
        }

        let mut names = HashSet::new();
        for event in &self.events {
            if !names.insert(&event.name) {
                return Err(StoreError::DuplicateEvent(event.name.clone()));
            }
            let mut attendees = HashSet::new();
            for id in event.attendees() {
                if !ids.contains(id) {
                    return Err(StoreError::PersonNotFound);
                }
                if !attendees.insert(id) {
                    return Err(StoreError::AlreadyRegistered(event.name.clone()));
                }
            }
        }
        Ok(())
    }

    fn person_position(&self, target: &Person) -> Option<usize> {
        self.persons
            .iter()
            .position(|person| person.same_values_as(target))
    }

    fn event_position(&self, name: &EventName) -> Option<usize> {
        self.events.iter().position(|event| &event.name == name)
    }

    fn resolve_registration(
        &self,
        person: &Person,
        event_name: &EventName,
    ) -> StoreResult<(PersonId, usize)> {
        let person_id = self
            .person_position(person)
            .map(|index| self.persons[index].id)
            .ok_or(StoreError::PersonNotFound)?;
        let event_index = self
            .event_position(event_name)
            .ok_or_else(|| StoreError::EventNotFound(event_name.clone()))?;
        Ok((person_id, event_index))
    }

    fn ensure_person_admissible(&self, person: &Person, skip: Option<usize>) -> StoreResult<()> {
        let collides = self.persons.iter().enumerate().any(|(index, existing)| {
            Some(index) != skip && (existing.id == person.id || existing.same_values_as(person))
        });
        if collides {
            return Err(StoreError::DuplicatePerson);
        }
        Ok(())
    }

    fn ensure_event_admissible(&self, event: &EpicEvent, skip: Option<usize>) -> StoreResult<()> {
        let collides = self
            .events
            .iter()
            .enumerate()
            .any(|(index, existing)| Some(index) != skip && existing.same_name_as(event));
        if collides {
            return Err(StoreError::DuplicateEvent(event.name.clone()));
        }

        let mut seen = HashSet::new();
        for id in event.attendees() {
            if self.person_by_id(*id).is_none() {
                return Err(StoreError::PersonNotFound);
            }
            if !seen.insert(*id) {
                return Err(StoreError::AlreadyRegistered(event.name.clone()));
            }
        }
        Ok(())
    }
}

fn check_position(position: usize, len: usize) -> StoreResult<()> {
    if position > len {
        return Err(StoreError::InvalidPosition { position, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{EventPlanner, StoreError};
    use crate::model::event::EpicEvent;
    use crate::model::fields::{Address, Email, EventName, Name, Phone, Tag};
    use crate::model::person::Person;

    fn person(name: &str, phone: &str) -> Person {
        Person::new(
            Name::parse(name).unwrap(),
            Phone::parse(phone).unwrap(),
            Email::parse("someone@example.com").unwrap(),
            Address::parse("Blk 30 Geylang Street 29").unwrap(),
            [Tag::parse("friends").unwrap()],
        )
    }

    fn event_name(name: &str) -> EventName {
        EventName::parse(name).unwrap()
    }

    #[test]
    fn add_person_rejects_value_duplicate_and_leaves_store_unchanged() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();
        let before = planner.clone();

        let twin = person("Alice", "111");
        assert_eq!(planner.add_person(twin), Err(StoreError::DuplicatePerson));
        assert_eq!(planner, before);
    }

    #[test]
    fn remove_person_cascades_registrations_and_restore_reinstates_slots() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        let bob = person("Bob", "222");
        planner.add_person(alice.clone()).unwrap();
        planner.add_person(bob.clone()).unwrap();
        planner.add_event(EpicEvent::new(event_name("Gala"))).unwrap();
        planner
            .register_person_for_event(&bob, &event_name("Gala"))
            .unwrap();
        planner
            .register_person_for_event(&alice, &event_name("Gala"))
            .unwrap();
        let before = planner.clone();

        let removal = planner.remove_person(&bob).unwrap();
        assert_eq!(removal.position, 1);
        assert_eq!(removal.registrations.len(), 1);
        assert_eq!(removal.registrations[0].position, 0);
        assert_eq!(
            planner.event_by_name(&event_name("Gala")).unwrap().attendees(),
            &[alice.id]
        );

        planner.restore_person(&removal).unwrap();
        assert_eq!(planner, before);
    }

    #[test]
    fn update_person_keeps_position_and_registrations() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();
        planner.add_person(person("Bob", "222")).unwrap();
        planner.add_event(EpicEvent::new(event_name("Gala"))).unwrap();
        planner
            .register_person_for_event(&alice, &event_name("Gala"))
            .unwrap();

        let mut edited = alice.clone();
        edited.phone = Phone::parse("333").unwrap();
        planner.update_person(&alice, edited.clone()).unwrap();

        assert_eq!(planner.persons()[0], edited);
        let gala = planner.event_by_name(&event_name("Gala")).unwrap();
        assert_eq!(planner.registered_persons(gala), vec![&edited]);
    }

    #[test]
    fn update_person_rejects_collision_with_other_person() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();
        planner.add_person(person("Bob", "222")).unwrap();
        let before = planner.clone();

        let mut edited = alice.clone();
        edited.name = Name::parse("Bob").unwrap();
        edited.phone = Phone::parse("222").unwrap();
        assert_eq!(
            planner.update_person(&alice, edited),
            Err(StoreError::DuplicatePerson)
        );
        assert_eq!(planner, before);
    }

    #[test]
    fn events_are_unique_by_name() {
        let mut planner = EventPlanner::new();
        planner.add_event(EpicEvent::new(event_name("Gala"))).unwrap();
        assert_eq!(
            planner.add_event(EpicEvent::new(event_name("Gala"))),
            Err(StoreError::DuplicateEvent(event_name("Gala")))
        );

        planner.add_event(EpicEvent::new(event_name("Picnic"))).unwrap();
        let gala = planner.events()[0].clone();
        assert_eq!(
            planner.update_event(&gala, gala.renamed(event_name("Picnic"))),
            Err(StoreError::DuplicateEvent(event_name("Picnic")))
        );
    }

    #[test]
    fn registration_requires_live_entities_and_rejects_repeats() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();

        assert_eq!(
            planner.register_person_for_event(&alice, &event_name("Gala")),
            Err(StoreError::EventNotFound(event_name("Gala")))
        );

        planner.add_event(EpicEvent::new(event_name("Gala"))).unwrap();
        assert_eq!(
            planner.register_person_for_event(&person("Ghost", "999"), &event_name("Gala")),
            Err(StoreError::PersonNotFound)
        );

        planner
            .register_person_for_event(&alice, &event_name("Gala"))
            .unwrap();
        assert_eq!(
            planner.register_person_for_event(&alice, &event_name("Gala")),
            Err(StoreError::AlreadyRegistered(event_name("Gala")))
        );
    }

    #[test]
    fn remove_and_restore_event_preserves_order_and_attendees() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();
        planner.add_event(EpicEvent::new(event_name("Gala"))).unwrap();
        planner.add_event(EpicEvent::new(event_name("Picnic"))).unwrap();
        planner
            .register_person_for_event(&alice, &event_name("Gala"))
            .unwrap();
        let before = planner.clone();

        let gala = planner.events()[0].clone();
        let removal = planner.remove_event(&gala).unwrap();
        assert_eq!(planner.events().len(), 1);
        planner.restore_event(&removal).unwrap();
        assert_eq!(planner, before);
    }

    #[test]
    fn verify_integrity_detects_dangling_registration() {
        let mut planner = EventPlanner::new();
        let alice = person("Alice", "111");
        planner.add_person(alice.clone()).unwrap();
        let mut gala = EpicEvent::new(event_name("Gala"));
        gala.insert_attendee(0, alice.id);
        planner.add_event(gala).unwrap();
        assert!(planner.verify_integrity().is_ok());

        planner.persons.clear();
        assert_eq!(planner.verify_integrity(), Err(StoreError::PersonNotFound));
    }
}
