//! Model facade over the entity store.
//!
//! # Responsibility
//! - Provide the single mutation/query entry point used by commands.
//! - Maintain the filtered person and event views.
//! - Record that a committed mutation needs a change notification.
//!
//! # Invariants
//! - Business rules live in `EventPlanner`; this layer only delegates,
//!   tracks filters and marks changes.
//! - A change is marked only after the store accepted the mutation.

use crate::model::event::EpicEvent;
use crate::model::fields::EventName;
use crate::model::filter::{
    show_all_events, show_all_persons, EventPredicate, PersonFilter, PersonPredicate,
};
use crate::model::notifier::{ChangeNotifier, StoreListener};
use crate::model::person::Person;
use crate::model::planner::{EventPlanner, EventRemoval, PersonRemoval, StoreResult};
use log::debug;
use std::fmt::{Debug, Formatter};

/// In-memory model: store, filtered views and change tracking.
pub struct ModelManager {
    planner: EventPlanner,
    person_filter: PersonFilter,
    event_filter: EventPredicate,
    notifier: ChangeNotifier,
    pending_change: bool,
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelManager {
    pub fn new() -> Self {
        Self::with_planner(EventPlanner::new())
    }

    /// Creates a model over existing store content, showing everything.
    pub fn with_planner(planner: EventPlanner) -> Self {
        debug!(
            "event=model_init module=model status=ok persons={} events={}",
            planner.persons().len(),
            planner.events().len()
        );
        Self {
            planner,
            person_filter: PersonFilter::Matching(show_all_persons()),
            event_filter: show_all_events(),
            notifier: ChangeNotifier::new(),
            pending_change: false,
        }
    }

    pub fn planner(&self) -> &EventPlanner {
        &self.planner
    }

    /// Handle to the listener registry; clones share listeners.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn on_store_changed(&self, listener: StoreListener) {
        self.notifier.subscribe(listener);
    }

    /// Returns the committed snapshot if a change is pending, clearing the mark.
    pub fn take_pending_change(&mut self) -> Option<EventPlanner> {
        if !std::mem::take(&mut self.pending_change) {
            return None;
        }
        Some(self.planner.clone())
    }

    /// Publishes a pending change directly to listeners.
    ///
    /// Callers that share the model behind a lock should prefer
    /// `take_pending_change` and publish after releasing the lock.
    pub fn flush_changes(&mut self) {
        if let Some(snapshot) = self.take_pending_change() {
            self.notifier.publish(&snapshot);
        }
    }

    pub fn reset_data(&mut self, planner: EventPlanner) {
        self.planner.reset_data(planner);
        self.indicate_changed();
    }

    //=========== Person level operations ====================================

    pub fn add_person(&mut self, person: Person) -> StoreResult<()> {
        self.planner.add_person(person)?;
        self.update_filtered_person_list(show_all_persons());
        self.indicate_changed();
        Ok(())
    }

    pub fn delete_person(&mut self, target: &Person) -> StoreResult<PersonRemoval> {
        let removal = self.planner.remove_person(target)?;
        self.indicate_changed();
        Ok(removal)
    }

    pub fn restore_person(&mut self, removal: &PersonRemoval) -> StoreResult<()> {
        self.planner.restore_person(removal)?;
        self.indicate_changed();
        Ok(())
    }

    pub fn update_person(&mut self, target: &Person, edited: Person) -> StoreResult<()> {
        self.planner.update_person(target, edited)?;
        self.indicate_changed();
        Ok(())
    }

    //=========== Event level operations =====================================

    pub fn add_event(&mut self, event: EpicEvent) -> StoreResult<()> {
        self.planner.add_event(event)?;
        self.update_filtered_event_list(show_all_events());
        self.indicate_changed();
        Ok(())
    }

    pub fn delete_event(&mut self, target: &EpicEvent) -> StoreResult<EventRemoval> {
        let removal = self.planner.remove_event(target)?;
        self.indicate_changed();
        Ok(removal)
    }

    pub fn restore_event(&mut self, removal: &EventRemoval) -> StoreResult<()> {
        self.planner.restore_event(removal)?;
        self.indicate_changed();
        Ok(())
    }

    pub fn update_event(&mut self, target: &EpicEvent, edited: EpicEvent) -> StoreResult<()> {
        let renamed_to = edited.name.clone();
        self.planner.update_event(target, edited)?;
        if let PersonFilter::RegisteredFor(name) = &mut self.person_filter {
            if *name == target.name {
                *name = renamed_to;
            }
        }
        self.indicate_changed();
        Ok(())
    }

    //=========== Registration operations ====================================

    pub fn register_person_for_event(
        &mut self,
        person: &Person,
        event_name: &EventName,
    ) -> StoreResult<()> {
        self.planner.register_person_for_event(person, event_name)?;
        self.indicate_changed();
        Ok(())
    }

    pub fn deregister_person_from_event(
        &mut self,
        person: &Person,
        event_name: &EventName,
    ) -> StoreResult<usize> {
        let slot = self
            .planner
            .deregister_person_from_event(person, event_name)?;
        self.indicate_changed();
        Ok(slot)
    }

    pub fn reinstate_registration(
        &mut self,
        person: &Person,
        event_name: &EventName,
        position: usize,
    ) -> StoreResult<()> {
        self.planner
            .reinstate_registration(person, event_name, position)?;
        self.indicate_changed();
        Ok(())
    }

    //=========== Filtered list accessors ====================================

    /// Persons matching the current person filter, in store order.
    pub fn filtered_persons(&self) -> Vec<&Person> {
        let persons = self.planner.persons().iter();
        match &self.person_filter {
            PersonFilter::Matching(predicate) => {
                persons.filter(|person| predicate(*person)).collect()
            }
            PersonFilter::RegisteredFor(name) => {
                let attendees = self
                    .planner
                    .event_by_name(name)
                    .map(EpicEvent::attendees)
                    .unwrap_or_default();
                persons
                    .filter(|person| attendees.contains(&person.id))
                    .collect()
            }
        }
    }

    pub fn update_filtered_person_list(&mut self, predicate: PersonPredicate) {
        self.person_filter = PersonFilter::Matching(predicate);
    }

    /// Narrows the person view to the attendees of `event_name`.
    ///
    /// The view follows later registrations and renames of that event, and
    /// is empty while no event carries the name.
    pub fn show_registered_for(&mut self, event_name: EventName) {
        self.person_filter = PersonFilter::RegisteredFor(event_name);
    }

    /// Events matching the current event filter, in store order.
    pub fn filtered_events(&self) -> Vec<&EpicEvent> {
        self.planner
            .events()
            .iter()
            .filter(|event| (self.event_filter)(*event))
            .collect()
    }

    pub fn update_filtered_event_list(&mut self, predicate: EventPredicate) {
        self.event_filter = predicate;
    }

    fn indicate_changed(&mut self) {
        self.pending_change = true;
    }
}

impl Debug for ModelManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("planner", &self.planner)
            .field("pending_change", &self.pending_change)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::ModelManager;
    use crate::model::event::EpicEvent;
    use crate::model::fields::{Address, Email, EventName, Name, Phone};
    use crate::model::filter::name_contains_keywords;
    use crate::model::person::Person;
    use crate::model::planner::EventPlanner;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn person(name: &str) -> Person {
        Person::new(
            Name::parse(name).unwrap(),
            Phone::parse("94351253").unwrap(),
            Email::parse("someone@example.com").unwrap(),
            Address::parse("10th street").unwrap(),
            [],
        )
    }

    #[test]
    fn add_person_resets_filter_and_marks_single_change() {
        let mut model = ModelManager::new();
        model.add_person(person("Alice")).unwrap();
        model.update_filtered_person_list(name_contains_keywords(&["Bob".to_string()]));
        assert!(model.filtered_persons().is_empty());

        model.add_person(person("Carl")).unwrap();
        assert_eq!(model.filtered_persons().len(), 2);

        let snapshot = model.take_pending_change().expect("change should be pending");
        assert_eq!(snapshot.persons().len(), 2);
        assert!(model.take_pending_change().is_none());
    }

    #[test]
    fn failed_mutation_does_not_mark_change() {
        let mut model = ModelManager::new();
        let alice = person("Alice");
        model.add_person(alice.clone()).unwrap();
        model.take_pending_change();

        assert!(model.add_person(person("Alice")).is_err());
        assert!(model
            .register_person_for_event(&alice, &EventName::parse("Missing").unwrap())
            .is_err());
        assert!(model.take_pending_change().is_none());
    }

    #[test]
    fn flush_changes_publishes_to_listeners() {
        let mut model = ModelManager::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        model.on_store_changed(Arc::new(move |snapshot: &EventPlanner| {
            assert_eq!(snapshot.events().len(), 1);
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        model
            .add_event(EpicEvent::new(EventName::parse("Gala").unwrap()))
            .unwrap();
        model.flush_changes();
        model.flush_changes();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
