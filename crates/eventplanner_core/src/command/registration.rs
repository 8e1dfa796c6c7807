//! Commands linking persons to events.
//!
//! The person comes from a pre-validated snapshot taken at preprocess, so a
//! missing person at execute time is an internal error. The event is named by
//! free-form input, so a missing event is a user-facing `EntityNotFound`.

use crate::command::{
    inconsistency, not_preprocessed, Command, CommandError, CommandResult, Index, IndexTarget,
};
use crate::model::fields::EventName;
use crate::model::manager::ModelManager;
use crate::model::person::Person;
use crate::model::planner::StoreError;

pub const MESSAGE_EVENT_NOT_FOUND: &str = "The event specified cannot be found";

fn map_registration_error(err: StoreError) -> CommandError {
    match err {
        StoreError::PersonNotFound => inconsistency("the target person cannot be missing", err),
        StoreError::EventNotFound(_) => {
            CommandError::EntityNotFound(MESSAGE_EVENT_NOT_FOUND.to_string())
        }
        other => CommandError::from(other),
    }
}

/// Registers the person at an index of the filtered person view for a
/// named event.
#[derive(Debug, Clone)]
pub struct RegisterPersonCommand {
    index: Index,
    event_name: EventName,
    person: Option<Person>,
}

impl RegisterPersonCommand {
    pub fn new(index: Index, event_name: EventName) -> Self {
        Self {
            index,
            event_name,
            person: None,
        }
    }
}

impl Command for RegisterPersonCommand {
    fn command_word(&self) -> &'static str {
        "register"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        let view = model.filtered_persons();
        self.person = Some(self.index.resolve(&view, IndexTarget::Person)?.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let person = self
            .person
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        model
            .register_person_for_event(person, &self.event_name)
            .map_err(map_registration_error)?;
        Ok(format!(
            "Registered person {} for event {}",
            person.name, self.event_name
        ))
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let person = self
            .person
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        model
            .deregister_person_from_event(person, &self.event_name)
            .map(|_| ())
            .map_err(|err| inconsistency("registration vanished before undo", err))
    }

    fn description(&self) -> String {
        match &self.person {
            Some(person) => format!("register {} for {}", person.name, self.event_name),
            None => format!(
                "register person #{} for {}",
                self.index.one_based(),
                self.event_name
            ),
        }
    }
}

/// Removes the registration of the person at an index of the filtered
/// person view from a named event.
#[derive(Debug, Clone)]
pub struct DeregisterPersonCommand {
    index: Index,
    event_name: EventName,
    person: Option<Person>,
    slot: Option<usize>,
}

impl DeregisterPersonCommand {
    pub fn new(index: Index, event_name: EventName) -> Self {
        Self {
            index,
            event_name,
            person: None,
            slot: None,
        }
    }
}

impl Command for DeregisterPersonCommand {
    fn command_word(&self) -> &'static str {
        "deregister"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        let view = model.filtered_persons();
        self.person = Some(self.index.resolve(&view, IndexTarget::Person)?.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let person = self
            .person
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        let slot = model
            .deregister_person_from_event(person, &self.event_name)
            .map_err(map_registration_error)?;
        let message = format!(
            "Deregistered person {} from event {}",
            person.name, self.event_name
        );
        self.slot = Some(slot);
        Ok(message)
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let (Some(person), Some(slot)) = (&self.person, self.slot) else {
            return Err(not_preprocessed(self.command_word()));
        };
        model
            .reinstate_registration(person, &self.event_name, slot)
            .map_err(|err| inconsistency("registration cannot be reinstated", err))
    }

    fn description(&self) -> String {
        match &self.person {
            Some(person) => format!("deregister {} from {}", person.name, self.event_name),
            None => format!(
                "deregister person #{} from {}",
                self.index.one_based(),
                self.event_name
            ),
        }
    }
}
