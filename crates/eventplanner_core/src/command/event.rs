//! Event add/delete/edit commands.

use crate::command::{
    inconsistency, not_preprocessed, Command, CommandError, CommandResult, Index, IndexTarget,
};
use crate::model::event::EpicEvent;
use crate::model::fields::EventName;
use crate::model::manager::ModelManager;
use crate::model::planner::{EventRemoval, StoreError};

/// Adds one event with no registrations.
#[derive(Debug, Clone)]
pub struct AddEventCommand {
    event: EpicEvent,
}

impl AddEventCommand {
    pub fn new(name: EventName) -> Self {
        Self {
            event: EpicEvent::new(name),
        }
    }
}

impl Command for AddEventCommand {
    fn command_word(&self) -> &'static str {
        "add-event"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.add_event(self.event.clone())?;
        Ok(format!("New event added: {}", self.event))
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        model
            .delete_event(&self.event)
            .map(|_| ())
            .map_err(|err| inconsistency("added event vanished before undo", err))
    }

    fn description(&self) -> String {
        format!("add event {}", self.event)
    }
}

/// Deletes the event at an index of the filtered event view.
#[derive(Debug, Clone)]
pub struct DeleteEventCommand {
    index: Index,
    target: Option<EpicEvent>,
    removal: Option<EventRemoval>,
}

impl DeleteEventCommand {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            removal: None,
        }
    }
}

impl Command for DeleteEventCommand {
    fn command_word(&self) -> &'static str {
        "delete-event"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        let view = model.filtered_events();
        self.target = Some(self.index.resolve(&view, IndexTarget::Event)?.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        let removal = model.delete_event(target).map_err(|err| match err {
            StoreError::EventNotFound(_) => {
                inconsistency("the target event cannot be missing", err)
            }
            other => CommandError::from(other),
        })?;
        let message = format!("Deleted event: {}", removal.event);
        self.removal = Some(removal);
        Ok(message)
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let removal = self
            .removal
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        model
            .restore_event(removal)
            .map_err(|err| inconsistency("deleted event cannot be reinstated", err))
    }

    fn description(&self) -> String {
        match &self.target {
            Some(event) => format!("delete event {event}"),
            None => format!("delete event #{}", self.index.one_based()),
        }
    }
}

/// Field changes for an event edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditEventDescriptor {
    pub name: Option<EventName>,
}

impl EditEventDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
    }

    /// Builds the edited form of `event`, carrying its registrations over.
    pub fn apply_to(&self, event: &EpicEvent) -> EpicEvent {
        let name = self.name.clone().unwrap_or_else(|| event.name.clone());
        event.renamed(name)
    }
}

/// Replaces the event at an index of the filtered event view.
#[derive(Debug, Clone)]
pub struct EditEventCommand {
    index: Index,
    descriptor: EditEventDescriptor,
    target: Option<EpicEvent>,
    edited: Option<EpicEvent>,
}

impl EditEventCommand {
    pub fn new(index: Index, descriptor: EditEventDescriptor) -> Self {
        Self {
            index,
            descriptor,
            target: None,
            edited: None,
        }
    }
}

impl Command for EditEventCommand {
    fn command_word(&self) -> &'static str {
        "edit-event"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        if !self.descriptor.is_any_field_edited() {
            return Err(CommandError::NoFieldEdited);
        }
        let view = model.filtered_events();
        let target = self.index.resolve(&view, IndexTarget::Event)?;
        self.edited = Some(self.descriptor.apply_to(target));
        self.target = Some(target.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let (Some(target), Some(edited)) = (&self.target, &self.edited) else {
            return Err(not_preprocessed(self.command_word()));
        };
        model
            .update_event(target, edited.clone())
            .map_err(|err| match err {
                StoreError::EventNotFound(_) => {
                    inconsistency("the target event cannot be missing", err)
                }
                other => CommandError::from(other),
            })?;
        Ok(format!("Edited event: {edited}"))
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let (Some(target), Some(edited)) = (&self.target, &self.edited) else {
            return Err(not_preprocessed(self.command_word()));
        };
        model
            .update_event(edited, target.clone())
            .map_err(|err| inconsistency("edited event cannot be reverted", err))
    }

    fn description(&self) -> String {
        match &self.target {
            Some(event) => format!("edit event {event}"),
            None => format!("edit event #{}", self.index.one_based()),
        }
    }
}
