//! Read-only commands that only change which entries the views show.
//!
//! None of these enter the undo history or mark a store change.

use crate::command::{not_preprocessed, Command, CommandResult, Index, IndexTarget};
use crate::model::event::EpicEvent;
use crate::model::filter::{
    event_name_contains_keywords, name_contains_keywords, show_all_events, show_all_persons,
};
use crate::model::manager::ModelManager;

/// Shows every person.
#[derive(Debug, Clone, Default)]
pub struct ListPersonsCommand;

impl Command for ListPersonsCommand {
    fn command_word(&self) -> &'static str {
        "list"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.update_filtered_person_list(show_all_persons());
        Ok("Listed all persons".to_string())
    }

    fn description(&self) -> String {
        "list persons".to_string()
    }
}

/// Shows persons whose name contains any of the keywords.
#[derive(Debug, Clone)]
pub struct FindPersonsCommand {
    keywords: Vec<String>,
}

impl FindPersonsCommand {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }
}

impl Command for FindPersonsCommand {
    fn command_word(&self) -> &'static str {
        "find"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.update_filtered_person_list(name_contains_keywords(&self.keywords));
        Ok(format!("{} persons listed!", model.filtered_persons().len()))
    }

    fn description(&self) -> String {
        format!("find persons {}", self.keywords.join(" "))
    }
}

/// Shows every event.
#[derive(Debug, Clone, Default)]
pub struct ListEventsCommand;

impl Command for ListEventsCommand {
    fn command_word(&self) -> &'static str {
        "list-events"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.update_filtered_event_list(show_all_events());
        Ok("Listed all events".to_string())
    }

    fn description(&self) -> String {
        "list events".to_string()
    }
}

/// Shows events whose name contains any of the keywords.
#[derive(Debug, Clone)]
pub struct FindEventsCommand {
    keywords: Vec<String>,
}

impl FindEventsCommand {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }
}

impl Command for FindEventsCommand {
    fn command_word(&self) -> &'static str {
        "find-event"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.update_filtered_event_list(event_name_contains_keywords(&self.keywords));
        Ok(format!("{} events listed!", model.filtered_events().len()))
    }

    fn description(&self) -> String {
        format!("find events {}", self.keywords.join(" "))
    }
}

/// Shows only the persons registered for the event at an index of the
/// filtered event view.
#[derive(Debug, Clone)]
pub struct ListRegisteredCommand {
    index: Index,
    event: Option<EpicEvent>,
}

impl ListRegisteredCommand {
    pub fn new(index: Index) -> Self {
        Self { index, event: None }
    }
}

impl Command for ListRegisteredCommand {
    fn command_word(&self) -> &'static str {
        "list-registered"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        let view = model.filtered_events();
        self.event = Some(self.index.resolve(&view, IndexTarget::Event)?.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let event = self
            .event
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        model.show_registered_for(event.name.clone());
        Ok(format!(
            "{} persons registered for event {}",
            model.filtered_persons().len(),
            event
        ))
    }

    fn description(&self) -> String {
        format!("list persons registered for event #{}", self.index.one_based())
    }
}
