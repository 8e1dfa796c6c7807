//! Clears the whole store.

use crate::command::{not_preprocessed, Command, CommandResult};
use crate::model::manager::ModelManager;
use crate::model::planner::EventPlanner;

/// Empties the event planner; undo restores the prior content verbatim.
#[derive(Debug, Clone, Default)]
pub struct ClearCommand {
    previous: Option<EventPlanner>,
}

impl ClearCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for ClearCommand {
    fn command_word(&self) -> &'static str {
        "clear"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        self.previous = Some(model.planner().clone());
        model.reset_data(EventPlanner::new());
        Ok("Event planner has been cleared!".to_string())
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        model.reset_data(previous);
        Ok(())
    }

    fn description(&self) -> String {
        "clear event planner".to_string()
    }
}
