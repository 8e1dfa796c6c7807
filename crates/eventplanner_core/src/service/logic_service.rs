//! Command execution entry point.
//!
//! # Responsibility
//! - Run submitted commands through preprocess, execute and history capture.
//! - Expose undo/redo, read-only views and the change-notification hook.
//!
//! # Invariants
//! - One mutex guards the model and the history together, so a
//!   preprocess/execute pair and every undo/redo observe a stable store.
//! - Readers get cloned snapshots taken under the same lock and never see a
//!   half-applied mutation.
//! - Listeners run after the engine lock is released and only for committed
//!   changes, one publication at a time and in commit order.
//! - Listeners may read from the service but must not submit, undo or redo.

use crate::command::history::{CommandHistory, HistoryError};
use crate::command::{Command, CommandError, CommandResult};
use crate::model::event::EpicEvent;
use crate::model::manager::ModelManager;
use crate::model::notifier::{ChangeNotifier, StoreListener};
use crate::model::person::Person;
use crate::model::planner::{EventPlanner, StoreResult};
use log::{error, info, warn};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

struct Engine {
    model: ModelManager,
    history: CommandHistory,
    next_ticket: u64,
}

/// Single-owner command engine shared by writers and view readers.
pub struct LogicService {
    engine: Mutex<Engine>,
    published: Mutex<u64>,
    publish_turn: Condvar,
    notifier: ChangeNotifier,
}

impl Default for LogicService {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicService {
    /// Creates a service over an empty store.
    pub fn new() -> Self {
        Self::from_model(ModelManager::new())
    }

    /// Creates a service over existing store content.
    ///
    /// # Errors
    /// - Returns the first store invariant `planner` violates.
    pub fn with_planner(planner: EventPlanner) -> StoreResult<Self> {
        planner.verify_integrity()?;
        Ok(Self::from_model(ModelManager::with_planner(planner)))
    }

    fn from_model(model: ModelManager) -> Self {
        let notifier = model.notifier().clone();
        Self {
            engine: Mutex::new(Engine {
                model,
                history: CommandHistory::new(),
                next_ticket: 0,
            }),
            published: Mutex::new(0),
            publish_turn: Condvar::new(),
            notifier,
        }
    }

    /// Preprocesses, executes and records one command.
    ///
    /// Returns the command feedback message. Failed commands never enter
    /// the history and never mutate the store.
    pub fn submit(&self, mut command: Box<dyn Command>) -> CommandResult<String> {
        let started_at = Instant::now();
        let command_word = command.command_word();

        let result = self.commit(|engine| {
            let result = command
                .preprocess(&engine.model)
                .and_then(|()| command.execute(&mut engine.model));
            if result.is_ok() {
                engine.history.push(command);
            }
            result
        });

        match &result {
            Ok(_) => info!(
                "event=command_execute module=logic status=ok command={} duration_ms={}",
                command_word,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_command_failure(command_word, err),
        }
        result
    }

    /// Reverts the most recent undoable command.
    pub fn undo_last(&self) -> Result<String, HistoryError> {
        let result = self.commit(|engine| {
            let Engine { model, history, .. } = engine;
            history.undo(model)
        });
        result.map(|description| format!("Undo success: {description}"))
    }

    /// Replays the most recently undone command.
    pub fn redo_last(&self) -> Result<String, HistoryError> {
        let result = self.commit(|engine| {
            let Engine { model, history, .. } = engine;
            history.redo(model)
        });
        result.map(|description| format!("Redo success: {description}"))
    }

    pub fn can_undo(&self) -> bool {
        self.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().history.can_redo()
    }

    /// Descriptions of the commands that can currently be undone, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.past_descriptions()
    }

    /// Persons matching `predicate`, in store order.
    pub fn current_persons(&self, predicate: impl Fn(&Person) -> bool) -> Vec<Person> {
        self.lock()
            .model
            .planner()
            .persons()
            .iter()
            .filter(|person| predicate(*person))
            .cloned()
            .collect()
    }

    /// Events matching `predicate`, in store order.
    pub fn current_events(&self, predicate: impl Fn(&EpicEvent) -> bool) -> Vec<EpicEvent> {
        self.lock()
            .model
            .planner()
            .events()
            .iter()
            .filter(|event| predicate(*event))
            .cloned()
            .collect()
    }

    /// The person view as last set by a query command.
    pub fn filtered_persons(&self) -> Vec<Person> {
        self.lock()
            .model
            .filtered_persons()
            .into_iter()
            .cloned()
            .collect()
    }

    /// The event view as last set by a query command.
    pub fn filtered_events(&self) -> Vec<EpicEvent> {
        self.lock()
            .model
            .filtered_events()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Full copy of the committed store.
    pub fn snapshot(&self) -> EventPlanner {
        self.lock().model.planner().clone()
    }

    /// Registers a listener fired with each committed snapshot.
    pub fn on_store_changed(&self, listener: StoreListener) {
        self.notifier.subscribe(listener);
    }

    /// Runs `apply` under the engine lock and publishes any committed change.
    ///
    /// Each change draws a ticket while the engine is still locked; tickets
    /// are served strictly in order, so listeners see snapshots in commit
    /// order without the engine lock being held during delivery.
    fn commit<T>(&self, apply: impl FnOnce(&mut Engine) -> T) -> T {
        let (result, change) = {
            let mut engine = self.lock();
            let result = apply(&mut *engine);
            let change = engine.model.take_pending_change().map(|snapshot| {
                let ticket = engine.next_ticket;
                engine.next_ticket += 1;
                (ticket, snapshot)
            });
            (result, change)
        };

        if let Some((ticket, snapshot)) = change {
            let mut served = self
                .published
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            while *served != ticket {
                served = self
                    .publish_turn
                    .wait(served)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            self.publish(&snapshot);
            *served += 1;
            self.publish_turn.notify_all();
        }
        result
    }

    fn publish(&self, snapshot: &EventPlanner) {
        info!(
            "event=store_changed module=logic status=ok persons={} events={} listeners={}",
            snapshot.persons().len(),
            snapshot.events().len(),
            self.notifier.listener_count()
        );
        self.notifier.publish(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        // Every mutation validates before writing, so a poisoned guard still
        // holds a consistent store.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_command_failure(command_word: &str, err: &CommandError) {
    if err.is_internal() {
        error!(
            "event=command_execute module=logic status=error command={} error_code={} error={}",
            command_word,
            err.code(),
            err
        );
    } else {
        warn!(
            "event=command_execute module=logic status=rejected command={} error_code={}",
            command_word,
            err.code()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::LogicService;
    use crate::command::event::AddEventCommand;
    use crate::command::history::{HistoryDirection, HistoryError};
    use crate::command::CommandError;
    use crate::model::event::EpicEvent;
    use crate::model::fields::EventName;
    use crate::model::planner::{EventPlanner, StoreError};

    #[test]
    fn with_planner_rejects_dangling_registration() {
        let planner: EventPlanner = serde_json::from_value(serde_json::json!({
            "persons": [],
            "events": [{
                "name": "Gala",
                "attendees": ["11111111-2222-4333-8444-555555555555"]
            }]
        }))
        .unwrap();

        let err = LogicService::with_planner(planner).err();
        assert_eq!(err, Some(StoreError::PersonNotFound));
    }

    #[test]
    fn with_planner_keeps_existing_content() {
        let mut planner = EventPlanner::new();
        planner
            .add_event(EpicEvent::new(EventName::parse("Gala").unwrap()))
            .unwrap();
        let service = LogicService::with_planner(planner.clone()).unwrap();
        assert_eq!(service.snapshot(), planner);

        let err = service
            .submit(Box::new(AddEventCommand::new(
                EventName::parse("Gala").unwrap(),
            )))
            .unwrap_err();
        assert!(matches!(err, CommandError::DuplicateEntity(_)));
    }

    #[test]
    fn undo_and_redo_feedback_carries_description() {
        let service = LogicService::new();
        service
            .submit(Box::new(AddEventCommand::new(
                EventName::parse("Gala").unwrap(),
            )))
            .unwrap();

        assert_eq!(service.undo_last().unwrap(), "Undo success: add event Gala");
        assert_eq!(service.redo_last().unwrap(), "Redo success: add event Gala");
        assert_eq!(
            service.redo_last(),
            Err(HistoryError::NoHistory(HistoryDirection::Redo))
        );
    }
}
