//! Undo/redo stacks over executed commands.
//!
//! # Invariants
//! - Only undoable commands are recorded.
//! - Recording a new command discards every undone command.
//! - Undo moves the newest past command to the future stack; redo is the
//!   exact mirror, so n pushes, k undos and k redos end in the same state.
//! - A failed undo/redo leaves the command on the stack it came from.

use crate::command::Command;
use crate::model::manager::ModelManager;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which stack an undo/redo request drew from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl Display for HistoryDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
        }
    }
}

/// Undo/redo failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The respective stack is empty.
    NoHistory(HistoryDirection),
    /// A recorded command could not be reverted or replayed.
    InternalConsistency(String),
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHistory(HistoryDirection::Undo) => write!(f, "no more commands to undo"),
            Self::NoHistory(HistoryDirection::Redo) => write!(f, "no more commands to redo"),
            Self::InternalConsistency(message) => {
                write!(f, "internal consistency error: {message}")
            }
        }
    }
}

impl Error for HistoryError {}

/// Past and undone commands, newest last.
#[derive(Debug, Default)]
pub struct CommandHistory {
    past: Vec<Box<dyn Command>>,
    future: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully executed command.
    ///
    /// Non-undoable commands are ignored and leave both stacks untouched.
    pub fn push(&mut self, command: Box<dyn Command>) {
        if !command.is_undoable() {
            return;
        }
        self.future.clear();
        self.past.push(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Descriptions of undoable commands, oldest first.
    pub fn past_descriptions(&self) -> Vec<String> {
        self.past.iter().map(|command| command.description()).collect()
    }

    /// Reverts the newest past command and returns its description.
    pub fn undo(&mut self, model: &mut ModelManager) -> Result<String, HistoryError> {
        let mut command = self
            .past
            .pop()
            .ok_or(HistoryError::NoHistory(HistoryDirection::Undo))?;

        match command.undo(model) {
            Ok(()) => {
                let description = command.description();
                info!(
                    "event=command_undo module=history status=ok command={} past={} future={}",
                    command.command_word(),
                    self.past.len(),
                    self.future.len() + 1
                );
                self.future.push(command);
                Ok(description)
            }
            Err(err) => {
                error!(
                    "event=command_undo module=history status=error command={} error={}",
                    command.command_word(),
                    err
                );
                self.past.push(command);
                Err(HistoryError::InternalConsistency(err.to_string()))
            }
        }
    }

    /// Replays the newest undone command and returns its description.
    pub fn redo(&mut self, model: &mut ModelManager) -> Result<String, HistoryError> {
        let mut command = self
            .future
            .pop()
            .ok_or(HistoryError::NoHistory(HistoryDirection::Redo))?;

        match command.execute(model) {
            Ok(_) => {
                let description = command.description();
                info!(
                    "event=command_redo module=history status=ok command={} past={} future={}",
                    command.command_word(),
                    self.past.len() + 1,
                    self.future.len()
                );
                self.past.push(command);
                Ok(description)
            }
            Err(err) => {
                error!(
                    "event=command_redo module=history status=error command={} error={}",
                    command.command_word(),
                    err
                );
                self.future.push(command);
                Err(HistoryError::InternalConsistency(err.to_string()))
            }
        }
    }
}
