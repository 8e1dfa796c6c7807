//! Reversible units of work over the model.
//!
//! # Responsibility
//! - Define the two-phase command contract (`preprocess` then `execute`)
//!   plus `undo` for reversible commands.
//! - Map store rule violations to user-facing command errors.
//!
//! # Invariants
//! - `preprocess` resolves every index into an entity snapshot, so later
//!   relisting cannot change what `execute` acts on.
//! - `execute` validates before writing; a failed command leaves the model
//!   untouched.
//! - `undo` only runs for commands whose `execute` succeeded, so its failure
//!   is an internal consistency error, never a user error.

use crate::model::manager::ModelManager;
use crate::model::planner::StoreError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub mod clear;
pub mod event;
pub mod history;
pub mod index;
pub mod person;
pub mod query;
pub mod registration;

pub use index::{Index, IndexTarget};

pub type CommandResult<T> = Result<T, CommandError>;

/// Failures surfaced by command submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A value-equal person, a same-named event or an existing registration.
    DuplicateEntity(String),
    /// Referenced person, event or registration is absent.
    EntityNotFound(String),
    /// An edit that would change no field.
    NoFieldEdited,
    /// Index falls outside the current filtered view.
    InvalidIndex {
        target: IndexTarget,
        index: Index,
        len: usize,
    },
    /// Programming invariant violated; not caused by user input.
    InternalConsistency(String),
}

impl CommandError {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalConsistency(_))
    }

    /// Stable code for log lines; carries no user data.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateEntity(_) => "duplicate_entity",
            Self::EntityNotFound(_) => "entity_not_found",
            Self::NoFieldEdited => "no_field_edited",
            Self::InvalidIndex { .. } => "invalid_index",
            Self::InternalConsistency(_) => "internal_consistency",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEntity(message) | Self::EntityNotFound(message) => {
                write!(f, "{message}")
            }
            Self::NoFieldEdited => write!(f, "at least one field to edit must be provided"),
            Self::InvalidIndex { target, index, len } => write!(
                f,
                "the {target} index {} is invalid; {len} {target}(s) currently listed",
                index.one_based()
            ),
            Self::InternalConsistency(message) => {
                write!(f, "internal consistency error: {message}")
            }
        }
    }
}

impl Error for CommandError {}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicatePerson
            | StoreError::DuplicateEvent(_)
            | StoreError::AlreadyRegistered(_) => Self::DuplicateEntity(value.to_string()),
            StoreError::PersonNotFound
            | StoreError::EventNotFound(_)
            | StoreError::NotRegistered(_) => Self::EntityNotFound(value.to_string()),
            StoreError::InvalidPosition { .. } => Self::InternalConsistency(value.to_string()),
        }
    }
}

/// Unit of work submitted to the logic service.
pub trait Command: Debug + Send {
    /// Stable keyword naming this command in logs.
    fn command_word(&self) -> &'static str;

    /// Resolves index references against the current filtered views.
    fn preprocess(&mut self, _model: &ModelManager) -> CommandResult<()> {
        Ok(())
    }

    /// Applies the command and returns the feedback message.
    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String>;

    /// Whether the command enters the undo history.
    fn is_undoable(&self) -> bool {
        false
    }

    /// Reverts a successful `execute`.
    fn undo(&mut self, _model: &mut ModelManager) -> CommandResult<()> {
        Err(CommandError::InternalConsistency(format!(
            "`{}` cannot be undone",
            self.command_word()
        )))
    }

    /// Human-readable summary used for undo/redo feedback and history listing.
    fn description(&self) -> String;
}

/// Wraps a store failure that cannot legitimately happen at this point.
pub(crate) fn inconsistency(context: &str, err: StoreError) -> CommandError {
    CommandError::InternalConsistency(format!("{context}: {err}"))
}

/// Error for running `execute`/`undo` on a command that skipped `preprocess`.
pub(crate) fn not_preprocessed(command_word: &str) -> CommandError {
    CommandError::InternalConsistency(format!("`{command_word}` executed before preprocess"))
}
