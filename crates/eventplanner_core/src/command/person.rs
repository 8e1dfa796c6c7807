//! Person add/delete/edit commands.

use crate::command::{
    inconsistency, not_preprocessed, Command, CommandError, CommandResult, Index, IndexTarget,
};
use crate::model::fields::{Address, Email, Name, Phone, Tag};
use crate::model::manager::ModelManager;
use crate::model::person::Person;
use crate::model::planner::{PersonRemoval, StoreError};
use std::collections::BTreeSet;

/// Adds one person to the store.
#[derive(Debug, Clone)]
pub struct AddPersonCommand {
    person: Person,
}

impl AddPersonCommand {
    pub fn new(person: Person) -> Self {
        Self { person }
    }
}

impl Command for AddPersonCommand {
    fn command_word(&self) -> &'static str {
        "add"
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        model.add_person(self.person.clone())?;
        Ok(format!("New person added: {}", self.person))
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        model
            .delete_person(&self.person)
            .map(|_| ())
            .map_err(|err| inconsistency("added person vanished before undo", err))
    }

    fn description(&self) -> String {
        format!("add person {}", self.person.name)
    }
}

/// Deletes the person at an index of the filtered person view.
#[derive(Debug, Clone)]
pub struct DeletePersonCommand {
    index: Index,
    target: Option<Person>,
    removal: Option<PersonRemoval>,
}

impl DeletePersonCommand {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            removal: None,
        }
    }
}

impl Command for DeletePersonCommand {
    fn command_word(&self) -> &'static str {
        "delete"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        let view = model.filtered_persons();
        self.target = Some(self.index.resolve(&view, IndexTarget::Person)?.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| not_preprocessed(self.command_word()))?;
        let removal = model.delete_person(target).map_err(|err| match err {
            StoreError::PersonNotFound => {
                inconsistency("the target person cannot be missing", err)
            }
            other => CommandError::from(other),
        })?;
        let message = format!("Deleted person: {}", removal.person);
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
            .restore_person(removal)
            .map_err(|err| inconsistency("deleted person cannot be reinstated", err))
    }

    fn description(&self) -> String {
        match &self.target {
            Some(person) => format!("delete person {}", person.name),
            None => format!("delete person #{}", self.index.one_based()),
        }
    }
}

/// Field changes for an edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPersonDescriptor {
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl EditPersonDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.tags.is_some()
    }

    /// Builds the edited form of `person`, keeping its identity.
    pub fn apply_to(&self, person: &Person) -> Person {
        Person {
            id: person.id,
            name: self.name.clone().unwrap_or_else(|| person.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| person.phone.clone()),
            email: self.email.clone().unwrap_or_else(|| person.email.clone()),
            address: self
                .address
                .clone()
                .unwrap_or_else(|| person.address.clone()),
            tags: self.tags.clone().unwrap_or_else(|| person.tags.clone()),
        }
    }
}

/// Replaces the person at an index of the filtered person view.
#[derive(Debug, Clone)]
pub struct EditPersonCommand {
    index: Index,
    descriptor: EditPersonDescriptor,
    target: Option<Person>,
    edited: Option<Person>,
}

impl EditPersonCommand {
    pub fn new(index: Index, descriptor: EditPersonDescriptor) -> Self {
        Self {
            index,
            descriptor,
            target: None,
            edited: None,
        }
    }
}

impl Command for EditPersonCommand {
    fn command_word(&self) -> &'static str {
        "edit"
    }

    fn preprocess(&mut self, model: &ModelManager) -> CommandResult<()> {
        if !self.descriptor.is_any_field_edited() {
            return Err(CommandError::NoFieldEdited);
        }
        let view = model.filtered_persons();
        let target = self.index.resolve(&view, IndexTarget::Person)?;
        self.edited = Some(self.descriptor.apply_to(target));
        self.target = Some(target.clone());
        Ok(())
    }

    fn execute(&mut self, model: &mut ModelManager) -> CommandResult<String> {
        let (Some(target), Some(edited)) = (&self.target, &self.edited) else {
            return Err(not_preprocessed(self.command_word()));
        };
        model
            .update_person(target, edited.clone())
            .map_err(|err| match err {
                StoreError::PersonNotFound => {
                    inconsistency("the target person cannot be missing", err)
                }
                other => CommandError::from(other),
            })?;
        Ok(format!("Edited person: {edited}"))
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn undo(&mut self, model: &mut ModelManager) -> CommandResult<()> {
        let (Some(target), Some(edited)) = (&self.target, &self.edited) else {
            return Err(not_preprocessed(self.command_word()));
        };
        model
            .update_person(edited, target.clone())
            .map_err(|err| inconsistency("edited person cannot be reverted", err))
    }

    fn description(&self) -> String {
        match &self.target {
            Some(person) => format!("edit person {}", person.name),
            None => format!("edit person #{}", self.index.one_based()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AddPersonCommand, DeletePersonCommand, EditPersonCommand, EditPersonDescriptor};
    use crate::command::{Command, CommandError, Index};
    use crate::model::fields::{Address, Email, Name, Phone, Tag};
    use crate::model::filter::name_contains_keywords;
    use crate::model::manager::ModelManager;
    use crate::model::person::Person;

    fn person(name: &str) -> Person {
        Person::new(
            Name::parse(name).unwrap(),
            Phone::parse("98765432").unwrap(),
            Email::parse("someone@example.com").unwrap(),
            Address::parse("311, Clementi Ave 2").unwrap(),
            [Tag::parse("owesMoney").unwrap()],
        )
    }

    #[test]
    fn add_then_undo_removes_person() {
        let mut model = ModelManager::new();
        let mut command = AddPersonCommand::new(person("Alice"));

        let message = command.execute(&mut model).unwrap();
        assert!(message.starts_with("New person added: Alice"));
        assert_eq!(model.planner().persons().len(), 1);

        command.undo(&mut model).unwrap();
        assert!(model.planner().persons().is_empty());
    }

    #[test]
    fn add_duplicate_is_rejected() {
        let mut model = ModelManager::new();
        model.add_person(person("Alice")).unwrap();

        let err = AddPersonCommand::new(person("Alice"))
            .execute(&mut model)
            .unwrap_err();
        assert!(matches!(err, CommandError::DuplicateEntity(_)));
    }

    #[test]
    fn delete_acts_on_person_resolved_before_the_view_changed() {
        let mut model = ModelManager::new();
        model.add_person(person("Alice")).unwrap();
        model.add_person(person("Bob")).unwrap();

        let mut command = DeletePersonCommand::new(Index::from_one_based(1).unwrap());
        command.preprocess(&model).unwrap();
        // Bob now sits at the index Alice was resolved from.
        model.update_filtered_person_list(name_contains_keywords(&["bob".to_string()]));
        command.execute(&mut model).unwrap();

        let names: Vec<_> = model
            .planner()
            .persons()
            .iter()
            .map(|person| person.name.to_string())
            .collect();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn delete_rejects_out_of_range_index() {
        let model = ModelManager::new();
        let err = DeletePersonCommand::new(Index::from_one_based(1).unwrap())
            .preprocess(&model)
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidIndex { len: 0, .. }));
    }

    #[test]
    fn execute_without_preprocess_is_internal_error() {
        let mut model = ModelManager::new();
        let err = DeletePersonCommand::new(Index::from_zero_based(0))
            .execute(&mut model)
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn edit_keeps_identity_and_undo_restores_original() {
        let mut model = ModelManager::new();
        let alice = person("Alice");
        model.add_person(alice.clone()).unwrap();

        let descriptor = EditPersonDescriptor {
            phone: Some(Phone::parse("11112222").unwrap()),
            tags: Some(Default::default()),
            ..Default::default()
        };
        assert!(descriptor.is_any_field_edited());
        let mut command = EditPersonCommand::new(Index::from_zero_based(0), descriptor);
        command.preprocess(&model).unwrap();
        command.execute(&mut model).unwrap();

        let edited = &model.planner().persons()[0];
        assert_eq!(edited.id, alice.id);
        assert_eq!(edited.phone.as_str(), "11112222");
        assert!(edited.tags.is_empty());

        command.undo(&mut model).unwrap();
        assert_eq!(model.planner().persons()[0], alice);
    }

    #[test]
    fn edit_without_changed_fields_is_rejected() {
        let mut model = ModelManager::new();
        model.add_person(person("Alice")).unwrap();

        let mut command =
            EditPersonCommand::new(Index::from_zero_based(0), EditPersonDescriptor::default());
        let err = command.preprocess(&model).unwrap_err();

        assert_eq!(err, CommandError::NoFieldEdited);
        assert!(!err.is_internal());
    }
}
