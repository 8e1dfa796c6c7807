use eventplanner_core::command::clear::ClearCommand;
use eventplanner_core::command::event::{AddEventCommand, DeleteEventCommand};
use eventplanner_core::command::person::{
    AddPersonCommand, DeletePersonCommand, EditPersonCommand, EditPersonDescriptor,
};
use eventplanner_core::command::query::{FindPersonsCommand, ListPersonsCommand};
use eventplanner_core::command::registration::{DeregisterPersonCommand, RegisterPersonCommand};
use eventplanner_core::{
    Address, CommandError, Email, EventName, EventPlanner, HistoryDirection, HistoryError, Index,
    IndexTarget, LogicService, Name, Person, Phone, Tag,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const GRADUATION: &str = "AY201718 Graduation";

#[test]
fn register_undo_redo_touches_only_the_registration() {
    let service = LogicService::new();
    let graduation = event_name(GRADUATION);
    service
        .submit(Box::new(AddEventCommand::new(graduation.clone())))
        .unwrap();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();

    let message = service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_one_based(1).unwrap(),
            graduation.clone(),
        )))
        .unwrap();
    assert_eq!(
        message,
        "Registered person Alice Pauline for event AY201718 Graduation"
    );
    assert_eq!(attendee_names(&service, &graduation), vec!["Alice Pauline"]);

    service.undo_last().unwrap();
    assert!(attendee_names(&service, &graduation).is_empty());
    let snapshot = service.snapshot();
    assert_eq!(snapshot.persons().len(), 1);
    assert!(snapshot.has_event(&graduation));

    service.redo_last().unwrap();
    assert_eq!(attendee_names(&service, &graduation), vec!["Alice Pauline"]);
}

#[test]
fn register_for_missing_event_fails_without_entering_history() {
    let service = LogicService::with_planner(planner_with_alice()).unwrap();

    let err = service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            event_name("Nonexistent Event"),
        )))
        .unwrap_err();

    assert_eq!(
        err,
        CommandError::EntityNotFound("The event specified cannot be found".to_string())
    );
    assert_eq!(
        service.undo_last(),
        Err(HistoryError::NoHistory(HistoryDirection::Undo))
    );
}

#[test]
fn out_of_range_index_is_rejected_before_any_change() {
    let service = LogicService::new();
    let err = service
        .submit(Box::new(DeletePersonCommand::new(Index::from_zero_based(0))))
        .unwrap_err();

    assert_eq!(
        err,
        CommandError::InvalidIndex {
            target: IndexTarget::Person,
            index: Index::from_zero_based(0),
            len: 0,
        }
    );
    assert!(!service.can_undo());
}

#[test]
fn duplicates_are_rejected_and_history_is_unchanged() {
    let service = LogicService::new();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap();
    service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            event_name(GRADUATION),
        )))
        .unwrap();
    let history_before = service.history();

    // Same values under a fresh identity still count as the same person.
    let person_err = service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap_err();
    let event_err = service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap_err();
    let registration_err = service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            event_name(GRADUATION),
        )))
        .unwrap_err();

    assert!(matches!(person_err, CommandError::DuplicateEntity(_)));
    assert!(matches!(event_err, CommandError::DuplicateEntity(_)));
    assert!(matches!(registration_err, CommandError::DuplicateEntity(_)));
    assert_eq!(service.history(), history_before);
    assert_eq!(service.snapshot().persons().len(), 1);
}

#[test]
fn undoing_and_redoing_k_commands_restores_each_state() {
    let service = LogicService::new();
    let mut states = vec![service.snapshot()];

    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    states.push(service.snapshot());
    service
        .submit(Box::new(AddPersonCommand::new(benson())))
        .unwrap();
    states.push(service.snapshot());
    service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap();
    states.push(service.snapshot());
    service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(1),
            event_name(GRADUATION),
        )))
        .unwrap();
    states.push(service.snapshot());
    service
        .submit(Box::new(DeletePersonCommand::new(Index::from_zero_based(1))))
        .unwrap();
    states.push(service.snapshot());

    let n = states.len() - 1;
    for k in 1..=n {
        service.undo_last().unwrap();
        assert_eq!(service.snapshot(), states[n - k]);
    }
    assert!(!service.can_undo());
    for k in 1..=n {
        service.redo_last().unwrap();
        assert_eq!(service.snapshot(), states[k]);
    }
    assert!(!service.can_redo());
}

#[test]
fn submitting_after_undo_discards_the_redo_branch() {
    let service = LogicService::new();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    service
        .submit(Box::new(AddPersonCommand::new(benson())))
        .unwrap();
    service.undo_last().unwrap();
    assert!(service.can_redo());

    service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap();

    assert!(!service.can_redo());
    assert_eq!(
        service.redo_last(),
        Err(HistoryError::NoHistory(HistoryDirection::Redo))
    );
    assert_eq!(
        service.history(),
        vec![
            "add person Alice Pauline".to_string(),
            format!("add event {GRADUATION}"),
        ]
    );
}

#[test]
fn queries_do_not_disturb_undo_or_redo() {
    let service = LogicService::new();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    service.undo_last().unwrap();

    service.submit(Box::new(ListPersonsCommand)).unwrap();

    assert!(service.can_redo());
    service.redo_last().unwrap();
    assert_eq!(service.snapshot().persons().len(), 1);
}

#[test]
fn indices_refer_to_the_filtered_view() {
    let service = LogicService::new();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    service
        .submit(Box::new(AddPersonCommand::new(benson())))
        .unwrap();

    let message = service
        .submit(Box::new(FindPersonsCommand::new(vec!["benson".to_string()])))
        .unwrap();
    assert_eq!(message, "1 persons listed!");

    service
        .submit(Box::new(DeletePersonCommand::new(Index::from_zero_based(0))))
        .unwrap();

    let remaining = service.current_persons(|_| true);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name.as_str(), "Alice Pauline");
}

#[test]
fn adding_a_person_resets_the_person_filter() {
    let service = LogicService::new();
    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    service
        .submit(Box::new(FindPersonsCommand::new(vec!["nobody".to_string()])))
        .unwrap();
    assert!(service.filtered_persons().is_empty());

    service
        .submit(Box::new(AddPersonCommand::new(benson())))
        .unwrap();

    assert_eq!(service.filtered_persons().len(), 2);
}

#[test]
fn editing_a_person_keeps_registrations() {
    let service = LogicService::with_planner(planner_with_alice()).unwrap();
    let graduation = event_name(GRADUATION);
    service
        .submit(Box::new(AddEventCommand::new(graduation.clone())))
        .unwrap();
    service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            graduation.clone(),
        )))
        .unwrap();

    let descriptor = EditPersonDescriptor {
        name: Some(Name::parse("Alice Tan").unwrap()),
        ..EditPersonDescriptor::default()
    };
    service
        .submit(Box::new(EditPersonCommand::new(
            Index::from_zero_based(0),
            descriptor,
        )))
        .unwrap();
    assert_eq!(attendee_names(&service, &graduation), vec!["Alice Tan"]);

    service.undo_last().unwrap();
    assert_eq!(attendee_names(&service, &graduation), vec!["Alice Pauline"]);
}

#[test]
fn deleting_a_person_cascades_and_undo_restores_attendee_order() {
    let service = LogicService::new();
    let graduation = event_name(GRADUATION);
    service
        .submit(Box::new(AddEventCommand::new(graduation.clone())))
        .unwrap();
    for person in [alice(), benson(), carl()] {
        service.submit(Box::new(AddPersonCommand::new(person))).unwrap();
    }
    for index in 0..3 {
        service
            .submit(Box::new(RegisterPersonCommand::new(
                Index::from_zero_based(index),
                graduation.clone(),
            )))
            .unwrap();
    }
    let before = service.snapshot();

    service
        .submit(Box::new(DeletePersonCommand::new(Index::from_zero_based(1))))
        .unwrap();
    assert_eq!(
        attendee_names(&service, &graduation),
        vec!["Alice Pauline", "Carl Kurz"]
    );
    assert!(service.snapshot().verify_integrity().is_ok());

    service.undo_last().unwrap();
    assert_eq!(service.snapshot(), before);
}

#[test]
fn deregister_then_undo_reinstates_the_same_slot() {
    let service = LogicService::new();
    let graduation = event_name(GRADUATION);
    service
        .submit(Box::new(AddEventCommand::new(graduation.clone())))
        .unwrap();
    for person in [alice(), benson()] {
        service.submit(Box::new(AddPersonCommand::new(person))).unwrap();
    }
    for index in 0..2 {
        service
            .submit(Box::new(RegisterPersonCommand::new(
                Index::from_zero_based(index),
                graduation.clone(),
            )))
            .unwrap();
    }

    service
        .submit(Box::new(DeregisterPersonCommand::new(
            Index::from_zero_based(0),
            graduation.clone(),
        )))
        .unwrap();
    assert_eq!(attendee_names(&service, &graduation), vec!["Benson Meier"]);

    let again = service
        .submit(Box::new(DeregisterPersonCommand::new(
            Index::from_zero_based(0),
            graduation.clone(),
        )))
        .unwrap_err();
    assert!(matches!(again, CommandError::EntityNotFound(_)));

    service.undo_last().unwrap();
    assert_eq!(
        attendee_names(&service, &graduation),
        vec!["Alice Pauline", "Benson Meier"]
    );
}

#[test]
fn deleting_an_event_and_undoing_brings_back_its_attendees() {
    let service = LogicService::with_planner(planner_with_alice()).unwrap();
    let graduation = event_name(GRADUATION);
    service
        .submit(Box::new(AddEventCommand::new(graduation.clone())))
        .unwrap();
    service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            graduation.clone(),
        )))
        .unwrap();

    service
        .submit(Box::new(DeleteEventCommand::new(Index::from_zero_based(0))))
        .unwrap();
    assert!(!service.snapshot().has_event(&graduation));

    service.undo_last().unwrap();
    assert_eq!(attendee_names(&service, &graduation), vec!["Alice Pauline"]);
}

#[test]
fn registering_for_a_just_deleted_event_is_not_found() {
    let service = LogicService::with_planner(planner_with_alice()).unwrap();
    service
        .submit(Box::new(AddEventCommand::new(event_name("Gala"))))
        .unwrap();
    service
        .submit(Box::new(DeleteEventCommand::new(Index::from_zero_based(0))))
        .unwrap();
    let history_before = service.history();

    let err = service
        .submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            event_name("Gala"),
        )))
        .unwrap_err();

    assert_eq!(
        err,
        CommandError::EntityNotFound("The event specified cannot be found".to_string())
    );
    assert_eq!(service.history(), history_before);
    assert!(service.snapshot().events().is_empty());
}

#[test]
fn clear_is_reversible() {
    let service = LogicService::with_planner(planner_with_alice()).unwrap();
    service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap();
    let before = service.snapshot();

    let message = service.submit(Box::new(ClearCommand::new())).unwrap();
    assert_eq!(message, "Event planner has been cleared!");
    assert!(service.snapshot().is_empty());

    service.undo_last().unwrap();
    assert_eq!(service.snapshot(), before);
}

#[test]
fn listeners_fire_once_per_committed_change_only() {
    let service = LogicService::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    service.on_store_changed(Arc::new(move |_: &EventPlanner| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    service
        .submit(Box::new(AddPersonCommand::new(alice())))
        .unwrap_err();
    service.submit(Box::new(ListPersonsCommand)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    service.undo_last().unwrap();
    service.redo_last().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    service.redo_last().unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn listener_sees_the_committed_snapshot() {
    let service = Arc::new(LogicService::new());
    let observer = Arc::clone(&service);
    let matched = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&matched);
    service.on_store_changed(Arc::new(move |snapshot: &EventPlanner| {
        // Runs outside the engine lock, so reading back must not deadlock.
        if observer.snapshot() == *snapshot {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }));

    service
        .submit(Box::new(AddEventCommand::new(event_name(GRADUATION))))
        .unwrap();

    assert_eq!(matched.load(Ordering::SeqCst), 1);
}

#[test]
fn listeners_receive_snapshots_in_commit_order() {
    let service = Arc::new(LogicService::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    service.on_store_changed(Arc::new(move |snapshot: &EventPlanner| {
        let events = snapshot.events().len();
        if events == 1 {
            thread::sleep(Duration::from_millis(300));
        }
        recorder.lock().unwrap().push(events);
    }));

    let first = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            service
                .submit(Box::new(AddEventCommand::new(event_name("One"))))
                .unwrap();
        })
    };
    while service.snapshot().events().is_empty() {
        thread::sleep(Duration::from_millis(1));
    }
    service
        .submit(Box::new(AddEventCommand::new(event_name("Two"))))
        .unwrap();
    first.join().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn concurrent_submissions_are_serialized() {
    let service = Arc::new(LogicService::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for round in 0..5 {
                    let name = event_name(&format!("Workshop {worker} {round}"));
                    service
                        .submit(Box::new(AddEventCommand::new(name)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(service.snapshot().events().len(), 40);
    assert_eq!(service.history().len(), 40);
    assert!(service.snapshot().verify_integrity().is_ok());
}

fn attendee_names(service: &LogicService, name: &EventName) -> Vec<String> {
    let snapshot = service.snapshot();
    let event = snapshot.event_by_name(name).unwrap();
    snapshot
        .registered_persons(event)
        .into_iter()
        .map(|person| person.name.to_string())
        .collect()
}

fn planner_with_alice() -> EventPlanner {
    let mut planner = EventPlanner::new();
    planner.add_person(alice()).unwrap();
    planner
}

fn event_name(value: &str) -> EventName {
    EventName::parse(value).unwrap()
}

fn person(name: &str, phone: &str, email: &str, address: &str, tags: &[&str]) -> Person {
    Person::new(
        Name::parse(name).unwrap(),
        Phone::parse(phone).unwrap(),
        Email::parse(email).unwrap(),
        Address::parse(address).unwrap(),
        tags.iter().map(|tag| Tag::parse(*tag).unwrap()),
    )
}

fn alice() -> Person {
    person(
        "Alice Pauline",
        "85355255",
        "alice@example.com",
        "123, Jurong West Ave 6, #08-111",
        &["friends"],
    )
}

fn benson() -> Person {
    person(
        "Benson Meier",
        "98765432",
        "johnd@example.com",
        "311, Clementi Ave 2, #02-25",
        &["owesMoney", "friends"],
    )
}

fn carl() -> Person {
    person(
        "Carl Kurz",
        "95352563",
        "heinz@example.com",
        "wall street",
        &[],
    )
}
