//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `eventplanner_core` linkage.
//! - Walk one register/undo/redo round trip through `LogicService` and print
//!   every feedback line.
//!
//! Usage: `eventplanner_cli [DB_PATH]`. With a path, every committed change is
//! saved to that SQLite file and the next run starts from it.
//!
//! Logs go to `EVENTPLANNER_LOG_DIR` when set, else to
//! `<temp>/eventplanner-logs`. A logging setup failure is reported on stderr
//! and the run continues without file logs.

use eventplanner_core::command::event::AddEventCommand;
use eventplanner_core::command::person::AddPersonCommand;
use eventplanner_core::command::registration::RegisterPersonCommand;
use eventplanner_core::db::open_db;
use eventplanner_core::{
    Address, Email, EventName, Index, LogicService, Name, Person, Phone, SqlitePlannerRepository,
    StorageService, Tag,
};
use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

const GRADUATION: &str = "AY201718 Graduation";

fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = log_dir();
    match eventplanner_core::init_logging(
        eventplanner_core::default_log_level(),
        &log_dir.to_string_lossy(),
    ) {
        Ok(()) => println!("logging dir={}", log_dir.display()),
        Err(err) => eprintln!("logging disabled: {err}"),
    }

    println!("eventplanner_core ping={}", eventplanner_core::ping());
    println!("eventplanner_core version={}", eventplanner_core::core_version());

    let service = match std::env::args().nth(1) {
        Some(path) => {
            let repo = SqlitePlannerRepository::try_new(open_db(&path)?)?;
            let storage = Arc::new(StorageService::new(repo));
            let service = LogicService::with_planner(storage.load()?)?;
            Arc::clone(&storage).attach(&service);
            println!("storage path={path}");
            service
        }
        None => LogicService::new(),
    };

    let graduation = EventName::parse(GRADUATION)?;
    let alice = Person::new(
        Name::parse("Alice Pauline")?,
        Phone::parse("85355255")?,
        Email::parse("alice@example.com")?,
        Address::parse("123, Jurong West Ave 6, #08-111")?,
        [Tag::parse("friends")?],
    );

    report(
        "add-event",
        service.submit(Box::new(AddEventCommand::new(graduation.clone()))),
    );
    report("add", service.submit(Box::new(AddPersonCommand::new(alice))));
    report(
        "register",
        service.submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            graduation.clone(),
        ))),
    );
    print_attendees(&service, &graduation);

    report("undo", service.undo_last());
    print_attendees(&service, &graduation);
    report("redo", service.redo_last());
    print_attendees(&service, &graduation);

    report(
        "register",
        service.submit(Box::new(RegisterPersonCommand::new(
            Index::from_zero_based(0),
            EventName::parse("Nonexistent Event")?,
        ))),
    );
    println!("history={:?}", service.history());
    Ok(())
}

fn report<E: Error>(label: &str, result: Result<String, E>) {
    match result {
        Ok(message) => println!("{label}: {message}"),
        Err(err) => println!("{label} failed: {err}"),
    }
}

fn print_attendees(service: &LogicService, event_name: &EventName) {
    let snapshot = service.snapshot();
    let attendees = snapshot
        .event_by_name(event_name)
        .map(|event| {
            snapshot
                .registered_persons(event)
                .into_iter()
                .map(|person| person.name.to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    println!("attendees[{event_name}]={attendees:?}");
}

fn log_dir() -> PathBuf {
    log_dir_from(std::env::var_os("EVENTPLANNER_LOG_DIR"))
}

fn log_dir_from(configured: Option<OsString>) -> PathBuf {
    match configured {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir().join("eventplanner-logs"),
    }
}
