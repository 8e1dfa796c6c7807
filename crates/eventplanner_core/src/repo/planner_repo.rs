//! Planner snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Write full store snapshots (persons, tags, events, registrations).
//! - Read a snapshot back into a validated `EventPlanner`.
//!
//! # Invariants
//! - `save_planner` replaces every snapshot row in one immediate transaction.
//! - Person and event order is kept through the `position` column.
//! - Attendee order is kept through the registration `slot` column.

use crate::db::DbError;
use crate::model::event::EpicEvent;
use crate::model::fields::{Address, Email, EventName, Name, Phone, Tag, ValidationError};
use crate::model::person::{Person, PersonId};
use crate::model::planner::{EventPlanner, StoreError};
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const REQUIRED_TABLES: [&str; 4] = ["persons", "person_tags", "events", "registrations"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Snapshot persistence failures.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot table `{table}` is missing")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted planner data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Repository interface for whole-store snapshots.
pub trait PlannerRepository {
    /// Replaces the persisted snapshot with `planner`.
    fn save_planner(&mut self, planner: &EventPlanner) -> RepoResult<()>;
    /// Reads the persisted snapshot. An untouched database yields an empty store.
    fn load_planner(&self) -> RepoResult<EventPlanner>;
}

/// SQLite-backed snapshot repository owning its connection.
pub struct SqlitePlannerRepository {
    conn: Connection,
}

impl SqlitePlannerRepository {
    /// Wraps a connection returned by [`crate::db::open_db`].
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the snapshot schema is absent.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(&conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Releases the underlying connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl PlannerRepository for SqlitePlannerRepository {
    fn save_planner(&mut self, planner: &EventPlanner) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute_batch(
            "DELETE FROM registrations;
             DELETE FROM person_tags;
             DELETE FROM events;
             DELETE FROM persons;",
        )?;

        {
            let mut insert_person = tx.prepare(
                "INSERT INTO persons (position, person_uuid, name, phone, email, address)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            let mut insert_tag =
                tx.prepare("INSERT INTO person_tags (person_uuid, tag) VALUES (?1, ?2);")?;
            for (position, person) in planner.persons().iter().enumerate() {
                let person_uuid = person.id.to_string();
                insert_person.execute(params![
                    to_sql_position(position)?,
                    person_uuid,
                    person.name.as_str(),
                    person.phone.as_str(),
                    person.email.as_str(),
                    person.address.as_str(),
                ])?;
                for tag in &person.tags {
                    insert_tag.execute(params![person_uuid, tag.as_str()])?;
                }
            }

            let mut insert_event =
                tx.prepare("INSERT INTO events (position, name) VALUES (?1, ?2);")?;
            let mut insert_registration = tx.prepare(
                "INSERT INTO registrations (event_name, slot, person_uuid)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (position, event) in planner.events().iter().enumerate() {
                insert_event.execute(params![to_sql_position(position)?, event.name.as_str()])?;
                for (slot, person_id) in event.attendees().iter().enumerate() {
                    insert_registration.execute(params![
                        event.name.as_str(),
                        to_sql_position(slot)?,
                        person_id.to_string(),
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_planner(&self) -> RepoResult<EventPlanner> {
        let mut tags_by_person: HashMap<String, Vec<Tag>> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT person_uuid, tag FROM person_tags ORDER BY person_uuid, tag;")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (person_uuid, tag) = row?;
                tags_by_person
                    .entry(person_uuid)
                    .or_default()
                    .push(Tag::parse(tag)?);
            }
        }

        let mut planner = EventPlanner::new();
        let mut persons_by_id: HashMap<PersonId, Person> = HashMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT person_uuid, name, phone, email, address
                 FROM persons
                 ORDER BY position ASC;",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PersonRow {
                    person_uuid: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                    email: row.get(3)?,
                    address: row.get(4)?,
                })
            })?;
            for row in rows {
                let row = row?;
                let tags = tags_by_person.remove(&row.person_uuid).unwrap_or_default();
                let person = Person::with_id(
                    parse_person_uuid(&row.person_uuid)?,
                    Name::parse(row.name)?,
                    Phone::parse(row.phone)?,
                    Email::parse(row.email)?,
                    Address::parse(row.address)?,
                    tags,
                );
                persons_by_id.insert(person.id, person.clone());
                planner.add_person(person)?;
            }
        }

        {
            let mut stmt = self
                .conn
                .prepare("SELECT name FROM events ORDER BY position ASC;")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for name in rows {
                planner.add_event(EpicEvent::new(EventName::parse(name?)?))?;
            }
        }

        {
            let mut stmt = self.conn.prepare(
                "SELECT event_name, person_uuid
                 FROM registrations
                 ORDER BY event_name ASC, slot ASC;",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (event_name, person_uuid) = row?;
                let person_id = parse_person_uuid(&person_uuid)?;
                let person = persons_by_id.get(&person_id).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "registration references unknown person `{person_uuid}`"
                    ))
                })?;
                planner.register_person_for_event(person, &EventName::parse(event_name)?)?;
            }
        }

        Ok(planner)
    }
}

struct PersonRow {
    person_uuid: String,
    name: String,
    phone: String,
    email: String,
    address: String,
}

fn parse_person_uuid(value: &str) -> RepoResult<PersonId> {
    Uuid::parse_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid person uuid `{value}`: {err}")))
}

fn to_sql_position(position: usize) -> RepoResult<i64> {
    i64::try_from(position)
        .map_err(|_| RepoError::InvalidData(format!("position {position} exceeds i64 range")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
