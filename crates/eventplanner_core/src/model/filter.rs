//! Predicates driving the filtered person and event views.

use crate::model::event::EpicEvent;
use crate::model::fields::EventName;
use crate::model::person::Person;
use std::sync::Arc;

/// Replaceable filter for the person view.
pub type PersonPredicate = Arc<dyn Fn(&Person) -> bool + Send + Sync>;

/// Replaceable filter for the event view.
pub type EventPredicate = Arc<dyn Fn(&EpicEvent) -> bool + Send + Sync>;

/// What the person view currently selects.
#[derive(Clone)]
pub enum PersonFilter {
    /// Persons accepted by a predicate.
    Matching(PersonPredicate),
    /// Attendees of the named event, read from the store on every access.
    RegisteredFor(EventName),
}

pub fn show_all_persons() -> PersonPredicate {
    Arc::new(|_: &Person| true)
}

pub fn show_all_events() -> EventPredicate {
    Arc::new(|_: &EpicEvent| true)
}

/// Matches persons whose name contains any keyword as a whole word,
/// ignoring case.
pub fn name_contains_keywords(keywords: &[String]) -> PersonPredicate {
    let keywords = normalize_keywords(keywords);
    Arc::new(move |person: &Person| {
        person
            .name
            .words()
            .any(|word| keywords.contains(&word.to_lowercase()))
    })
}

/// Matches events whose name contains any keyword as a whole word,
/// ignoring case.
pub fn event_name_contains_keywords(keywords: &[String]) -> EventPredicate {
    let keywords = normalize_keywords(keywords);
    Arc::new(move |event: &EpicEvent| {
        event
            .name
            .words()
            .any(|word| keywords.contains(&word.to_lowercase()))
    })
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
