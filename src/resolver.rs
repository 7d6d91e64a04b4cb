use std::collections::HashSet;

use thiserror::Error;

use crate::event::{EnrichedEvent, canonical_season};
use crate::store::EventStore;

/// Sentinel season label that selects every season.
pub const ALL_SEASONS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid entity name: {0}")]
    InvalidEntityName(String),
    #[error("invalid season name: {0}")]
    InvalidSeasonName(String),
}

/// Outcome of applying a season filter. An empty filter is not an error;
/// callers answer it with a guidance envelope instead of a record.
#[derive(Debug)]
pub enum SeasonSelection<'s> {
    MissingFilter,
    Rows(Vec<&'s EnrichedEvent>),
}

pub fn require_team(store: &EventStore, name: &str) -> Result<(), QueryError> {
    if store.is_team(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidEntityName(name.to_string()))
    }
}

pub fn require_player(store: &EventStore, name: &str) -> Result<(), QueryError> {
    if store.is_player(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidEntityName(name.to_string()))
    }
}

/// Restricts the store to the requested seasons. Labels are canonicalized
/// before validation, so a raw split-year label selects the same rows as
/// its canonical form. `All` anywhere in the list overrides the rest.
pub fn season_rows<'s>(
    store: &'s EventStore,
    seasons: &[String],
) -> Result<SeasonSelection<'s>, QueryError> {
    let mut unrestricted = false;
    let mut wanted: HashSet<&str> = HashSet::new();
    for label in seasons {
        if label == ALL_SEASONS {
            unrestricted = true;
            continue;
        }
        let canonical = canonical_season(label);
        if !store.is_season(canonical) {
            return Err(QueryError::InvalidSeasonName(label.clone()));
        }
        wanted.insert(canonical);
    }
    if seasons.is_empty() {
        return Ok(SeasonSelection::MissingFilter);
    }
    let rows = if unrestricted {
        store.all_events()
    } else {
        store
            .rows()
            .iter()
            .filter(|ev| wanted.contains(ev.season()))
            .collect()
    };
    Ok(SeasonSelection::Rows(rows))
}
