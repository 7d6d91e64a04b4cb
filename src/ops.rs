use std::collections::BTreeMap;
use std::env;

use rayon::prelude::*;
use serde::Serialize;

use crate::assemble::{Calculator, Envelope, assemble};
use crate::resolver::{self, QueryError, SeasonSelection};
use crate::store::EventStore;

#[derive(Debug, Clone, Serialize)]
pub struct SeasonsList {
    pub seasons: Vec<String>,
    pub total_seasons: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamsList {
    pub teams: Vec<String>,
    pub total_teams: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayersList {
    pub total_players: usize,
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamPlayersList {
    pub team: String,
    pub total_players: usize,
    pub players: Vec<String>,
}

/// Both halves of a player comparison, keyed by player name.
#[derive(Debug, Serialize)]
pub struct PlayerComparison {
    pub batsman_comparison: BTreeMap<String, Envelope>,
    pub bowler_comparison: BTreeMap<String, Envelope>,
}

/// Canonical season labels with the all-seasons sentinel first.
pub fn all_seasons(store: &EventStore) -> SeasonsList {
    let mut seasons = vec![resolver::ALL_SEASONS.to_string()];
    seasons.extend(store.season_labels());
    let total_seasons = seasons.len();
    SeasonsList { seasons, total_seasons }
}

pub fn all_teams(store: &EventStore) -> TeamsList {
    let teams = store.team_names();
    let total_teams = teams.len();
    TeamsList { teams, total_teams }
}

pub fn all_players(store: &EventStore) -> PlayersList {
    let players = store.player_names();
    PlayersList { total_players: players.len(), players }
}

pub fn team_players(store: &EventStore, team: &str) -> Result<TeamPlayersList, QueryError> {
    resolver::require_team(store, team)?;
    let players = store.squad(team);
    Ok(TeamPlayersList {
        team: team.to_string(),
        total_players: players.len(),
        players,
    })
}

pub fn team_record(
    store: &EventStore,
    team: &str,
    seasons: &[String],
) -> Result<Envelope, QueryError> {
    resolver::require_team(store, team)?;
    record_for(store, Calculator::Team(team), seasons)
}

pub fn batsman_record(
    store: &EventStore,
    player: &str,
    seasons: &[String],
) -> Result<Envelope, QueryError> {
    resolver::require_player(store, player)?;
    record_for(store, Calculator::Batsman(player), seasons)
}

pub fn bowler_record(
    store: &EventStore,
    player: &str,
    seasons: &[String],
) -> Result<Envelope, QueryError> {
    resolver::require_player(store, player)?;
    record_for(store, Calculator::Bowler(player), seasons)
}

fn record_for(
    store: &EventStore,
    calc: Calculator<'_>,
    seasons: &[String],
) -> Result<Envelope, QueryError> {
    match resolver::season_rows(store, seasons)? {
        SeasonSelection::MissingFilter => Ok(Envelope::missing_filter()),
        SeasonSelection::Rows(rows) => Ok(assemble(calc, &rows)),
    }
}

/// Full-history batting and bowling records for each named player, fanned
/// out across a thread pool. Name validation happens up front so one bad
/// name rejects the whole comparison.
pub fn compare_players(
    store: &EventStore,
    players: &[String],
) -> Result<PlayerComparison, QueryError> {
    for player in players {
        resolver::require_player(store, player)?;
    }
    let every_season = vec![resolver::ALL_SEASONS.to_string()];
    let pairs: Result<Vec<_>, QueryError> = in_compare_pool(|| {
        players
            .par_iter()
            .map(|player| {
                let batting = batsman_record(store, player, &every_season)?;
                let bowling = bowler_record(store, player, &every_season)?;
                Ok((player.clone(), batting, bowling))
            })
            .collect()
    });

    let mut comparison = PlayerComparison {
        batsman_comparison: BTreeMap::new(),
        bowler_comparison: BTreeMap::new(),
    };
    for (player, batting, bowling) in pairs? {
        comparison.batsman_comparison.insert(player.clone(), batting);
        comparison.bowler_comparison.insert(player, bowling);
    }
    Ok(comparison)
}

fn in_compare_pool<T: Send>(op: impl FnOnce() -> T + Send) -> T {
    let threads = env::var("COMPARE_PARALLELISM")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 16);
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(op),
        // The global pool still runs the comparison if a scoped pool
        // cannot be spawned.
        Err(_) => op(),
    }
}
