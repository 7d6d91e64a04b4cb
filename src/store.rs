use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::event::{Delivery, DismissalKind, EnrichedEvent, ExtraType, MatchMeta, canonical_season};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Validation(String),
}

/// Raw row of the match table, column names as published.
#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "Season")]
    season: String,
    #[serde(rename = "MatchNumber")]
    match_number: String,
    #[serde(rename = "Team1")]
    team1: String,
    #[serde(rename = "Team2")]
    team2: String,
    #[serde(rename = "WinningTeam")]
    winning_team: Option<String>,
    #[serde(rename = "Player_of_Match")]
    player_of_match: Option<String>,
    #[serde(rename = "Team1Players")]
    team1_players: String,
    #[serde(rename = "Team2Players")]
    team2_players: String,
}

/// Raw row of the ball-by-ball table.
#[derive(Debug, Deserialize)]
struct RawDelivery {
    #[serde(rename = "ID")]
    id: u32,
    innings: u8,
    overs: u8,
    ballnumber: u8,
    batter: String,
    bowler: String,
    #[serde(rename = "non-striker")]
    non_striker: String,
    extra_type: Option<String>,
    batsman_run: u8,
    extras_run: u8,
    total_run: u8,
    non_boundary: u8,
    #[serde(rename = "isWicketDelivery")]
    is_wicket_delivery: u8,
    player_out: Option<String>,
    kind: Option<String>,
    fielders_involved: Option<String>,
    #[serde(rename = "BattingTeam")]
    batting_team: String,
}

/// Loaded, validated event data plus the name registries derived from the
/// match table. Immutable once built; queries borrow rows out of it.
#[derive(Debug)]
pub struct EventStore {
    rows: Vec<EnrichedEvent>,
    matches: Vec<Arc<MatchMeta>>,
    teams: HashSet<String>,
    players: HashSet<String>,
    seasons: HashSet<String>,
    squads: HashMap<String, BTreeSet<String>>,
}

impl EventStore {
    /// Joins deliveries to their match rows. Rejects duplicate match ids
    /// and deliveries that reference no match; silently drops super-over
    /// innings (innings 3 and up). Season labels are canonicalized here so
    /// everything downstream sees one label per season.
    pub fn from_parts(matches: Vec<MatchMeta>, deliveries: Vec<Delivery>) -> Result<Self, LoadError> {
        let mut by_id: BTreeMap<u32, Arc<MatchMeta>> = BTreeMap::new();
        for mut meta in matches {
            meta.season = canonical_season(&meta.season).to_string();
            let id = meta.id;
            if by_id.insert(id, Arc::new(meta)).is_some() {
                return Err(LoadError::Validation(format!("duplicate match id {id}")));
            }
        }

        let mut teams = HashSet::new();
        let mut players = HashSet::new();
        let mut seasons = HashSet::new();
        let mut squads: HashMap<String, BTreeSet<String>> = HashMap::new();
        for meta in by_id.values() {
            teams.insert(meta.team1.clone());
            teams.insert(meta.team2.clone());
            seasons.insert(meta.season.clone());
            for (team, squad) in [
                (&meta.team1, &meta.team1_players),
                (&meta.team2, &meta.team2_players),
            ] {
                let entry = squads.entry(team.clone()).or_default();
                for name in squad {
                    players.insert(name.clone());
                    entry.insert(name.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(deliveries.len());
        for delivery in deliveries {
            if !(1..=2).contains(&delivery.innings) {
                continue;
            }
            let meta = by_id.get(&delivery.match_id).ok_or_else(|| {
                LoadError::Validation(format!(
                    "delivery references unknown match id {}",
                    delivery.match_id
                ))
            })?;
            rows.push(EnrichedEvent {
                delivery,
                meta: Arc::clone(meta),
            });
        }

        Ok(EventStore {
            rows,
            matches: by_id.into_values().collect(),
            teams,
            players,
            seasons,
            squads,
        })
    }

    pub fn from_csv<M: Read, D: Read>(matches: M, deliveries: D) -> Result<Self, LoadError> {
        Self::from_parts(read_matches(matches)?, read_deliveries(deliveries)?)
    }

    pub fn from_csv_paths(matches: &Path, deliveries: &Path) -> Result<Self, LoadError> {
        Self::from_csv(File::open(matches)?, File::open(deliveries)?)
    }

    pub fn rows(&self) -> &[EnrichedEvent] {
        &self.rows
    }

    pub fn all_events(&self) -> Vec<&EnrichedEvent> {
        self.rows.iter().collect()
    }

    pub fn matches(&self) -> &[Arc<MatchMeta>] {
        &self.matches
    }

    pub fn is_team(&self, name: &str) -> bool {
        self.teams.contains(name)
    }

    pub fn is_player(&self, name: &str) -> bool {
        self.players.contains(name)
    }

    pub fn is_season(&self, label: &str) -> bool {
        self.seasons.contains(label)
    }

    pub fn team_names(&self) -> Vec<String> {
        sorted(&self.teams)
    }

    pub fn player_names(&self) -> Vec<String> {
        sorted(&self.players)
    }

    pub fn season_labels(&self) -> Vec<String> {
        sorted(&self.seasons)
    }

    /// Every player who has appeared in the team's own eleven. Opposition
    /// players never leak in, no matter how often the sides met.
    pub fn squad(&self, team: &str) -> Vec<String> {
        self.squads
            .get(team)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn sorted(names: &HashSet<String>) -> Vec<String> {
    let mut out: Vec<String> = names.iter().cloned().collect();
    out.sort();
    out
}

fn read_matches<R: Read>(source: R) -> Result<Vec<MatchMeta>, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let mut out = Vec::new();
    for row in reader.deserialize::<RawMatch>() {
        let raw = row?;
        out.push(MatchMeta {
            id: raw.id,
            season: raw.season.trim().to_string(),
            match_number: raw.match_number.trim().to_string(),
            team1: raw.team1.trim().to_string(),
            team2: raw.team2.trim().to_string(),
            winner: non_empty(raw.winning_team),
            player_of_match: non_empty(raw.player_of_match),
            team1_players: parse_squad(&raw.team1_players),
            team2_players: parse_squad(&raw.team2_players),
        });
    }
    Ok(out)
}

fn read_deliveries<R: Read>(source: R) -> Result<Vec<Delivery>, LoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let mut out = Vec::new();
    for row in reader.deserialize::<RawDelivery>() {
        let raw = row?;
        let extra = ExtraType::parse(raw.extra_type.as_deref().unwrap_or("")).ok_or_else(|| {
            LoadError::Validation(format!(
                "unknown extra type {:?} in match {}",
                raw.extra_type.as_deref().unwrap_or(""),
                raw.id
            ))
        })?;
        let dismissal = match non_empty(raw.kind) {
            None => None,
            Some(token) => Some(DismissalKind::parse(&token).ok_or_else(|| {
                LoadError::Validation(format!(
                    "unknown dismissal kind {token:?} in match {}",
                    raw.id
                ))
            })?),
        };
        out.push(Delivery {
            match_id: raw.id,
            innings: raw.innings,
            over: raw.overs,
            ball_number: raw.ballnumber,
            batter: raw.batter.trim().to_string(),
            bowler: raw.bowler.trim().to_string(),
            non_striker: raw.non_striker.trim().to_string(),
            extra,
            batter_runs: raw.batsman_run,
            extra_runs: raw.extras_run,
            total_runs: raw.total_run,
            non_boundary: raw.non_boundary != 0,
            is_wicket: raw.is_wicket_delivery != 0,
            player_out: non_empty(raw.player_out),
            dismissal,
            fielders: non_empty(raw.fielders_involved),
            batting_team: raw.batting_team.trim().to_string(),
        });
    }
    Ok(out)
}

/// Blank and `NA` cells mean absent.
fn non_empty(raw: Option<String>) -> Option<String> {
    let value = raw?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Squad cells hold a bracketed, comma-separated list of quoted names. The
/// quote style flips between `'` and `"` depending on whether the name
/// itself contains an apostrophe, so both are stripped.
fn parse_squad(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(", ")
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCHES_CSV: &str = "\
ID,Season,MatchNumber,Team1,Team2,WinningTeam,Player_of_Match,Team1Players,Team2Players
1,2007/08,1,Amber Kings,Coral Blazers,Amber Kings,Ravi Mehta,\"['Ravi Mehta', 'Sunil Verma']\",\"['Dev Kapoor', 'Imran Shaikh']\"
2,2009,Final,Coral Blazers,Amber Kings,,,\"['Dev Kapoor', 'Imran Shaikh']\",\"['Ravi Mehta', 'Arjun Pillai']\"
";

    const BALLS_CSV: &str = "\
ID,innings,overs,ballnumber,batter,bowler,non-striker,extra_type,batsman_run,extras_run,total_run,non_boundary,isWicketDelivery,player_out,kind,fielders_involved,BattingTeam
1,1,0,1,Ravi Mehta,Imran Shaikh,Sunil Verma,NA,4,0,4,0,0,NA,NA,NA,Amber Kings
1,1,0,2,Ravi Mehta,Imran Shaikh,Sunil Verma,wides,0,1,1,0,0,NA,NA,NA,Amber Kings
1,1,0,3,Ravi Mehta,Imran Shaikh,Sunil Verma,NA,0,0,0,0,1,Ravi Mehta,caught,Dev Kapoor,Amber Kings
1,2,0,1,Dev Kapoor,Sunil Verma,Imran Shaikh,NA,1,0,1,0,0,NA,NA,NA,Coral Blazers
2,1,0,1,Dev Kapoor,Ravi Mehta,Imran Shaikh,legbyes,0,1,1,0,0,NA,NA,NA,Coral Blazers
2,3,0,1,Dev Kapoor,Ravi Mehta,Imran Shaikh,NA,6,0,6,0,0,NA,NA,NA,Coral Blazers
";

    fn store() -> EventStore {
        EventStore::from_csv(MATCHES_CSV.as_bytes(), BALLS_CSV.as_bytes())
            .expect("fixture data loads")
    }

    #[test]
    fn load_joins_canonicalizes_and_drops_super_overs() {
        let s = store();
        // The innings-3 row is dropped.
        assert_eq!(s.rows().len(), 5);
        assert!(s.is_season("2008"));
        assert!(!s.is_season("2007/08"));
        assert!(s.is_season("2009"));
        let first = &s.rows()[0];
        assert_eq!(first.meta.season, "2008");
        assert_eq!(first.meta.winner.as_deref(), Some("Amber Kings"));
        // Blank winner and player of match become absent.
        let last = s.rows().last().map(|ev| Arc::clone(&ev.meta));
        assert_eq!(last.and_then(|m| m.winner.clone()), None);
    }

    #[test]
    fn registries_come_from_the_match_table() {
        let s = store();
        assert_eq!(s.team_names(), vec!["Amber Kings", "Coral Blazers"]);
        // Arjun Pillai never bats or bowls but is on a roster.
        assert!(s.is_player("Arjun Pillai"));
        assert_eq!(s.player_names().len(), 5);
        assert_eq!(s.squad("Amber Kings"), vec!["Arjun Pillai", "Ravi Mehta", "Sunil Verma"]);
        assert!(s.squad("Amber Kings").iter().all(|p| p != "Dev Kapoor"));
    }

    #[test]
    fn wicket_fields_parse_into_enums() {
        let s = store();
        let wicket = &s.rows()[2];
        assert!(wicket.delivery.is_wicket);
        assert_eq!(wicket.delivery.dismissal, Some(DismissalKind::Caught));
        assert_eq!(wicket.delivery.player_out.as_deref(), Some("Ravi Mehta"));
        let wide = &s.rows()[1];
        assert_eq!(wide.delivery.extra, ExtraType::Wide);
        assert_eq!(wide.delivery.dismissal, None);
    }

    #[test]
    fn duplicate_match_ids_are_rejected() {
        let dup = "\
ID,Season,MatchNumber,Team1,Team2,WinningTeam,Player_of_Match,Team1Players,Team2Players
7,2019,1,Amber Kings,Coral Blazers,Amber Kings,Ravi Mehta,\"['Ravi Mehta']\",\"['Dev Kapoor']\"
7,2019,2,Amber Kings,Coral Blazers,Amber Kings,Ravi Mehta,\"['Ravi Mehta']\",\"['Dev Kapoor']\"
";
        let err = EventStore::from_csv(dup.as_bytes(), BALLS_CSV.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Validation(ref msg) if msg.contains("duplicate match id 7")));
    }

    #[test]
    fn orphan_deliveries_are_rejected() {
        let orphan = "\
ID,innings,overs,ballnumber,batter,bowler,non-striker,extra_type,batsman_run,extras_run,total_run,non_boundary,isWicketDelivery,player_out,kind,fielders_involved,BattingTeam
99,1,0,1,Ravi Mehta,Imran Shaikh,Sunil Verma,NA,0,0,0,0,0,NA,NA,NA,Amber Kings
";
        let err = EventStore::from_csv(MATCHES_CSV.as_bytes(), orphan.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Validation(ref msg) if msg.contains("unknown match id 99")));
    }

    #[test]
    fn unknown_extra_tokens_fail_the_load() {
        let bad = "\
ID,innings,overs,ballnumber,batter,bowler,non-striker,extra_type,batsman_run,extras_run,total_run,non_boundary,isWicketDelivery,player_out,kind,fielders_involved,BattingTeam
1,1,0,1,Ravi Mehta,Imran Shaikh,Sunil Verma,freehit,0,0,0,0,0,NA,NA,NA,Amber Kings
";
        let err = EventStore::from_csv(MATCHES_CSV.as_bytes(), bad.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Validation(ref msg) if msg.contains("unknown extra type")));
    }

    #[test]
    fn unknown_dismissal_tokens_fail_the_load() {
        let bad = "\
ID,innings,overs,ballnumber,batter,bowler,non-striker,extra_type,batsman_run,extras_run,total_run,non_boundary,isWicketDelivery,player_out,kind,fielders_involved,BattingTeam
1,1,0,1,Ravi Mehta,Imran Shaikh,Sunil Verma,NA,0,0,0,0,1,Ravi Mehta,timed out,NA,Amber Kings
";
        let err = EventStore::from_csv(MATCHES_CSV.as_bytes(), bad.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Validation(ref msg) if msg.contains("unknown dismissal kind")));
    }

    #[test]
    fn squad_lists_tolerate_both_quote_styles() {
        assert_eq!(
            parse_squad("['Ravi Mehta', \"D'Souza\", 'Sunil Verma']"),
            vec!["Ravi Mehta", "D'Souza", "Sunil Verma"]
        );
        assert_eq!(parse_squad("[]"), Vec::<String>::new());
    }
}
