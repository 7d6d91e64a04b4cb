use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::batsman_record;
use crate::bowler_record;
use crate::event::EnrichedEvent;
use crate::grouping::{before_last, partition_by};
use crate::metric::MetricRecord;
use crate::team_record;

/// The three record computations behind one shape, so the grouping and
/// delta orchestration is written once.
#[derive(Debug, Clone, Copy)]
pub enum Calculator<'a> {
    Team(&'a str),
    Batsman(&'a str),
    Bowler(&'a str),
}

impl Calculator<'_> {
    /// Full record over a slice. Each computation restricts the slice to
    /// its own rows internally, so callers hand over the season slice
    /// unchanged.
    pub fn compute(&self, rows: &[&EnrichedEvent]) -> MetricRecord {
        match *self {
            Calculator::Team(name) => team_record::compute(name, rows),
            Calculator::Batsman(name) => batsman_record::compute(name, rows),
            Calculator::Bowler(name) => bowler_record::compute(name, rows),
        }
    }

    /// Rows attributed to the focal entity. Partitions and the
    /// most-recent-match split are taken over these rows only.
    pub fn focus<'e>(&self, rows: &[&'e EnrichedEvent]) -> Vec<&'e EnrichedEvent> {
        match *self {
            Calculator::Team(name) => rows
                .iter()
                .copied()
                .filter(|ev| ev.meta.involves(name))
                .collect(),
            Calculator::Batsman(name) => rows
                .iter()
                .copied()
                .filter(|ev| ev.delivery.batter == name)
                .collect(),
            Calculator::Bowler(name) => rows
                .iter()
                .copied()
                .filter(|ev| ev.delivery.bowler == name)
                .collect(),
        }
    }

    /// Opposition name for one row: the other side for a team, the
    /// bowling side for a batsman, the batting side for a bowler.
    fn opponent<'e>(&self, ev: &'e EnrichedEvent) -> &'e str {
        match *self {
            Calculator::Team(name) => ev.meta.opponent_of(name),
            Calculator::Batsman(_) => ev.bowling_team(),
            Calculator::Bowler(_) => &ev.delivery.batting_team,
        }
    }

    pub fn help(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Calculator::Team(_) => team_record::HELP,
            Calculator::Batsman(_) => batsman_record::HELP,
            Calculator::Bowler(_) => bowler_record::HELP,
        }
    }
}

/// Per-opponent and per-season breakdowns of one record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Against {
    pub team: BTreeMap<String, MetricRecord>,
    pub season: BTreeMap<String, MetricRecord>,
}

/// Response envelope for one record query.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub overall: MetricRecord,
    pub against: Against,
    pub delta: MetricRecord,
    #[serde(serialize_with = "help_as_map")]
    pub help: &'static [(&'static str, &'static str)],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    /// Degenerate envelope for a query that arrived without a season
    /// filter: every section empty, plus guidance.
    pub fn missing_filter() -> Self {
        Envelope {
            overall: MetricRecord::default(),
            against: Against::default(),
            delta: MetricRecord::default(),
            help: &[],
            message: Some("provide seasons as a list of season labels".to_string()),
        }
    }
}

fn help_as_map<S: Serializer>(
    help: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(help.len()))?;
    for (key, text) in *help {
        map.serialize_entry(key, text)?;
    }
    map.end()
}

/// Builds the full envelope: overall record, per-opponent and per-season
/// breakdowns, and the effect of the most recent match.
pub fn assemble(calc: Calculator<'_>, rows: &[&EnrichedEvent]) -> Envelope {
    let overall = calc.compute(rows);
    let focus = calc.focus(rows);
    let prior = calc.compute(&before_last(&focus));
    let delta = overall.delta(&prior);

    let mut team = BTreeMap::new();
    for (name, part) in partition_by(&focus, |ev| calc.opponent(ev)) {
        team.insert(name, calc.compute(&part));
    }
    let mut season = BTreeMap::new();
    for (label, part) in partition_by(&focus, |ev| ev.season()) {
        season.insert(label, calc.compute(&part));
    }

    Envelope {
        overall,
        against: Against { team, season },
        delta,
        help: calc.help(),
        message: None,
    }
}
