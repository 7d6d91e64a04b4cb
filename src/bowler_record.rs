use std::collections::{BTreeMap, HashSet};

use crate::event::EnrichedEvent;
use crate::metric::{Metric, MetricRecord, round2};

pub const HELP: &[(&str, &str)] = &[
    ("Innings", "Total innings bowled by bowler"),
    ("Wickets", "Total wickets taken by bowler"),
    ("3+W", "Total innings where bowler took 3 or more wickets"),
    ("Best Figure Fraction", "Best figure of bowler in fraction"),
    ("Average", "Average runs conceded by bowler"),
    ("Economy", "Economy rate of bowler"),
    ("Strike Rate", "Strike rate of bowler"),
    ("Man of Match", "Number of times bowler Man of Match"),
    ("Fours", "Total fours conceded by bowler"),
    ("Sixes", "Total sixes conceded by bowler"),
    ("Best Figure", "Best figure of bowler"),
];

/// Bowling record for one player over a slice of events.
pub fn compute(bowler: &str, rows: &[&EnrichedEvent]) -> MetricRecord {
    let bowled: Vec<&EnrichedEvent> = rows
        .iter()
        .copied()
        .filter(|ev| ev.delivery.bowler == bowler)
        .collect();

    let mut runs = 0i64;
    let mut legal = 0i64;
    let mut wickets = 0i64;
    let mut fours = 0i64;
    let mut sixes = 0i64;
    // Per-match (wickets, runs) pairs feed the haul count and best figure.
    let mut figures: BTreeMap<u32, (i64, i64)> = BTreeMap::new();
    let mut awards = HashSet::new();
    for ev in &bowled {
        let charged = ev.bowler_runs();
        runs += charged;
        if ev.legal_delivery() {
            legal += 1;
        }
        let credited = i64::from(ev.bowler_wicket());
        wickets += credited;
        if ev.boundary_four() {
            fours += 1;
        }
        if ev.boundary_six() {
            sixes += 1;
        }
        let entry = figures.entry(ev.match_id()).or_insert((0, 0));
        entry.0 += credited;
        entry.1 += charged;
        if ev.meta.player_of_match.as_deref() == Some(bowler) {
            awards.insert(ev.match_id());
        }
    }

    let innings = figures.len() as i64;
    let economy = if legal > 0 {
        round2(runs as f64 / legal as f64 * 6.0)
    } else {
        0.0
    };
    let average = if wickets > 0 {
        round2(runs as f64 / wickets as f64)
    } else {
        0.0
    };
    let strike_rate = if wickets > 0 {
        round2(legal as f64 / wickets as f64 * 6.0)
    } else {
        0.0
    };
    let hauls = figures.values().filter(|(w, _)| *w >= 3).count() as i64;

    // Most wickets first, fewest runs second; full ties resolve to the
    // earliest match.
    let mut best: Option<(i64, i64)> = None;
    for &(w, r) in figures.values() {
        let better = match best {
            None => true,
            Some((bw, br)) => w > bw || (w == bw && r < br),
        };
        if better {
            best = Some((w, r));
        }
    }
    let (best_wickets, best_runs) = best.unwrap_or((0, 0));
    let best_numeric = if best_runs != 0 {
        round2(best_wickets as f64 / best_runs as f64)
    } else {
        0.0
    };

    let mut record = MetricRecord::new();
    record.push("Innings", Metric::Count(innings));
    record.push("Wickets", Metric::Count(wickets));
    record.push("3+W", Metric::Count(hauls));
    record.push(
        "Best Figure Fraction",
        Metric::Figure { wickets: best_wickets, runs: best_runs },
    );
    record.push("Average", Metric::Rate(average));
    record.push("Economy", Metric::Rate(economy));
    record.push("Strike Rate", Metric::Rate(strike_rate));
    record.push("Man of Match", Metric::Count(awards.len() as i64));
    record.push("Fours", Metric::Count(fours));
    record.push("Sixes", Metric::Count(sixes));
    record.push("Best Figure", Metric::Rate(best_numeric));
    record
}
