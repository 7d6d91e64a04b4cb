use std::collections::HashSet;

use crate::event::EnrichedEvent;
use crate::metric::{Metric, MetricRecord, round2};

pub const HELP: &[(&str, &str)] = &[
    ("Matches", "Total matches played by team"),
    ("Wins", "Total matches won by team"),
    ("Losses", "Total matches lost by team"),
    ("Ties", "Total matches tied by team"),
    ("Runs", "Total runs scored by team"),
    ("Wickets", "Total wickets taken by team"),
    ("Balls", "Total balls faced by team"),
    ("Run Rate", "Average runs scored by team per over"),
    ("Con. Runs", "Total runs conceded by team"),
    ("Con. Wickets", "Total wickets lost by team"),
    ("Con. Balls", "Total balls bowled by team"),
    ("Con. Run Rate", "Average runs conceded by team per over"),
    ("Win %", "Winning percentage of team"),
    ("Title", "Total titles won by team"),
];

/// Career record for one team over a slice of events. Rows of matches not
/// involving the team are ignored, so the slice may be season-wide.
pub fn compute(team: &str, rows: &[&EnrichedEvent]) -> MetricRecord {
    let involved: Vec<&EnrichedEvent> = rows
        .iter()
        .copied()
        .filter(|ev| ev.meta.involves(team))
        .collect();

    let mut matches = HashSet::new();
    let mut wins = HashSet::new();
    let mut losses = HashSet::new();
    let mut titles = HashSet::new();
    for ev in &involved {
        matches.insert(ev.match_id());
        match ev.meta.winner.as_deref() {
            Some(winner) if winner == team => {
                wins.insert(ev.match_id());
                if ev.meta.is_final() {
                    titles.insert(ev.match_id());
                }
            }
            Some(_) => {
                losses.insert(ev.match_id());
            }
            // No winner recorded: the match counts toward the tie bucket
            // via the residual below.
            None => {}
        }
    }
    let played = matches.len() as i64;
    let won = wins.len() as i64;
    let lost = losses.len() as i64;
    let ties = played - won - lost;
    let win_pct = if played > 0 {
        round2(won as f64 / played as f64 * 100.0)
    } else {
        0.0
    };

    let mut runs = 0i64;
    let mut balls = 0i64;
    let mut wickets_lost = 0i64;
    let mut conceded_runs = 0i64;
    let mut conceded_balls = 0i64;
    let mut wickets_taken = 0i64;
    for ev in &involved {
        if ev.delivery.batting_team == team {
            runs += i64::from(ev.delivery.total_runs);
            if ev.counts_ball_faced() {
                balls += 1;
            }
            if ev.delivery.is_wicket {
                wickets_lost += 1;
            }
        } else {
            conceded_runs += i64::from(ev.delivery.total_runs);
            if ev.counts_ball_faced() {
                conceded_balls += 1;
            }
            if ev.delivery.is_wicket {
                wickets_taken += 1;
            }
        }
    }

    // Rates are only meaningful when the slice carries both sides of the
    // team's play.
    let two_sided = balls > 0 && conceded_balls > 0;
    let run_rate = if two_sided {
        round2(runs as f64 / (balls as f64 / 6.0))
    } else {
        0.0
    };
    let conceded_run_rate = if two_sided {
        round2(conceded_runs as f64 / (conceded_balls as f64 / 6.0))
    } else {
        0.0
    };

    let mut record = MetricRecord::new();
    record.push("Matches", Metric::Count(played));
    record.push("Wins", Metric::Count(won));
    record.push("Losses", Metric::Count(lost));
    record.push("Ties", Metric::Count(ties));
    record.push("Runs", Metric::Count(runs));
    record.push("Wickets", Metric::Count(wickets_taken));
    record.push("Balls", Metric::Count(balls));
    record.push("Run Rate", Metric::Rate(run_rate));
    record.push("Con. Runs", Metric::Count(conceded_runs));
    record.push("Con. Wickets", Metric::Count(wickets_lost));
    record.push("Con. Balls", Metric::Count(conceded_balls));
    record.push("Con. Run Rate", Metric::Rate(conceded_run_rate));
    record.push("Win %", Metric::Rate(win_pct));
    record.push("Title", Metric::Count(titles.len() as i64));
    record
}
