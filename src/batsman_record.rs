use std::collections::{BTreeMap, HashSet};

use crate::event::EnrichedEvent;
use crate::metric::{Metric, MetricRecord, round2};

pub const HELP: &[(&str, &str)] = &[
    ("Innings", "Total innings played by batsman"),
    ("Runs", "Total runs scored by batsman"),
    ("Not Out", "Total not out innings played by batsman"),
    ("Highest Score", "Highest score made by batsman"),
    ("Fifties (50s)", "Total fifties scored by batsman"),
    ("Hundreds (100s)", "Total hundreds scored by batsman"),
    ("Fours", "Total fours scored by batsman"),
    ("Sixes", "Total sixes scored by batsman"),
    ("Average", "Average runs scored by batsman"),
    ("Strike Rate", "Strike rate of batsman"),
    ("Man of Match", "Number of times batsman Man of Match"),
];

/// Batting record for one player over a slice of events.
///
/// Dismissals are counted over the whole input slice, not just deliveries
/// the batter faced: a run-out can fall on the non-striker's end.
pub fn compute(batter: &str, rows: &[&EnrichedEvent]) -> MetricRecord {
    let outs = rows.iter().filter(|ev| ev.dismissed(batter)).count() as i64;

    let faced: Vec<&EnrichedEvent> = rows
        .iter()
        .copied()
        .filter(|ev| ev.delivery.batter == batter)
        .collect();

    let mut runs = 0i64;
    let mut balls = 0i64;
    let mut fours = 0i64;
    let mut sixes = 0i64;
    let mut innings_runs: BTreeMap<u32, i64> = BTreeMap::new();
    let mut awards = HashSet::new();
    for ev in &faced {
        let scored = i64::from(ev.delivery.batter_runs);
        runs += scored;
        *innings_runs.entry(ev.match_id()).or_insert(0) += scored;
        if ev.counts_ball_faced() {
            balls += 1;
        }
        if ev.boundary_four() {
            fours += 1;
        }
        if ev.boundary_six() {
            sixes += 1;
        }
        if ev.meta.player_of_match.as_deref() == Some(batter) {
            awards.insert(ev.match_id());
        }
    }

    let innings = innings_runs.len() as i64;
    let average = if outs > 0 {
        round2(runs as f64 / outs as f64)
    } else {
        0.0
    };
    let strike_rate = if balls > 0 {
        round2(runs as f64 / balls as f64 * 100.0)
    } else {
        0.0
    };
    let fifties = innings_runs
        .values()
        .filter(|&&r| (50..100).contains(&r))
        .count() as i64;
    let hundreds = innings_runs.values().filter(|&&r| r >= 100).count() as i64;

    // Ties on the top score resolve to the earliest match.
    let mut best: Option<(u32, i64)> = None;
    for (&id, &scored) in &innings_runs {
        if best.is_none_or(|(_, top)| scored > top) {
            best = Some((id, scored));
        }
    }
    let highest = match best {
        Some((id, top)) => {
            let out_there = faced
                .iter()
                .any(|ev| ev.match_id() == id && ev.dismissed(batter));
            Metric::Score { runs: top, not_out: !out_there }
        }
        None => Metric::Score { runs: 0, not_out: false },
    };

    let mut record = MetricRecord::new();
    record.push("Innings", Metric::Count(innings));
    record.push("Runs", Metric::Count(runs));
    record.push("Not Out", Metric::Count(innings - outs));
    record.push("Highest Score", highest);
    record.push("Fifties (50s)", Metric::Count(fifties));
    record.push("Hundreds (100s)", Metric::Count(hundreds));
    record.push("Fours", Metric::Count(fours));
    record.push("Sixes", Metric::Count(sixes));
    record.push("Average", Metric::Rate(average));
    record.push("Strike Rate", Metric::Rate(strike_rate));
    record.push("Man of Match", Metric::Count(awards.len() as i64));
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Delivery, DismissalKind, ExtraType, MatchMeta};
    use crate::store::EventStore;

    struct Ball {
        match_id: u32,
        batter: &'static str,
        runs: u8,
        extra: ExtraType,
        out: Option<(&'static str, DismissalKind)>,
        non_boundary: bool,
    }

    impl Ball {
        fn new(match_id: u32, batter: &'static str, runs: u8) -> Self {
            Ball {
                match_id,
                batter,
                runs,
                extra: ExtraType::None,
                out: None,
                non_boundary: false,
            }
        }

        fn extra(mut self, extra: ExtraType) -> Self {
            self.extra = extra;
            self
        }

        fn out(mut self, who: &'static str, kind: DismissalKind) -> Self {
            self.out = Some((who, kind));
            self
        }

        fn ran(mut self) -> Self {
            self.non_boundary = true;
            self
        }
    }

    fn store(ids: &[u32], balls: Vec<Ball>) -> EventStore {
        let metas = ids
            .iter()
            .map(|&id| MatchMeta {
                id,
                season: "2019".to_string(),
                match_number: id.to_string(),
                team1: "Amber Kings".to_string(),
                team2: "Coral Blazers".to_string(),
                winner: Some("Amber Kings".to_string()),
                player_of_match: Some("Ravi Mehta".to_string()),
                team1_players: vec!["Ravi Mehta".to_string(), "Sunil Verma".to_string()],
                team2_players: vec!["Dev Kapoor".to_string()],
            })
            .collect();
        let deliveries = balls
            .into_iter()
            .map(|b| Delivery {
                match_id: b.match_id,
                innings: 1,
                over: 0,
                ball_number: 1,
                batter: b.batter.to_string(),
                bowler: "Dev Kapoor".to_string(),
                non_striker: "Sunil Verma".to_string(),
                extra: b.extra,
                batter_runs: b.runs,
                extra_runs: 0,
                total_runs: b.runs,
                non_boundary: b.non_boundary,
                is_wicket: b.out.is_some(),
                player_out: b.out.map(|(who, _)| who.to_string()),
                dismissal: b.out.map(|(_, kind)| kind),
                fielders: None,
                batting_team: "Amber Kings".to_string(),
            })
            .collect();
        EventStore::from_parts(metas, deliveries).expect("fixture store")
    }

    fn spread(match_id: u32, batter: &'static str, total: i64) -> Vec<Ball> {
        // Scores runs in sixes then singles so innings totals are exact.
        let mut out = Vec::new();
        let mut left = total;
        while left >= 6 {
            out.push(Ball::new(match_id, batter, 6));
            left -= 6;
        }
        while left > 0 {
            out.push(Ball::new(match_id, batter, 1));
            left -= 1;
        }
        out
    }

    #[test]
    fn milestones_bucket_by_innings_total() {
        let mut balls = spread(1, "Ravi Mehta", 45);
        balls.extend(spread(2, "Ravi Mehta", 50));
        balls.extend(spread(3, "Ravi Mehta", 99));
        balls.extend(spread(4, "Ravi Mehta", 100));
        let s = store(&[1, 2, 3, 4], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(record.get("Innings"), Some(Metric::Count(4)));
        assert_eq!(record.get("Fifties (50s)"), Some(Metric::Count(2)));
        assert_eq!(record.get("Hundreds (100s)"), Some(Metric::Count(1)));
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 100, not_out: true })
        );
    }

    #[test]
    fn highest_score_carries_the_not_out_marker() {
        let mut balls = spread(1, "Ravi Mehta", 80);
        // Out for less in the second match.
        balls.extend(spread(2, "Ravi Mehta", 45));
        balls.push(Ball::new(2, "Ravi Mehta", 0).out("Ravi Mehta", DismissalKind::Bowled));
        let s = store(&[1, 2], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 80, not_out: true })
        );
        // Dismissed in the top innings flips the marker.
        let mut balls = spread(1, "Ravi Mehta", 80);
        balls.push(Ball::new(1, "Ravi Mehta", 0).out("Ravi Mehta", DismissalKind::Caught));
        balls.extend(spread(2, "Ravi Mehta", 45));
        let s = store(&[1, 2], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 80, not_out: false })
        );
    }

    #[test]
    fn tied_highest_scores_resolve_to_the_earliest_match() {
        // Both innings total 80; only the later one ends dismissed.
        let mut balls = spread(1, "Ravi Mehta", 80);
        balls.extend(spread(2, "Ravi Mehta", 80));
        balls.push(Ball::new(2, "Ravi Mehta", 0).out("Ravi Mehta", DismissalKind::Bowled));
        let s = store(&[1, 2], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 80, not_out: true })
        );
        // Mirror: the earlier tied innings is the dismissed one.
        let mut balls = spread(1, "Ravi Mehta", 80);
        balls.push(Ball::new(1, "Ravi Mehta", 0).out("Ravi Mehta", DismissalKind::Caught));
        balls.extend(spread(2, "Ravi Mehta", 80));
        let s = store(&[1, 2], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 80, not_out: false })
        );
    }

    #[test]
    fn batter_with_no_deliveries_scores_a_plain_zero() {
        let s = store(&[1], spread(1, "Ravi Mehta", 12));
        let record = compute("Sunil Verma", &s.all_events());
        assert_eq!(record.get("Innings"), Some(Metric::Count(0)));
        assert_eq!(
            record.get("Highest Score"),
            Some(Metric::Score { runs: 0, not_out: false })
        );
        assert_eq!(record.get("Average"), Some(Metric::Rate(0.0)));
        assert_eq!(record.get("Strike Rate"), Some(Metric::Rate(0.0)));
    }

    #[test]
    fn non_striker_run_out_counts_against_the_average() {
        let mut balls = spread(1, "Ravi Mehta", 30);
        // Sunil Verma is run out off a ball Ravi Mehta faced.
        balls.push(Ball::new(1, "Ravi Mehta", 1).out("Sunil Verma", DismissalKind::RunOut));
        let s = store(&[1], balls);
        let sunil = compute("Sunil Verma", &s.all_events());
        assert_eq!(sunil.get("Innings"), Some(Metric::Count(0)));
        // Innings minus outs goes negative: the dismissal fell on a ball
        // the batter never faced.
        assert_eq!(sunil.get("Not Out"), Some(Metric::Count(-1)));
        let ravi = compute("Ravi Mehta", &s.all_events());
        assert_eq!(ravi.get("Not Out"), Some(Metric::Count(1)));
        assert_eq!(ravi.get("Average"), Some(Metric::Rate(0.0)));
    }

    #[test]
    fn wides_do_not_cost_strike_rate() {
        let balls = vec![
            Ball::new(1, "Ravi Mehta", 4),
            Ball::new(1, "Ravi Mehta", 0).extra(ExtraType::Wide),
            Ball::new(1, "Ravi Mehta", 2),
        ];
        let s = store(&[1], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        // 6 runs off 2 counted balls.
        assert_eq!(record.get("Strike Rate"), Some(Metric::Rate(300.0)));
    }

    #[test]
    fn run_fours_and_sixes_are_not_boundaries() {
        let balls = vec![
            Ball::new(1, "Ravi Mehta", 4),
            Ball::new(1, "Ravi Mehta", 4).ran(),
            Ball::new(1, "Ravi Mehta", 6),
            Ball::new(1, "Ravi Mehta", 6).ran(),
        ];
        let s = store(&[1], balls);
        let record = compute("Ravi Mehta", &s.all_events());
        assert_eq!(record.get("Fours"), Some(Metric::Count(1)));
        assert_eq!(record.get("Sixes"), Some(Metric::Count(1)));
        assert_eq!(record.get("Runs"), Some(Metric::Count(20)));
    }

    #[test]
    fn award_count_dedupes_by_match() {
        let s = store(&[1, 2], {
            let mut balls = spread(1, "Ravi Mehta", 10);
            balls.extend(spread(2, "Ravi Mehta", 10));
            balls
        });
        let record = compute("Ravi Mehta", &s.all_events());
        // Named player of the match in both fixtures, many balls each.
        assert_eq!(record.get("Man of Match"), Some(Metric::Count(2)));
    }
}
