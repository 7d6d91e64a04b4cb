use std::env;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::event::{Delivery, DismissalKind, ExtraType, MatchMeta};
use crate::store::{EventStore, LoadError};

const TEAM_POOL: &[&str] = &[
    "Amberside Falcons",
    "Bayview Chargers",
    "Crestwood Kings",
    "Dockland Titans",
    "Eastvale Riders",
    "Foxhill Strikers",
    "Granite Bay Lions",
    "Harborview Hawks",
];

const FIRST_NAMES: &[&str] = &[
    "Arun", "Dev", "Farhan", "Kiran", "Manoj", "Nikhil", "Pranav", "Rohan", "Sameer", "Tarun",
    "Varun",
];

const LAST_NAMES: &[&str] = &[
    "Bedi", "Chandra", "Deshmukh", "Iyer", "Joshi", "Kulkarni", "Menon", "Nair", "Pillai", "Rao",
    "Sethi",
];

/// Shape of a generated dataset. Every run with the same config produces
/// byte-identical events.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub seed: u64,
    pub seasons: Vec<String>,
    pub matches_per_season: usize,
    pub overs_per_innings: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            seed: 7,
            seasons: vec!["2019".to_string(), "2020".to_string(), "2021".to_string()],
            matches_per_season: 14,
            overs_per_innings: 5,
        }
    }
}

impl SynthConfig {
    pub fn from_env() -> Self {
        let defaults = SynthConfig::default();
        let season_count = env::var("SYNTH_SEASONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.seasons.len())
            .clamp(1, 30);
        SynthConfig {
            seed: env::var("SYNTH_SEED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.seed),
            seasons: (0..season_count).map(|i| (2019 + i).to_string()).collect(),
            matches_per_season: env::var("SYNTH_MATCHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.matches_per_season)
                .clamp(1, 200),
            overs_per_innings: env::var("SYNTH_OVERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.overs_per_innings)
                .clamp(1, 20),
        }
    }
}

/// Generates a full store of plausible match data. Useful for demos and
/// benchmarks when the published tables are unreachable.
pub fn synth_store(cfg: &SynthConfig) -> Result<EventStore, LoadError> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let squads: Vec<Vec<String>> = (0..TEAM_POOL.len()).map(squad_names).collect();

    let mut metas = Vec::new();
    let mut balls = Vec::new();
    let mut next_id = 1u32;
    for season in &cfg.seasons {
        for round in 0..cfg.matches_per_season {
            let home = rng.gen_range(0..TEAM_POOL.len());
            let away = loop {
                let pick = rng.gen_range(0..TEAM_POOL.len());
                if pick != home {
                    break pick;
                }
            };
            let id = next_id;
            next_id += 1;
            let is_final = round + 1 == cfg.matches_per_season;

            // The odd fixture is washed out: it stays in the match table
            // but contributes no deliveries.
            let abandoned = !is_final && rng.gen_bool(0.04);
            let mut winner = None;
            let mut player_of_match = None;
            if !abandoned {
                let mut scores = [0i64; 2];
                for innings in 1u8..=2 {
                    let (bat, bowl) = if innings == 1 { (home, away) } else { (away, home) };
                    scores[usize::from(innings) - 1] = simulate_innings(
                        &mut rng,
                        cfg.overs_per_innings,
                        id,
                        innings,
                        TEAM_POOL[bat],
                        &squads[bat],
                        &squads[bowl],
                        &mut balls,
                    );
                }
                let winner_side = match scores[0].cmp(&scores[1]) {
                    std::cmp::Ordering::Greater => Some(home),
                    std::cmp::Ordering::Less => Some(away),
                    std::cmp::Ordering::Equal => None,
                };
                if let Some(side) = winner_side {
                    winner = Some(TEAM_POOL[side].to_string());
                    let squad = &squads[side];
                    player_of_match = Some(squad[rng.gen_range(0..squad.len())].clone());
                }
            }

            metas.push(MatchMeta {
                id,
                season: season.clone(),
                match_number: if is_final {
                    "Final".to_string()
                } else {
                    (round + 1).to_string()
                },
                team1: TEAM_POOL[home].to_string(),
                team2: TEAM_POOL[away].to_string(),
                winner,
                player_of_match,
                team1_players: squads[home].clone(),
                team2_players: squads[away].clone(),
            });
        }
    }

    EventStore::from_parts(metas, balls)
}

fn squad_names(team_index: usize) -> Vec<String> {
    (0..11)
        .map(|slot| {
            let first = FIRST_NAMES[(team_index + slot * 3) % FIRST_NAMES.len()];
            let last = LAST_NAMES[(team_index * 11 + slot) % LAST_NAMES.len()];
            format!("{first} {last}")
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn simulate_innings(
    rng: &mut StdRng,
    overs: u8,
    match_id: u32,
    innings: u8,
    batting_team: &str,
    batting: &[String],
    bowling: &[String],
    out: &mut Vec<Delivery>,
) -> i64 {
    let mut striker = 0usize;
    let mut non_striker = 1usize;
    let mut next_in = 2usize;
    let mut total = 0i64;
    for over in 0..overs {
        let bowler = &bowling[6 + usize::from(over) % 5];
        let mut legal = 0u8;
        let mut ball_number = 1u8;
        while legal < 6 {
            let (extra, batter_runs, extra_runs) = roll_runs(rng);
            // Decide the wicket before the push so the dismissed batter is
            // recorded on the ball they actually faced.
            let mut wicket = None;
            if extra == ExtraType::None && rng.gen_bool(0.045) {
                let kind = roll_dismissal(rng);
                let victim = if kind == DismissalKind::RunOut && rng.gen_bool(0.5) {
                    non_striker
                } else {
                    striker
                };
                let fielder = if kind == DismissalKind::Caught {
                    Some(bowling[rng.gen_range(0..bowling.len())].clone())
                } else {
                    None
                };
                wicket = Some((victim, kind, fielder));
            }
            let non_boundary =
                (batter_runs == 4 || batter_runs == 6) && rng.gen_bool(0.02);
            total += i64::from(batter_runs) + i64::from(extra_runs);
            out.push(Delivery {
                match_id,
                innings,
                over,
                ball_number,
                batter: batting[striker].clone(),
                bowler: bowler.clone(),
                non_striker: batting[non_striker].clone(),
                extra,
                batter_runs,
                extra_runs,
                total_runs: batter_runs + extra_runs,
                non_boundary,
                is_wicket: wicket.is_some(),
                player_out: wicket.as_ref().map(|(victim, _, _)| batting[*victim].clone()),
                dismissal: wicket.as_ref().map(|(_, kind, _)| *kind),
                fielders: wicket.as_ref().and_then(|(_, _, fielder)| fielder.clone()),
                batting_team: batting_team.to_string(),
            });
            if !matches!(extra, ExtraType::Wide | ExtraType::NoBall) {
                legal += 1;
            }
            ball_number += 1;
            if let Some((victim, _, _)) = wicket {
                if victim == striker {
                    striker = next_in;
                } else {
                    non_striker = next_in;
                }
                next_in += 1;
                if next_in > 10 {
                    return total;
                }
            }
            if batter_runs % 2 == 1 {
                std::mem::swap(&mut striker, &mut non_striker);
            }
        }
        std::mem::swap(&mut striker, &mut non_striker);
    }
    total
}

fn roll_runs(rng: &mut StdRng) -> (ExtraType, u8, u8) {
    if rng.gen_bool(0.06) {
        return match rng.gen_range(0..100) {
            0..=44 => (ExtraType::Wide, 0, 1),
            45..=69 => (ExtraType::NoBall, bat_runs(rng), 1),
            70..=84 => (ExtraType::LegBye, 0, rng.gen_range(1..=2)),
            85..=96 => (ExtraType::Bye, 0, rng.gen_range(1..=2)),
            _ => (ExtraType::Penalty, 0, 5),
        };
    }
    (ExtraType::None, bat_runs(rng), 0)
}

fn bat_runs(rng: &mut StdRng) -> u8 {
    match rng.gen_range(0..100) {
        0..=34 => 0,
        35..=64 => 1,
        65..=76 => 2,
        77..=78 => 3,
        79..=91 => 4,
        _ => 6,
    }
}

fn roll_dismissal(rng: &mut StdRng) -> DismissalKind {
    match rng.gen_range(0..100) {
        0..=44 => DismissalKind::Caught,
        45..=69 => DismissalKind::Bowled,
        70..=81 => DismissalKind::Lbw,
        82..=91 => DismissalKind::RunOut,
        92..=96 => DismissalKind::Stumped,
        _ => DismissalKind::HitWicket,
    }
}
