use std::env;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use cricstat::fetch;
use cricstat::ops;
use cricstat::resolver::QueryError;
use cricstat::store::EventStore;
use cricstat::synth::{SynthConfig, synth_store};

const DEFAULT_MATCHES_PATH: &str = "data/matches.csv";
const DEFAULT_DELIVERIES_PATH: &str = "data/deliveries.csv";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Err(anyhow!("missing command"));
    };

    let store = load_store().context("failed to load event data")?;
    let seasons = parse_seasons_arg(&args);
    let names = positional_args(&args[1..]);

    let output = match command {
        "seasons" => pretty(&ops::all_seasons(&store))?,
        "teams" => pretty(&ops::all_teams(&store))?,
        "players" => pretty(&ops::all_players(&store))?,
        "team-players" => query(ops::team_players(&store, &joined(&names, command)?))?,
        "team" => query(ops::team_record(&store, &joined(&names, command)?, &seasons))?,
        "batsman" => query(ops::batsman_record(&store, &joined(&names, command)?, &seasons))?,
        "bowler" => query(ops::bowler_record(&store, &joined(&names, command)?, &seasons))?,
        "compare" => {
            if names.is_empty() {
                print_usage();
                return Err(anyhow!("compare needs at least one quoted player name"));
            }
            query(ops::compare_players(&store, &names))?
        }
        other => {
            print_usage();
            return Err(anyhow!("unknown command {other:?}"));
        }
    };
    println!("{output}");
    Ok(())
}

/// Local CSVs when present, the published tables otherwise. The synthetic
/// generator takes over when CRICSTAT_SOURCE=synthetic.
fn load_store() -> Result<EventStore> {
    let source = env::var("CRICSTAT_SOURCE").unwrap_or_default();
    if source.eq_ignore_ascii_case("synthetic") {
        return Ok(synth_store(&SynthConfig::from_env())?);
    }

    let matches_path =
        env::var("CRICSTAT_MATCHES").unwrap_or_else(|_| DEFAULT_MATCHES_PATH.to_string());
    let deliveries_path =
        env::var("CRICSTAT_DELIVERIES").unwrap_or_else(|_| DEFAULT_DELIVERIES_PATH.to_string());
    if Path::new(&matches_path).exists() && Path::new(&deliveries_path).exists() {
        return EventStore::from_csv_paths(Path::new(&matches_path), Path::new(&deliveries_path))
            .with_context(|| format!("loading {matches_path} and {deliveries_path}"));
    }

    let matches_url =
        env::var("CRICSTAT_MATCHES_URL").unwrap_or_else(|_| fetch::DEFAULT_MATCHES_URL.to_string());
    let deliveries_url = env::var("CRICSTAT_DELIVERIES_URL")
        .unwrap_or_else(|_| fetch::DEFAULT_DELIVERIES_URL.to_string());
    let matches_csv = fetch::fetch_csv_cached(&matches_url).context("fetching match table")?;
    let deliveries_csv =
        fetch::fetch_csv_cached(&deliveries_url).context("fetching delivery table")?;
    Ok(EventStore::from_csv(
        matches_csv.as_bytes(),
        deliveries_csv.as_bytes(),
    )?)
}

/// Record queries answer bad names and labels with an error payload, the
/// same JSON their consumers already parse, rather than aborting.
fn query<T: Serialize>(result: Result<T, QueryError>) -> Result<String> {
    match result {
        Ok(value) => pretty(&value),
        Err(err) => pretty(&serde_json::json!({ "error": err.to_string() })),
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serializing response")
}

/// `--seasons 2018,2019` or `--seasons=2018,2019`; defaults to all
/// seasons. An explicit empty list (`--seasons=`) asks for the guidance
/// envelope.
fn parse_seasons_arg(args: &[String]) -> Vec<String> {
    let mut i = 0;
    while i < args.len() {
        if let Some(rest) = args[i].strip_prefix("--seasons=") {
            return split_labels(rest);
        }
        if args[i] == "--seasons" {
            return match args.get(i + 1) {
                Some(value) => split_labels(value),
                None => Vec::new(),
            };
        }
        i += 1;
    }
    vec!["All".to_string()]
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Arguments that are not flags and not flag values.
fn positional_args(args: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--seasons" {
            i += 2;
            continue;
        }
        if arg.starts_with("--") {
            i += 1;
            continue;
        }
        names.push(arg.clone());
        i += 1;
    }
    names
}

/// Multi-word names may arrive unquoted; the record commands take exactly
/// one name, so the positionals are rejoined.
fn joined(names: &[String], command: &str) -> Result<String> {
    if names.is_empty() {
        print_usage();
        return Err(anyhow!("{command} needs a name"));
    }
    Ok(names.join(" "))
}

fn print_usage() {
    println!("usage: cricstat <command> [args]");
    println!();
    println!("  seasons                          list season labels");
    println!("  teams                            list team names");
    println!("  players                          list player names");
    println!("  team-players <team>              list a team's squad");
    println!("  team <team> [--seasons a,b]      team record");
    println!("  batsman <player> [--seasons a,b] batting record");
    println!("  bowler <player> [--seasons a,b]  bowling record");
    println!("  compare <player> <player> ...    batting and bowling records side by side");
    println!();
    println!("  CRICSTAT_MATCHES / CRICSTAT_DELIVERIES          local csv paths");
    println!("  CRICSTAT_MATCHES_URL / CRICSTAT_DELIVERIES_URL  source table urls");
    println!("  CRICSTAT_SOURCE=synthetic                       generated demo data");
}
