use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use cricstat::fetch;
use cricstat::store::EventStore;

/// Downloads the published match and delivery tables into a local data
/// directory, then loads them once so a broken download fails here and
/// not on first query.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = env::args().skip(1).collect();
    let data_dir = parse_data_dir_arg(&args)
        .or_else(|| env::var("CRICSTAT_DATA_DIR").ok())
        .unwrap_or_else(|| "data".to_string());
    let data_dir = PathBuf::from(data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let matches_url =
        env::var("CRICSTAT_MATCHES_URL").unwrap_or_else(|_| fetch::DEFAULT_MATCHES_URL.to_string());
    let deliveries_url = env::var("CRICSTAT_DELIVERIES_URL")
        .unwrap_or_else(|_| fetch::DEFAULT_DELIVERIES_URL.to_string());

    println!("Fetching match table...");
    let matches_csv = fetch::fetch_csv_cached(&matches_url).context("fetching match table")?;
    println!("Fetching delivery table...");
    let deliveries_csv =
        fetch::fetch_csv_cached(&deliveries_url).context("fetching delivery table")?;

    let matches_path = data_dir.join("matches.csv");
    let deliveries_path = data_dir.join("deliveries.csv");
    fs::write(&matches_path, &matches_csv)
        .with_context(|| format!("writing {}", matches_path.display()))?;
    fs::write(&deliveries_path, &deliveries_csv)
        .with_context(|| format!("writing {}", deliveries_path.display()))?;

    let store = EventStore::from_csv_paths(&matches_path, &deliveries_path)
        .context("validating downloaded tables")?;

    println!();
    println!("Ingest complete at {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Data dir:   {}", data_dir.display());
    println!("Matches:    {}", store.matches().len());
    println!("Deliveries: {}", store.rows().len());
    println!(
        "Teams: {}  Players: {}  Seasons: {}",
        store.team_names().len(),
        store.player_names().len(),
        store.season_labels().len()
    );
    Ok(())
}

fn parse_data_dir_arg(args: &[String]) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if let Some(rest) = args[i].strip_prefix("--data-dir=") {
            return Some(rest.to_string());
        }
        if args[i] == "--data-dir" {
            return args.get(i + 1).cloned();
        }
        i += 1;
    }
    None
}
