use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use cricstat::ops;
use cricstat::store::EventStore;
use cricstat::synth::{SynthConfig, synth_store};

fn bench_config() -> SynthConfig {
    SynthConfig {
        seed: 11,
        seasons: (2016..=2021).map(|year| year.to_string()).collect(),
        matches_per_season: 24,
        overs_per_innings: 10,
    }
}

fn sample_store() -> EventStore {
    synth_store(&bench_config()).expect("valid synthetic season")
}

fn busy_batters(store: &EventStore, count: usize) -> Vec<String> {
    let mut names = Vec::new();
    for event in store.rows() {
        if !names.contains(&event.delivery.batter) {
            names.push(event.delivery.batter.clone());
        }
        if names.len() == count {
            break;
        }
    }
    names
}

fn bench_store_build(c: &mut Criterion) {
    let config = bench_config();
    c.bench_function("store_build", |b| {
        b.iter(|| {
            let store = synth_store(black_box(&config)).unwrap();
            black_box(store.rows().len());
        })
    });
}

fn bench_team_record(c: &mut Criterion) {
    let store = sample_store();
    let team = store.team_names()[0].clone();
    let seasons = vec!["All".to_string()];
    c.bench_function("team_record", |b| {
        b.iter(|| {
            let envelope = ops::team_record(black_box(&store), &team, &seasons).unwrap();
            black_box(envelope.against.team.len());
        })
    });
}

fn bench_batsman_record(c: &mut Criterion) {
    let store = sample_store();
    let batter = busy_batters(&store, 1).remove(0);
    let seasons = vec!["All".to_string()];
    c.bench_function("batsman_record", |b| {
        b.iter(|| {
            let envelope = ops::batsman_record(black_box(&store), &batter, &seasons).unwrap();
            black_box(envelope.against.season.len());
        })
    });
}

fn bench_bowler_record(c: &mut Criterion) {
    let store = sample_store();
    let bowler = store.rows()[0].delivery.bowler.clone();
    let seasons = vec!["All".to_string()];
    c.bench_function("bowler_record", |b| {
        b.iter(|| {
            let envelope = ops::bowler_record(black_box(&store), &bowler, &seasons).unwrap();
            black_box(envelope.against.season.len());
        })
    });
}

fn bench_compare_players(c: &mut Criterion) {
    let store = sample_store();
    let names = busy_batters(&store, 4);
    c.bench_function("compare_players", |b| {
        b.iter(|| {
            let comparison = ops::compare_players(black_box(&store), &names).unwrap();
            black_box(comparison.batsman_comparison.len());
        })
    });
}

criterion_group!(
    perf,
    bench_store_build,
    bench_team_record,
    bench_batsman_record,
    bench_bowler_record,
    bench_compare_players
);
criterion_main!(perf);
