use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Round to two decimals, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One statistic value. The kind decides both its JSON rendering and how
/// it subtracts in a delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Count(i64),
    Rate(f64),
    /// Single-innings score plus not-out marker, rendered `"85"` / `"85*"`.
    Score { runs: i64, not_out: bool },
    /// Wickets over runs conceded, rendered `"3/15"`.
    Figure { wickets: i64, runs: i64 },
}

impl Metric {
    fn delta_from(self, before: Metric) -> Metric {
        match (self, before) {
            (Metric::Count(a), Metric::Count(b)) => Metric::Count(a - b),
            (Metric::Rate(a), Metric::Rate(b)) => Metric::Rate(round2(a - b)),
            // The not-out marker is presentation only and drops out of the
            // difference.
            (Metric::Score { runs: a, .. }, Metric::Score { runs: b, .. }) => {
                Metric::Count(a - b)
            }
            (
                Metric::Figure { wickets: aw, runs: ar },
                Metric::Figure { wickets: bw, runs: br },
            ) => Metric::Figure {
                wickets: aw - bw,
                runs: ar - br,
            },
            // Records produced by one calculator always agree on kinds.
            (a, _) => a,
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Metric::Count(n) => serializer.serialize_i64(n),
            Metric::Rate(x) => serializer.serialize_f64(x),
            Metric::Score { runs, not_out } => {
                if not_out {
                    serializer.serialize_str(&format!("{runs}*"))
                } else {
                    serializer.serialize_str(&runs.to_string())
                }
            }
            Metric::Figure { wickets, runs } => {
                serializer.serialize_str(&format!("{wickets}/{runs}"))
            }
        }
    }
}

/// A fixed-order list of named metrics. Serializes as a JSON object whose
/// keys keep insertion order, so every record of one shape lists its
/// fields identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    fields: Vec<(&'static str, Metric)>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: Metric) {
        self.fields.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<Metric> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Metric)> + '_ {
        self.fields.iter().copied()
    }

    /// Field-by-field effect of the most recent match: `self` minus
    /// `before`. A field missing from `before` subtracts as zero.
    pub fn delta(&self, before: &MetricRecord) -> MetricRecord {
        let fields = self
            .fields
            .iter()
            .map(|&(key, value)| {
                let prior = before.get(key).unwrap_or_else(|| zero_like(value));
                (key, value.delta_from(prior))
            })
            .collect();
        MetricRecord { fields }
    }
}

impl Serialize for MetricRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn zero_like(metric: Metric) -> Metric {
    match metric {
        Metric::Count(_) => Metric::Count(0),
        Metric::Rate(_) => Metric::Rate(0.0),
        Metric::Score { .. } => Metric::Score { runs: 0, not_out: false },
        Metric::Figure { .. } => Metric::Figure { wickets: 0, runs: 0 },
    }
}
