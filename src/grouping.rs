use std::collections::BTreeMap;

use crate::event::EnrichedEvent;

/// Splits rows by a string key. Only observed keys appear, and the map
/// iterates in ascending key order.
pub fn partition_by<'e, K>(
    rows: &[&'e EnrichedEvent],
    key: K,
) -> BTreeMap<String, Vec<&'e EnrichedEvent>>
where
    K: Fn(&EnrichedEvent) -> &str,
{
    let mut parts: BTreeMap<String, Vec<&EnrichedEvent>> = BTreeMap::new();
    for &ev in rows {
        parts.entry(key(ev).to_string()).or_default().push(ev);
    }
    parts
}

/// Rows excluding the most recent match, where match ids are assigned in
/// chronological order. Empty input stays empty.
pub fn before_last<'e>(rows: &[&'e EnrichedEvent]) -> Vec<&'e EnrichedEvent> {
    let Some(last) = rows.iter().map(|ev| ev.match_id()).max() else {
        return Vec::new();
    };
    rows.iter()
        .copied()
        .filter(|ev| ev.match_id() < last)
        .collect()
}
