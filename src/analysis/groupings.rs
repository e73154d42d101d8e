/// Mean revenue lag per group.
///
/// Groups come out in key order (time-of-day buckets chronologically, fare
/// classes and routes alphabetically); callers that want them ranked use
/// `sort_by_mean_lag`.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::model::BookingRecord;

// ---------------------------------------------------------------------------
// Group type
// ---------------------------------------------------------------------------

/// Aggregate for one group of bookings.
#[derive(Debug, Clone, PartialEq)]
pub struct LagGroup {
    pub label: String,
    pub bookings: usize,
    pub mean_lag_days: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Mean revenue lag across every record, or `None` when there are none.
pub fn overall_mean_lag(records: &[BookingRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: i64 = records.iter().map(|r| r.revenue_lag_days).sum();
    Some(total as f64 / records.len() as f64)
}

/// Mean revenue lag for each distinct key, in key order.
pub fn mean_lag_by<K, F>(records: &[BookingRecord], key: F) -> Vec<LagGroup>
where
    K: Ord + Display,
    F: Fn(&BookingRecord) -> K,
{
    let mut totals: BTreeMap<K, (i64, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(key(record)).or_insert((0, 0));
        entry.0 += record.revenue_lag_days;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(key, (total, count))| LagGroup {
            label: key.to_string(),
            bookings: count,
            mean_lag_days: total as f64 / count as f64,
        })
        .collect()
}

pub fn by_time_of_day(records: &[BookingRecord]) -> Vec<LagGroup> {
    mean_lag_by(records, |r| r.time_of_day)
}

pub fn by_fare_class(records: &[BookingRecord]) -> Vec<LagGroup> {
    mean_lag_by(records, |r| r.fare_class.clone())
}

pub fn by_origin_dest(records: &[BookingRecord]) -> Vec<LagGroup> {
    mean_lag_by(records, |r| r.origin_dest.clone())
}

// ---------------------------------------------------------------------------
// Ranking and selection
// ---------------------------------------------------------------------------

/// Sorts ascending by mean lag. Ties keep their existing order.
pub fn sort_by_mean_lag(groups: &mut [LagGroup]) {
    groups.sort_by(|a, b| a.mean_lag_days.total_cmp(&b.mean_lag_days));
}

/// Keeps groups with strictly more than `min_bookings` bookings.
pub fn with_more_than(groups: Vec<LagGroup>, min_bookings: usize) -> Vec<LagGroup> {
    groups
        .into_iter()
        .filter(|g| g.bookings > min_bookings)
        .collect()
}

/// First `n` groups (the shortest lags of an ascending list).
pub fn head(groups: &[LagGroup], n: usize) -> &[LagGroup] {
    &groups[..n.min(groups.len())]
}

/// Last `n` groups (the longest lags of an ascending list), order kept.
pub fn tail(groups: &[LagGroup], n: usize) -> &[LagGroup] {
    &groups[groups.len().saturating_sub(n)..]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
