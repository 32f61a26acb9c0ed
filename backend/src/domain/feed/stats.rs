//! Aggregate statistics over a filtered feed.

use std::collections::BTreeSet;

use serde::Serialize;

use super::FeedEntry;
use crate::domain::minutes_to_hours;

/// Summary of every record in a filtered feed, independent of paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedStatistics {
    pub total_records: u64,
    pub unique_users: u64,
    pub average_minutes: i64,
    pub longest_minutes: i64,
    pub shortest_minutes: i64,
    pub total_sleep_hours: f64,
}

/// Compute statistics over the full filtered set.
///
/// The average rounds half away from zero; the total is reported in hours
/// with one decimal place. An empty set yields all zeros.
pub fn aggregate(entries: &[FeedEntry]) -> FeedStatistics {
    let durations: Vec<i64> = entries
        .iter()
        .filter_map(|entry| entry.record().duration_minutes())
        .collect();
    if durations.is_empty() {
        return FeedStatistics::default();
    }

    let count = i64::try_from(durations.len()).unwrap_or(i64::MAX);
    let total_minutes: i64 = durations.iter().sum();
    let owners: BTreeSet<_> = entries
        .iter()
        .map(|entry| entry.record().owner_id())
        .collect();

    FeedStatistics {
        total_records: entries.len() as u64,
        unique_users: owners.len() as u64,
        average_minutes: (2 * total_minutes + count) / (2 * count),
        longest_minutes: durations.iter().copied().max().unwrap_or_default(),
        shortest_minutes: durations.iter().copied().min().unwrap_or_default(),
        total_sleep_hours: minutes_to_hours(total_minutes),
    }
}
