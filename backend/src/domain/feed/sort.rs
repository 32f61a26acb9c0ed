//! Closed set of feed orderings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FeedEntry;
use crate::domain::SleepRecord;

/// Feed ordering. Every key sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Longest sleep first.
    #[default]
    Duration,
    /// Latest bedtime first.
    Bedtime,
    /// Latest wake time first.
    Waketime,
    /// Most recently created first.
    CreatedAt,
}

impl SortKey {
    /// Every accepted key, in documentation order.
    pub const ALL: [Self; 4] = [
        Self::Duration,
        Self::Bedtime,
        Self::Waketime,
        Self::CreatedAt,
    ];

    /// Wire name of the key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::Bedtime => "bedtime",
            Self::Waketime => "waketime",
            Self::CreatedAt => "created_at",
        }
    }

    /// Comma separated list of accepted wire names.
    pub fn allowed_values() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }

    /// Order two records by this key, descending, breaking ties by bedtime
    /// descending and then id ascending.
    pub fn compare(self, left: &SleepRecord, right: &SleepRecord) -> Ordering {
        let primary = match self {
            Self::Duration => right.duration_minutes().cmp(&left.duration_minutes()),
            Self::Bedtime => Ordering::Equal,
            Self::Waketime => right.ended_at().cmp(&left.ended_at()),
            Self::CreatedAt => right.created_at().cmp(&left.created_at()),
        };
        primary
            .then_with(|| right.started_at().cmp(&left.started_at()))
            .then_with(|| left.id().cmp(&right.id()))
    }

    /// Sort entries in place.
    pub fn sort(self, entries: &mut [FeedEntry]) {
        entries.sort_by(|left, right| self.compare(left.record(), right.record()));
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a sort key is not one of [`SortKey::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sort key {:?}; expected one of {}",
            self.0,
            SortKey::allowed_values()
        )
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_owned()))
    }
}
