//! Selection of the records a viewer may see.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{FeedEntry, FeedWindow};
use crate::domain::UserId;

/// Keep the complete records of followees whose bedtime falls inside the
/// window.
///
/// Records owned by the viewer are dropped even when the follow set would
/// admit them.
pub fn filter_feed(
    viewer_id: &UserId,
    followee_ids: &BTreeSet<UserId>,
    candidates: Vec<FeedEntry>,
    window: FeedWindow,
    now: DateTime<Utc>,
) -> Vec<FeedEntry> {
    if followee_ids.is_empty() {
        return Vec::new();
    }

    candidates
        .into_iter()
        .filter(|entry| {
            let record = entry.record();
            let owner = record.owner_id();
            owner != viewer_id
                && followee_ids.contains(owner)
                && record.is_complete()
                && window.contains(record.started_at(), now)
        })
        .collect()
}
