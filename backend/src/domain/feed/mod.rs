//! Social sleep feed.
//!
//! The feed shows the viewer the complete sleep records of the users they
//! follow, inside a look-back window. Filtering, ordering, paging and
//! statistics are pure functions over one snapshot of candidate records so
//! the page and the statistics always agree.

use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};

use super::{DisplayName, SleepRecord};

mod filter;
mod params;
mod sort;
mod stats;
mod window;

pub use filter::filter_feed;
pub use params::{FeedParameters, RawFeedParameters};
pub use sort::{SortKey, UnknownSortKey};
pub use stats::{FeedStatistics, aggregate};
pub use window::{FeedWindow, FeedWindowError};

/// Message returned when the viewer follows nobody.
pub const NO_FOLLOWEES_MESSAGE: &str =
    "You are not following anyone yet. Follow users to see their sleep records.";

/// Message returned when followees have nothing inside the window.
pub fn no_records_message(window: FeedWindow) -> String {
    format!(
        "No completed sleep records from followed users in the last {} days.",
        window.days()
    )
}

/// A sleep record together with its owner's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    record: SleepRecord,
    owner_display_name: DisplayName,
}

impl FeedEntry {
    pub fn new(record: SleepRecord, owner_display_name: DisplayName) -> Self {
        Self {
            record,
            owner_display_name,
        }
    }

    pub fn record(&self) -> &SleepRecord {
        &self.record
    }

    pub fn owner_display_name(&self) -> &DisplayName {
        &self.owner_display_name
    }
}

/// Order the filtered set by `sort_key` and cut the requested page.
///
/// The page info reports the size of the whole set, so an offset past the
/// end yields an empty page rather than an error.
pub fn paginate(
    mut entries: Vec<FeedEntry>,
    sort_key: SortKey,
    page: PageRequest,
) -> Page<FeedEntry> {
    sort_key.sort(&mut entries);
    page.apply(entries)
}
