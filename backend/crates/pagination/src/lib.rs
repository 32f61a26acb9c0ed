//! Offset and limit pagination primitives.
//!
//! Endpoints validate raw `limit` and `offset` values into a [`PageRequest`],
//! slice an ordered collection with [`PageRequest::apply`], and return the
//! resulting [`PageInfo`] envelope alongside the items.
//!
//! # Examples
//!
//! ```
//! use pagination::PageRequest;
//!
//! let request = PageRequest::new(2, 1)?;
//! let page = request.apply(vec!["a", "b", "c", "d"]);
//! assert_eq!(page.items, vec!["b", "c"]);
//! assert_eq!(page.info.next_offset, Some(3));
//! assert_eq!(page.info.previous_offset, Some(0));
//! # Ok::<(), pagination::PageRequestError>(())
//! ```

use serde::Serialize;
use thiserror::Error;

/// Smallest accepted page size.
pub const MIN_LIMIT: i64 = 1;
/// Largest accepted page size.
pub const MAX_LIMIT: i64 = 100;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Reasons a raw page request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The limit lies outside `MIN_LIMIT..=MAX_LIMIT`.
    #[error("limit must be between {min} and {max}, got {value}")]
    LimitOutOfRange {
        /// Rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// The offset is negative.
    #[error("offset must not be negative, got {value}")]
    NegativeOffset {
        /// Rejected value.
        value: i64,
    },
}

/// Validated offset/limit window over an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl PageRequest {
    /// Validate a raw limit and offset.
    ///
    /// The limit is checked first, so a request with both values invalid
    /// reports the limit.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::LimitOutOfRange`] or
    /// [`PageRequestError::NegativeOffset`].
    pub fn new(limit: i64, offset: i64) -> Result<Self, PageRequestError> {
        let limit = Self::validate_limit(limit)?;
        let offset = u64::try_from(offset)
            .map_err(|_| PageRequestError::NegativeOffset { value: offset })?;
        Ok(Self { limit, offset })
    }

    /// Validate a limit on its own, as used by first-page listings.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::LimitOutOfRange`] when the value is outside
    /// the accepted range.
    pub fn validate_limit(limit: i64) -> Result<u32, PageRequestError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(PageRequestError::LimitOutOfRange {
                value: limit,
                min: MIN_LIMIT,
                max: MAX_LIMIT,
            });
        }
        u32::try_from(limit).map_err(|_| PageRequestError::LimitOutOfRange {
            value: limit,
            min: MIN_LIMIT,
            max: MAX_LIMIT,
        })
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Slice `items` to this window and describe the result.
    ///
    /// An offset at or beyond the end yields an empty page with the full
    /// total still reported.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let page: Vec<T> = items.into_iter().skip(skip).take(take).collect();
        let info = PageInfo::new(*self, total, page.len());
        Page { items: page, info }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Items of one page plus the envelope describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items inside the requested window, in collection order.
    pub items: Vec<T>,
    /// Pagination envelope for the window.
    pub info: PageInfo,
}

/// Pagination envelope returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Size of the whole collection.
    pub total_count: u64,
    /// Number of items in this page.
    pub current_count: u64,
    /// Requested page size.
    pub limit: u32,
    /// Requested offset.
    pub offset: u64,
    /// Whether items remain after this page.
    pub has_more: bool,
    /// Offset of the following page when `has_more` is set.
    pub next_offset: Option<u64>,
    /// Offset of the preceding page when this page does not start at zero.
    pub previous_offset: Option<u64>,
}

impl PageInfo {
    /// Describe a page of `current_count` items taken from `total` items.
    #[must_use]
    pub fn new(request: PageRequest, total: usize, current_count: usize) -> Self {
        let total_count = u64::try_from(total).unwrap_or(u64::MAX);
        let current_count = u64::try_from(current_count).unwrap_or(u64::MAX);
        let limit = u64::from(request.limit);
        let has_more = request.offset.saturating_add(current_count) < total_count;
        Self {
            total_count,
            current_count,
            limit: request.limit,
            offset: request.offset,
            has_more,
            next_offset: has_more.then(|| request.offset.saturating_add(limit)),
            previous_offset: (request.offset > 0).then(|| request.offset.saturating_sub(limit)),
        }
    }

    /// Envelope for an empty collection.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(request, 0, 0)
    }
}
