//! Look-back window for the sleep feed.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Rejected window sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindowError {
    OutOfRange { value: i64 },
}

impl fmt::Display for FeedWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { value } => write!(
                f,
                "days must be between {} and {} (got {value})",
                FeedWindow::MIN_DAYS,
                FeedWindow::MAX_DAYS
            ),
        }
    }
}

impl std::error::Error for FeedWindowError {}

/// Number of days, counted back from now, whose bedtimes appear in the feed.
///
/// # Examples
/// ```
/// use slumber::domain::feed::FeedWindow;
///
/// assert_eq!(FeedWindow::new(7).map(FeedWindow::days), Ok(7));
/// assert!(FeedWindow::new(31).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow(u32);

impl FeedWindow {
    pub const MIN_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 30;
    pub const DEFAULT_DAYS: u32 = 7;

    /// Validate a raw day count.
    pub fn new(days: i64) -> Result<Self, FeedWindowError> {
        u32::try_from(days)
            .ok()
            .filter(|days| (Self::MIN_DAYS..=Self::MAX_DAYS).contains(days))
            .map(Self)
            .ok_or(FeedWindowError::OutOfRange { value: days })
    }

    /// Window length in days.
    pub fn days(self) -> u32 {
        self.0
    }

    /// Earliest bedtime inside the window.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.0))
    }

    /// Whether `instant` lies in `[since(now), now]`.
    pub fn contains(self, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.since(now) <= instant && instant <= now
    }
}

impl Default for FeedWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}
