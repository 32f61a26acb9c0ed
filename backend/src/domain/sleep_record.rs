//! Sleep session records.
//!
//! A record starts active (no end) on clock-in and is finished exactly once
//! on clock-out. The duration is always derived from the interval.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors raised by [`SleepRecord`] constructors and transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SleepRecordValidationError {
    EndsBeforeStart {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
    AlreadyFinished,
}

impl fmt::Display for SleepRecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndsBeforeStart {
                started_at,
                ended_at,
            } => write!(
                f,
                "sleep cannot end ({}) before it starts ({})",
                ended_at.to_rfc3339(),
                started_at.to_rfc3339()
            ),
            Self::AlreadyFinished => write!(f, "sleep record is already finished"),
        }
    }
}

impl std::error::Error for SleepRecordValidationError {}

/// Unvalidated record fields, as read from storage or a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepRecordDraft {
    pub id: Uuid,
    pub owner_id: UserId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One sleep session owned by a user.
///
/// ## Invariants
/// - `ended_at`, when present, is not before `started_at`.
/// - `duration_minutes` is present exactly when `ended_at` is, and equals the
///   whole minutes between start and end (truncated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SleepRecordDraft", into = "SleepRecordDraft")]
pub struct SleepRecord {
    id: Uuid,
    owner_id: UserId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_minutes: Option<i64>,
    created_at: DateTime<Utc>,
}

fn whole_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i64 {
    (ended_at - started_at).num_minutes()
}

impl SleepRecord {
    /// Validate a draft and derive its duration.
    pub fn new(draft: SleepRecordDraft) -> Result<Self, SleepRecordValidationError> {
        let SleepRecordDraft {
            id,
            owner_id,
            started_at,
            ended_at,
            created_at,
        } = draft;

        let duration_minutes = match ended_at {
            Some(end) if end < started_at => {
                return Err(SleepRecordValidationError::EndsBeforeStart {
                    started_at,
                    ended_at: end,
                });
            }
            Some(end) => Some(whole_minutes(started_at, end)),
            None => None,
        };

        Ok(Self {
            id,
            owner_id,
            started_at,
            ended_at,
            duration_minutes,
            created_at,
        })
    }

    /// Open a new active record.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use slumber::domain::{SleepRecord, UserId};
    ///
    /// let now = Utc::now();
    /// let record = SleepRecord::start(UserId::random(), now, now);
    /// assert!(record.is_active());
    /// assert_eq!(record.duration_minutes(), None);
    /// ```
    pub fn start(owner_id: UserId, started_at: DateTime<Utc>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            started_at,
            ended_at: None,
            duration_minutes: None,
            created_at,
        }
    }

    /// Close an active record, deriving its duration.
    pub fn finish(&self, ended_at: DateTime<Utc>) -> Result<Self, SleepRecordValidationError> {
        if self.ended_at.is_some() {
            return Err(SleepRecordValidationError::AlreadyFinished);
        }
        Self::new(SleepRecordDraft {
            id: self.id,
            owner_id: self.owner_id.clone(),
            started_at: self.started_at,
            ended_at: Some(ended_at),
            created_at: self.created_at,
        })
    }

    /// Record identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Bedtime.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wake time, absent while active.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Derived whole-minute duration, absent while active.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.duration_minutes
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the session is still running.
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Whether the session finished with a positive duration.
    pub fn is_complete(&self) -> bool {
        self.ended_at.is_some() && self.duration_minutes.is_some_and(|minutes| minutes > 0)
    }

    /// Whether this record's `[started_at, ended_at)` interval intersects
    /// `[start, end)`. A missing end is treated as unbounded.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        let starts_before_other_ends = end.is_none_or(|other_end| self.started_at < other_end);
        let ends_after_other_starts = self.ended_at.is_none_or(|own_end| own_end > start);
        starts_before_other_ends && ends_after_other_starts
    }
}

impl From<SleepRecord> for SleepRecordDraft {
    fn from(value: SleepRecord) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            started_at: value.started_at,
            ended_at: value.ended_at,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<SleepRecordDraft> for SleepRecord {
    type Error = SleepRecordValidationError;

    fn try_from(value: SleepRecordDraft) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Round a minute count to hours with one decimal place, half away from zero.
///
/// # Examples
/// ```
/// use slumber::domain::minutes_to_hours;
///
/// assert_eq!(minutes_to_hours(480), 8.0);
/// assert_eq!(minutes_to_hours(45), 0.8);
/// ```
pub fn minutes_to_hours(minutes: i64) -> f64 {
    // One tenth of an hour is six minutes.
    let magnitude = (minutes.unsigned_abs() + 3) / 6;
    let tenths = i64::try_from(magnitude).unwrap_or(i64::MAX) * minutes.signum();
    tenths as f64 / 10.0
}
