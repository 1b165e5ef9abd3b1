use chrono::{DateTime, Duration, Utc};

use super::TimeRangeError;

/// A half-open span of time `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range, validating that start < end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `now`, ending at `now`.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(days)),
            end: now,
        }
    }

    /// Whether an instant falls within the range (end inclusive).
    ///
    /// Used for "ended within" queries, where an entry ending exactly at
    /// `end` still counts.
    pub fn contains_inclusive(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Which timeline entries a query returns.
///
/// There is no implicit default: every query site states whether
/// soft-deleted entries are wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryScope {
    /// Only entries with `active = true`.
    Active,
    /// Active and soft-deleted entries alike.
    All,
}

impl EntryScope {
    /// Whether an entry with the given active flag is in scope.
    pub fn includes(self, active: bool) -> bool {
        match self {
            EntryScope::Active => active,
            EntryScope::All => true,
        }
    }
}
