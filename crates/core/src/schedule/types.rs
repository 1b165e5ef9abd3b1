use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkingHoursError;

/// A teacher whose calendar entries are booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    /// Wall-clock timezone used to interpret working hours.
    pub timezone: Tz,
}

impl Teacher {
    /// Creates a new teacher in the given timezone.
    pub fn new(name: impl Into<String>, timezone: Tz) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timezone,
        }
    }

    /// Sets a specific ID for this teacher (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Attendance capacity of a bookable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slots {
    Limited(u32),
    Unlimited,
}

impl Slots {
    /// Whether `taken` attendees fit into this capacity.
    pub fn admits(self, taken: usize) -> bool {
        match self {
            Slots::Limited(slots) => taken <= slots as usize,
            Slots::Unlimited => true,
        }
    }

    /// Whether one more attendee would still fit.
    pub fn has_room(self, taken: usize) -> bool {
        match self {
            Slots::Limited(slots) => taken < slots as usize,
            Slots::Unlimited => true,
        }
    }
}

/// Maps a 0-based weekday index (Monday = 0) to a `Weekday`.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// One open interval in a teacher's weekly availability.
///
/// A shift that crosses midnight is declared as two records: one ending at
/// `23:59` and one starting at `00:00` on the following weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub weekday: Weekday,
    #[serde(with = "crate::serde::time_of_day")]
    pub start: NaiveTime,
    #[serde(with = "crate::serde::time_of_day")]
    pub end: NaiveTime,
}

impl WorkingHours {
    /// Declares working hours for a weekday index (Monday = 0).
    pub fn new(
        teacher_id: Uuid,
        weekday: u8,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, WorkingHoursError> {
        let weekday = weekday_from_index(weekday).ok_or(WorkingHoursError::InvalidWeekday(weekday))?;
        if start >= end {
            return Err(WorkingHoursError::InvalidTimeRange);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            teacher_id,
            weekday,
            start,
            end,
        })
    }

    /// The weekday as a 0-based index (Monday = 0).
    pub fn weekday_index(&self) -> u8 {
        self.weekday.num_days_from_monday() as u8
    }

    /// Whether this record fully contains the time-of-day range `start..end`.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start <= start && end <= self.end
    }
}
