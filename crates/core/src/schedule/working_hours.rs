//! Working-hours coverage.
//!
//! An interval is split at every local midnight it crosses, and at every UTC
//! offset change of the teacher's timezone. Each piece must fit inside a single
//! working-hours record for its weekday.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, Utc, Weekday};
use chrono_tz::Tz;

use super::{Teacher, WorkingHours};

/// The latest time-of-day a working-hours record can end at.
///
/// Any time of day after it counts as `23:59`, so a record ending at `23:59`
/// covers the rest of its day.
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(time) => time,
    None => panic!("23:59 is a valid time of day"),
};

/// Offset changes are searched for in windows of this many hours. Timezones
/// never change offset twice within one.
const OFFSET_SCAN_HOURS: i64 = 12;

/// The part of an interval that falls on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Splits a local `start..end` interval into one segment per day touched.
///
/// The local clock must not jump inside the interval. An interval ending
/// exactly at midnight produces no segment for the following day.
pub fn day_segments(start: NaiveDateTime, end: NaiveDateTime) -> Vec<DaySegment> {
    let mut segments = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let date = cursor.date();
        let next_midnight = date.succ_opt().map(|next| next.and_time(NaiveTime::MIN));

        let (segment_end, next_cursor) = match next_midnight {
            Some(midnight) if midnight <= end => (END_OF_DAY, midnight),
            _ => (end.time().min(END_OF_DAY), end),
        };

        segments.push(DaySegment {
            weekday: date.weekday(),
            start: cursor.time().min(END_OF_DAY),
            end: segment_end,
        });
        cursor = next_cursor;
    }

    segments
}

/// Splits `start..end` into day segments of `timezone`'s wall clock.
///
/// Around a DST change the same weekday can appear in several segments, one
/// per offset. Each of them is a real wall-clock range.
pub fn local_day_segments(timezone: Tz, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DaySegment> {
    constant_offset_pieces(timezone, start, end)
        .into_iter()
        .flat_map(|(from, to, offset)| {
            day_segments(from.naive_utc() + offset, to.naive_utc() + offset)
        })
        .collect()
}

fn offset_at(timezone: Tz, instant: DateTime<Utc>) -> FixedOffset {
    instant.with_timezone(&timezone).offset().fix()
}

/// Splits `start..end` at every offset change of `timezone`.
fn constant_offset_pieces(
    timezone: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>, FixedOffset)> {
    let mut pieces = Vec::new();
    let mut piece_start = start;
    let mut offset = offset_at(timezone, start);
    let mut cursor = start;

    while cursor < end {
        let window_end = (cursor + Duration::hours(OFFSET_SCAN_HOURS)).min(end);
        let window_offset = offset_at(timezone, window_end);
        if window_offset == offset {
            cursor = window_end;
            continue;
        }

        let change = first_instant_with_new_offset(timezone, cursor, window_end, offset);
        if piece_start < change {
            pieces.push((piece_start, change, offset));
        }
        piece_start = change;
        offset = offset_at(timezone, change);
        cursor = change;
    }

    if piece_start < end {
        pieces.push((piece_start, end, offset));
    }
    pieces
}

/// Binary search over whole seconds; offsets only change on second boundaries.
fn first_instant_with_new_offset(
    timezone: Tz,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    old: FixedOffset,
) -> DateTime<Utc> {
    let mut lo = from.timestamp();
    let mut hi = to.timestamp();
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        match DateTime::from_timestamp(mid, 0) {
            Some(instant) if offset_at(timezone, instant) == old => lo = mid,
            _ => hi = mid,
        }
    }
    DateTime::from_timestamp(hi, 0).map_or(to, |instant| instant.max(from))
}

/// A teacher's weekly availability, interpreted in their timezone.
#[derive(Debug, Clone)]
pub struct WorkingHoursCalendar {
    timezone: Tz,
    records: Vec<WorkingHours>,
}

impl WorkingHoursCalendar {
    /// Builds the calendar for `teacher`, ignoring records of other teachers.
    pub fn for_teacher(teacher: &Teacher, records: Vec<WorkingHours>) -> Self {
        let records = records
            .into_iter()
            .filter(|record| record.teacher_id == teacher.id)
            .collect();
        Self {
            timezone: teacher.timezone,
            records,
        }
    }

    pub fn records(&self) -> &[WorkingHours] {
        &self.records
    }

    /// Splits `start..end` into day segments in the teacher's local time.
    pub fn segments(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DaySegment> {
        local_day_segments(self.timezone, start, end)
    }

    /// Whether every day segment of `start..end` fits one record.
    ///
    /// A teacher without any working hours covers nothing.
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if self.records.is_empty() || start >= end {
            return false;
        }

        let segments = self.segments(start, end);
        !segments.is_empty()
            && segments.iter().all(|segment| {
                self.records.iter().any(|record| {
                    record.weekday == segment.weekday && record.contains(segment.start, segment.end)
                })
            })
    }
}

/// Local weekdays touched by `start..end` for a teacher in `timezone`.
///
/// Lets callers fetch only the working-hours records a check needs.
pub fn weekdays_touched(timezone: Tz, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Weekday> {
    let mut seen = BTreeSet::new();
    local_day_segments(timezone, start, end)
        .into_iter()
        .map(|segment| segment.weekday)
        .filter(|weekday| seen.insert(weekday.num_days_from_monday()))
        .collect()
}
