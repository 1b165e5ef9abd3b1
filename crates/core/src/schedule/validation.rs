//! Pre-save validation of timeline entries.
//!
//! Pure checks over a snapshot of the teacher's calendar. The caller is
//! responsible for fetching a consistent snapshot and for persisting only
//! when validation passes.

use super::{OverlapIndex, Slots, TimelineEntry, ValidationFailure, WorkingHoursCalendar};

/// Fails if the lesson is bound to a host other than the entry's teacher.
pub fn check_host(entry: &TimelineEntry) -> Result<(), ValidationFailure> {
    match entry.host() {
        Some(host_id) if host_id != entry.teacher_id => Err(ValidationFailure::HostMismatch {
            teacher_id: entry.teacher_id,
            host_id,
        }),
        _ => Ok(()),
    }
}

pub fn check_interval(entry: &TimelineEntry) -> Result<(), ValidationFailure> {
    if entry.start >= entry.end {
        return Err(ValidationFailure::InvalidInterval {
            start: entry.start,
            end: entry.end,
        });
    }
    Ok(())
}

pub fn check_capacity(entry: &TimelineEntry) -> Result<(), ValidationFailure> {
    match entry.slots() {
        Slots::Limited(slots) if !entry.slots().admits(entry.taken_slots()) => {
            Err(ValidationFailure::OverCapacity {
                slots,
                requested: entry.taken_slots(),
            })
        }
        _ => Ok(()),
    }
}

pub fn check_overlap(entry: &TimelineEntry, index: &OverlapIndex) -> Result<(), ValidationFailure> {
    if entry.allow_overlap {
        return Ok(());
    }
    match index.conflicts(entry.teacher_id, entry.start, entry.end, Some(entry.id)) {
        Some(conflict) => Err(ValidationFailure::Overlap {
            conflicting_entry: conflict.id,
        }),
        None => Ok(()),
    }
}

pub fn check_working_hours(
    entry: &TimelineEntry,
    calendar: &WorkingHoursCalendar,
) -> Result<(), ValidationFailure> {
    if entry.allow_besides_working_hours || calendar.covers(entry.start, entry.end) {
        return Ok(());
    }
    Err(ValidationFailure::OutsideWorkingHours)
}

/// Checks that need nothing but the entry itself.
///
/// Runs before any snapshot is fetched.
pub fn validate_intrinsic(entry: &TimelineEntry) -> Result<(), ValidationFailure> {
    check_host(entry)?;
    check_interval(entry)?;
    check_capacity(entry)
}

/// Runs every scheduling rule against one calendar snapshot.
pub struct SchedulingValidator<'a> {
    calendar: &'a WorkingHoursCalendar,
    index: &'a OverlapIndex,
}

impl<'a> SchedulingValidator<'a> {
    pub fn new(calendar: &'a WorkingHoursCalendar, index: &'a OverlapIndex) -> Self {
        Self { calendar, index }
    }

    /// Validates in order: host, interval, capacity, overlap, working hours.
    ///
    /// Stops at the first failing rule.
    pub fn validate(&self, entry: &TimelineEntry) -> Result<(), ValidationFailure> {
        validate_intrinsic(entry)?;
        check_overlap(entry, self.index)?;
        check_working_hours(entry, self.calendar)
    }
}
