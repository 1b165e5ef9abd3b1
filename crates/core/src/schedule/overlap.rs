use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::TimelineEntry;

/// Half-open overlap test for `[s1, e1)` and `[s2, e2)`.
///
/// Identical intervals overlap; intervals that only touch do not.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Booked intervals that a candidate entry is checked against.
#[derive(Debug, Clone, Default)]
pub struct OverlapIndex {
    entries: Vec<TimelineEntry>,
}

impl OverlapIndex {
    pub fn new(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }

    /// First active entry of `teacher_id` overlapping `start..end`.
    ///
    /// `exclude_id` skips the entry being re-validated.
    pub fn conflicts(
        &self,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Option<&TimelineEntry> {
        self.entries.iter().find(|entry| {
            entry.active
                && entry.teacher_id == teacher_id
                && Some(entry.id) != exclude_id
                && intervals_overlap(entry.start, entry.end, start, end)
        })
    }

    pub fn overlaps(
        &self,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> bool {
        self.conflicts(teacher_id, start, end, exclude_id).is_some()
    }
}
