use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Bookable, Lesson, Slots, ValidationFailure};

/// Display name of an entry that has no lesson attached.
pub const UNNAMED_ENTRY: &str = "Usual lesson";

/// One booking on one teacher's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub lesson: Option<Lesson>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Soft-delete marker. Inactive entries are kept for history only.
    pub active: bool,
    pub allow_overlap: bool,
    pub allow_besides_working_hours: bool,
    /// Attending customers.
    pub customers: BTreeSet<Uuid>,
}

impl TimelineEntry {
    /// Creates an entry occupying `start..end` with no lesson attached.
    pub fn new(teacher_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            teacher_id,
            lesson: None,
            start,
            end,
            active: true,
            allow_overlap: false,
            allow_besides_working_hours: false,
            customers: BTreeSet::new(),
        }
    }

    /// Creates an entry for a lesson; the end is derived from its duration.
    pub fn for_lesson(teacher_id: Uuid, lesson: Lesson, start: DateTime<Utc>) -> Self {
        let end = start + lesson.duration();
        Self {
            lesson: Some(lesson),
            ..Self::new(teacher_id, start, end)
        }
    }

    /// Sets a specific ID for this entry (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Lets this entry be saved over other bookings.
    pub fn allowing_overlap(mut self) -> Self {
        self.allow_overlap = true;
        self
    }

    /// Lets this entry be saved outside the teacher's working hours.
    pub fn allowing_besides_working_hours(mut self) -> Self {
        self.allow_besides_working_hours = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn name(&self) -> &str {
        self.lesson
            .as_ref()
            .map(|lesson| lesson.name())
            .unwrap_or(UNNAMED_ENTRY)
    }

    /// Capacity of the booked lesson. A bare entry holds one customer.
    pub fn slots(&self) -> Slots {
        self.lesson
            .as_ref()
            .map(|lesson| lesson.slots())
            .unwrap_or(Slots::Limited(1))
    }

    pub fn taken_slots(&self) -> usize {
        self.customers.len()
    }

    /// Whether another customer can still join.
    pub fn is_free(&self) -> bool {
        self.slots().has_room(self.taken_slots())
    }

    pub fn host(&self) -> Option<Uuid> {
        self.lesson.as_ref().and_then(|lesson| lesson.host())
    }

    /// Adds an attending customer.
    ///
    /// Returns `Ok(false)` if the customer already attends. Fails with
    /// `OverCapacity` when the entry is full, leaving it unchanged.
    pub fn add_customer(&mut self, customer_id: Uuid) -> Result<bool, ValidationFailure> {
        if self.customers.contains(&customer_id) {
            return Ok(false);
        }
        let requested = self.taken_slots() + 1;
        if let Slots::Limited(slots) = self.slots() {
            if !self.slots().admits(requested) {
                return Err(ValidationFailure::OverCapacity { slots, requested });
            }
        }
        self.customers.insert(customer_id);
        Ok(true)
    }

    /// Removes an attending customer. Returns whether they were attending.
    pub fn remove_customer(&mut self, customer_id: Uuid) -> bool {
        self.customers.remove(&customer_id)
    }

    /// Moves the entry to a new start, keeping its length.
    ///
    /// Lesson entries take their length from the lesson duration.
    pub fn reschedule(&mut self, start: DateTime<Utc>) {
        let length = match &self.lesson {
            Some(lesson) => lesson.duration(),
            None => self.end - self.start,
        };
        self.start = start;
        self.end = start + length;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 1, 3, 4, 0, 0).unwrap()
    }

    fn master_class(host: Uuid, slots: u32) -> Lesson {
        Lesson::master_class("Phrasal verbs", Duration::minutes(60), host, slots)
    }

    #[test]
    fn test_entry_named_after_lesson() {
        let lesson = Lesson::ordinary("Test_Lesson_Name", Duration::minutes(30));
        let entry = TimelineEntry::for_lesson(Uuid::new_v4(), lesson, start());

        assert_eq!(entry.to_string(), "Test_Lesson_Name");
    }

    #[test]
    fn test_entry_without_lesson_uses_placeholder_name() {
        let entry = TimelineEntry::new(Uuid::new_v4(), start(), start() + Duration::minutes(30));

        assert_eq!(entry.name(), "Usual lesson");
    }

    #[test]
    fn test_entry_takes_attributes_from_lesson() {
        let lesson = Lesson::ordinary("English", Duration::minutes(45));
        let entry = TimelineEntry::for_lesson(Uuid::new_v4(), lesson.clone(), start());

        assert_eq!(entry.slots(), lesson.slots());
        assert_eq!(entry.end, entry.start + Duration::minutes(45));
        assert!(entry.active);
        assert!(!entry.allow_overlap);
        assert!(!entry.allow_besides_working_hours);
    }

    #[test]
    fn test_available_slot_count() {
        let teacher = Uuid::new_v4();
        let entry = TimelineEntry::for_lesson(teacher, master_class(teacher, 10), start());

        assert_eq!(entry.slots(), Slots::Limited(10));
    }

    #[test]
    fn test_taken_slot_count() {
        let teacher = Uuid::new_v4();
        let mut entry = TimelineEntry::for_lesson(teacher, master_class(teacher, 10), start());

        for i in 0..5 {
            assert_eq!(entry.taken_slots(), i);
            entry.add_customer(Uuid::new_v4()).unwrap();
        }
        assert_eq!(entry.taken_slots(), 5);
    }

    #[test]
    fn test_is_free_until_capacity_reached() {
        let teacher = Uuid::new_v4();
        let mut entry = TimelineEntry::for_lesson(teacher, master_class(teacher, 10), start());

        for _ in 0..10 {
            assert!(entry.is_free());
            entry.add_customer(Uuid::new_v4()).unwrap();
        }
        assert!(!entry.is_free());

        let result = entry.add_customer(Uuid::new_v4());

        assert_eq!(
            result,
            Err(ValidationFailure::OverCapacity {
                slots: 10,
                requested: 11
            })
        );
        assert_eq!(entry.taken_slots(), 10);
    }

    #[test]
    fn test_adding_same_customer_twice_is_noop() {
        let teacher = Uuid::new_v4();
        let mut entry = TimelineEntry::for_lesson(teacher, master_class(teacher, 1), start());
        let customer = Uuid::new_v4();

        assert_eq!(entry.add_customer(customer), Ok(true));
        assert_eq!(entry.add_customer(customer), Ok(false));
        assert_eq!(entry.taken_slots(), 1);
    }

    #[test]
    fn test_unlimited_lesson_is_always_free() {
        let lesson = Lesson::ordinary("English", Duration::minutes(30));
        let mut entry = TimelineEntry::for_lesson(Uuid::new_v4(), lesson, start());

        for _ in 0..50 {
            entry.add_customer(Uuid::new_v4()).unwrap();
        }
        assert!(entry.is_free());
    }

    #[test]
    fn test_remove_customer_frees_slot() {
        let teacher = Uuid::new_v4();
        let mut entry = TimelineEntry::for_lesson(teacher, master_class(teacher, 1), start());
        let customer = Uuid::new_v4();
        entry.add_customer(customer).unwrap();
        assert!(!entry.is_free());

        assert!(entry.remove_customer(customer));
        assert!(!entry.remove_customer(customer));
        assert!(entry.is_free());
    }

    #[test]
    fn test_reschedule_lesson_entry_uses_lesson_duration() {
        let lesson = Lesson::ordinary("English", Duration::minutes(30));
        let mut entry = TimelineEntry::for_lesson(Uuid::new_v4(), lesson, start());
        let new_start = start() + Duration::minutes(1);

        entry.reschedule(new_start);

        assert_eq!(entry.start, new_start);
        assert_eq!(entry.end, new_start + Duration::minutes(30));
    }

    #[test]
    fn test_reschedule_bare_entry_keeps_length() {
        let mut entry = TimelineEntry::new(Uuid::new_v4(), start(), start() + Duration::hours(2));
        let new_start = start() + Duration::days(1);

        entry.reschedule(new_start);

        assert_eq!(entry.end - entry.start, Duration::hours(2));
    }

    #[test]
    fn test_deactivate() {
        let mut entry = TimelineEntry::new(Uuid::new_v4(), start(), start() + Duration::hours(1));

        entry.deactivate();

        assert!(!entry.active);
    }
}
