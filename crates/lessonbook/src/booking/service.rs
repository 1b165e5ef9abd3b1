use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lessonbook_core::schedule::{
    validate_intrinsic, weekdays_touched, OverlapIndex, SchedulingValidator, Teacher,
    TimelineEntry, ValidationFailure, WorkingHoursCalendar,
};
use lessonbook_core::storage::{
    CustomerRepository, EntryRepository, EntryScope, TeacherRepository, TimeRange,
    WorkingHoursRepository,
};

use super::TeacherLocks;
use crate::error::BookingError;

type Result<T> = std::result::Result<T, BookingError>;

/// Validates and persists timeline entries.
pub struct BookingService {
    teachers: Arc<dyn TeacherRepository>,
    working_hours: Arc<dyn WorkingHoursRepository>,
    entries: Arc<dyn EntryRepository>,
    customers: Arc<dyn CustomerRepository>,
    locks: TeacherLocks,
}

impl BookingService {
    pub fn new(
        teachers: Arc<dyn TeacherRepository>,
        working_hours: Arc<dyn WorkingHoursRepository>,
        entries: Arc<dyn EntryRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            teachers,
            working_hours,
            entries,
            customers,
            locks: TeacherLocks::new(),
        }
    }

    /// Validates `entry` against the teacher's live calendar and upserts it.
    ///
    /// Re-saving a persisted entry excludes the entry itself from the overlap
    /// check.
    pub async fn save_entry(&self, entry: TimelineEntry) -> Result<TimelineEntry> {
        let _guard = self.locks.acquire(entry.teacher_id).await;
        self.validate_and_save(entry).await
    }

    /// Adds `customer_id` to the entry's attendance.
    ///
    /// Adding a customer who already attends is a no-op.
    pub async fn add_customer(&self, entry_id: Uuid, customer_id: Uuid) -> Result<TimelineEntry> {
        if self.customers.get_customer(customer_id).await?.is_none() {
            return Err(BookingError::not_found("Customer", customer_id));
        }

        self.mutate(entry_id, |entry| {
            if !entry.add_customer(customer_id)? {
                tracing::debug!(entry_id = %entry.id, customer_id = %customer_id, "Customer already attends");
            }
            Ok(())
        })
        .await
    }

    pub async fn remove_customer(&self, entry_id: Uuid, customer_id: Uuid) -> Result<TimelineEntry> {
        self.mutate(entry_id, |entry| {
            entry.remove_customer(customer_id);
            Ok(())
        })
        .await
    }

    /// Moves the entry to `start`, keeping its length.
    pub async fn reschedule(&self, entry_id: Uuid, start: DateTime<Utc>) -> Result<TimelineEntry> {
        self.mutate(entry_id, |entry| {
            entry.reschedule(start);
            Ok(())
        })
        .await
    }

    /// Soft-deletes the entry. It stops occupying the teacher's calendar.
    pub async fn deactivate(&self, entry_id: Uuid) -> Result<TimelineEntry> {
        self.mutate(entry_id, |entry| {
            entry.deactivate();
            Ok(())
        })
        .await
    }

    /// Loads an active entry, applies `change` under the teacher's lock and
    /// saves the result.
    async fn mutate<F>(&self, entry_id: Uuid, change: F) -> Result<TimelineEntry>
    where
        F: FnOnce(&mut TimelineEntry) -> std::result::Result<(), ValidationFailure>,
    {
        let teacher_id = self.load_active_entry(entry_id).await?.teacher_id;
        let _guard = self.locks.acquire(teacher_id).await;

        // Reload under the lock; the entry may have changed while we waited.
        let mut entry = self.load_active_entry(entry_id).await?;
        change(&mut entry)?;
        self.validate_and_save(entry).await
    }

    async fn load_active_entry(&self, entry_id: Uuid) -> Result<TimelineEntry> {
        self.entries
            .get_entry(entry_id, EntryScope::Active)
            .await?
            .ok_or_else(|| BookingError::not_found("TimelineEntry", entry_id))
    }

    /// Must be called with the teacher's lock held.
    async fn validate_and_save(&self, entry: TimelineEntry) -> Result<TimelineEntry> {
        if let Err(err) = self.validate(&entry).await {
            if let Some(failure) = err.validation() {
                tracing::warn!(
                    entry_id = %entry.id,
                    teacher_id = %entry.teacher_id,
                    rule = ?failure.rule(),
                    error = %failure,
                    "Timeline entry rejected"
                );
            }
            return Err(err);
        }

        self.entries.save_entry(&entry).await?;
        tracing::info!(
            entry_id = %entry.id,
            teacher_id = %entry.teacher_id,
            name = %entry.name(),
            start = %entry.start,
            end = %entry.end,
            active = entry.active,
            "Timeline entry saved"
        );
        Ok(entry)
    }

    async fn validate(&self, entry: &TimelineEntry) -> Result<()> {
        validate_intrinsic(entry)?;

        // An inactive entry occupies nothing, so there is nothing to collide with.
        if !entry.active {
            return Ok(());
        }

        let teacher = self
            .teachers
            .get_teacher(entry.teacher_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Teacher", entry.teacher_id))?;

        let index = if entry.allow_overlap {
            OverlapIndex::default()
        } else {
            let range = TimeRange::new(entry.start, entry.end).map_err(|_| {
                ValidationFailure::InvalidInterval {
                    start: entry.start,
                    end: entry.end,
                }
            })?;
            let snapshot = self
                .entries
                .get_entries_by_teacher(teacher.id, range, EntryScope::Active)
                .await?;
            OverlapIndex::new(snapshot)
        };

        let calendar = if entry.allow_besides_working_hours {
            WorkingHoursCalendar::for_teacher(&teacher, Vec::new())
        } else {
            self.calendar_for(&teacher, entry).await?
        };

        SchedulingValidator::new(&calendar, &index).validate(entry)?;
        Ok(())
    }

    /// Working hours for every local weekday the entry touches.
    async fn calendar_for(
        &self,
        teacher: &Teacher,
        entry: &TimelineEntry,
    ) -> Result<WorkingHoursCalendar> {
        let mut records = Vec::new();
        for weekday in weekdays_touched(teacher.timezone, entry.start, entry.end) {
            records.extend(
                self.working_hours
                    .get_working_hours_for_weekday(teacher.id, weekday)
                    .await?,
            );
        }
        Ok(WorkingHoursCalendar::for_teacher(teacher, records))
    }
}
