use async_trait::async_trait;
use chrono::Weekday;
use uuid::Uuid;

use crate::market::{Class, Customer, Subscription};
use crate::schedule::{Teacher, TimelineEntry, WorkingHours};

use super::{EntryScope, Result, TimeRange};

/// Repository for teacher operations.
#[async_trait]
pub trait TeacherRepository: Send + Sync {
    /// Gets a teacher by their ID.
    async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>>;

    /// Creates a new teacher.
    async fn create_teacher(&self, teacher: &Teacher) -> Result<()>;
}

/// Repository for working-hours records.
#[async_trait]
pub trait WorkingHoursRepository: Send + Sync {
    /// Gets all working hours of a teacher.
    async fn get_working_hours(&self, teacher_id: Uuid) -> Result<Vec<WorkingHours>>;

    /// Gets a teacher's working hours on one weekday.
    async fn get_working_hours_for_weekday(
        &self,
        teacher_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>>;

    /// Creates a new working-hours record.
    async fn create_working_hours(&self, hours: &WorkingHours) -> Result<()>;

    /// Deletes a working-hours record by its ID.
    async fn delete_working_hours(&self, id: Uuid) -> Result<()>;
}

/// Repository for timeline entries.
///
/// Entries are never hard-deleted here; soft deletion goes through the
/// `active` flag and a regular save.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Gets an entry by its ID.
    async fn get_entry(&self, id: Uuid, scope: EntryScope) -> Result<Option<TimelineEntry>>;

    /// Gets a teacher's entries overlapping `range` (half-open).
    async fn get_entries_by_teacher(
        &self,
        teacher_id: Uuid,
        range: TimeRange,
        scope: EntryScope,
    ) -> Result<Vec<TimelineEntry>>;

    /// Inserts or replaces an entry together with its attendance set.
    ///
    /// Either the whole entry is written or nothing is.
    async fn save_entry(&self, entry: &TimelineEntry) -> Result<()>;
}

/// Repository for customer operations.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Gets a customer by their ID.
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>>;

    /// Creates a new customer.
    async fn create_customer(&self, customer: &Customer) -> Result<()>;
}

/// Repository for subscriptions and the classes bought with them.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Creates a new subscription.
    async fn create_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Updates an existing subscription.
    async fn update_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Creates a new class.
    async fn create_class(&self, class: &Class) -> Result<()>;

    /// Customers holding at least one subscription that is not fully used.
    async fn get_customers_with_open_subscription(&self) -> Result<Vec<Customer>>;

    /// IDs of customers with a subscription class whose entry ended within
    /// `range` (both ends inclusive).
    async fn get_customers_with_class_ended_within(&self, range: TimeRange) -> Result<Vec<Uuid>>;
}
