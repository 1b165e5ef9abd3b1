//! In-memory repository implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use tokio::sync::RwLock;
use uuid::Uuid;

use lessonbook_core::market::{is_recent_subscription_class, Class, Customer, Subscription};
use lessonbook_core::schedule::{intervals_overlap, Teacher, TimelineEntry, WorkingHours};
use lessonbook_core::storage::{
    CustomerRepository, EntryRepository, EntryScope, RepositoryError, Result,
    SubscriptionRepository, TeacherRepository, TimeRange, WorkingHoursRepository,
};

/// In-memory storage backend for testing.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    teachers: Arc<RwLock<HashMap<Uuid, Teacher>>>,
    working_hours: Arc<RwLock<HashMap<Uuid, WorkingHours>>>,
    entries: Arc<RwLock<HashMap<Uuid, TimelineEntry>>>,
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
    subscriptions: Arc<RwLock<HashMap<Uuid, Subscription>>>,
    classes: Arc<RwLock<HashMap<Uuid, Class>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            teachers: Arc::new(RwLock::new(HashMap::new())),
            working_hours: Arc::new(RwLock::new(HashMap::new())),
            entries: Arc::new(RwLock::new(HashMap::new())),
            customers: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            classes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TeacherRepository for InMemoryRepository {
    async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
        let teachers = self.teachers.read().await;
        Ok(teachers.get(&id).cloned())
    }

    async fn create_teacher(&self, teacher: &Teacher) -> Result<()> {
        let mut teachers = self.teachers.write().await;
        if teachers.contains_key(&teacher.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Teacher",
                id: teacher.id.to_string(),
            });
        }
        teachers.insert(teacher.id, teacher.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkingHoursRepository for InMemoryRepository {
    async fn get_working_hours(&self, teacher_id: Uuid) -> Result<Vec<WorkingHours>> {
        let working_hours = self.working_hours.read().await;
        Ok(working_hours
            .values()
            .filter(|h| h.teacher_id == teacher_id)
            .cloned()
            .collect())
    }

    async fn get_working_hours_for_weekday(
        &self,
        teacher_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>> {
        let working_hours = self.working_hours.read().await;
        Ok(working_hours
            .values()
            .filter(|h| h.teacher_id == teacher_id && h.weekday == weekday)
            .cloned()
            .collect())
    }

    async fn create_working_hours(&self, hours: &WorkingHours) -> Result<()> {
        let mut working_hours = self.working_hours.write().await;
        if working_hours.contains_key(&hours.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "WorkingHours",
                id: hours.id.to_string(),
            });
        }
        working_hours.insert(hours.id, hours.clone());
        Ok(())
    }

    async fn delete_working_hours(&self, id: Uuid) -> Result<()> {
        let mut working_hours = self.working_hours.write().await;
        if working_hours.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "WorkingHours",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for InMemoryRepository {
    async fn get_entry(&self, id: Uuid, scope: EntryScope) -> Result<Option<TimelineEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).filter(|e| scope.includes(e.active)).cloned())
    }

    async fn get_entries_by_teacher(
        &self,
        teacher_id: Uuid,
        range: TimeRange,
        scope: EntryScope,
    ) -> Result<Vec<TimelineEntry>> {
        let entries = self.entries.read().await;
        let mut found: Vec<TimelineEntry> = entries
            .values()
            .filter(|e| e.teacher_id == teacher_id && scope.includes(e.active))
            .filter(|e| intervals_overlap(e.start, e.end, range.start, range.end))
            .cloned()
            .collect();
        found.sort_by_key(|e| e.start);
        Ok(found)
    }

    async fn save_entry(&self, entry: &TimelineEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.id, entry.clone());
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryRepository {
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }

    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let mut customers = self.customers.write().await;
        if customers.contains_key(&customer.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Customer",
                id: customer.id.to_string(),
            });
        }
        customers.insert(customer.id, customer.clone());
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryRepository {
    async fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains_key(&subscription.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Subscription",
                id: subscription.id.to_string(),
            });
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if !subscriptions.contains_key(&subscription.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Subscription",
                id: subscription.id.to_string(),
            });
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn create_class(&self, class: &Class) -> Result<()> {
        let mut classes = self.classes.write().await;
        if classes.contains_key(&class.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Class",
                id: class.id.to_string(),
            });
        }
        classes.insert(class.id, class.clone());
        Ok(())
    }

    async fn get_customers_with_open_subscription(&self) -> Result<Vec<Customer>> {
        let subscriptions = self.subscriptions.read().await;
        let customers = self.customers.read().await;

        let subscribed: HashSet<Uuid> = subscriptions
            .values()
            .filter(|s| !s.is_fully_used)
            .map(|s| s.customer_id)
            .collect();

        Ok(customers
            .values()
            .filter(|c| subscribed.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn get_customers_with_class_ended_within(&self, range: TimeRange) -> Result<Vec<Uuid>> {
        let classes = self.classes.read().await;
        let entries = self.entries.read().await;

        let active: HashSet<Uuid> = classes
            .values()
            .filter(|class| {
                let entry = class.timeline_entry_id.and_then(|id| entries.get(&id));
                is_recent_subscription_class(class, entry, &range)
            })
            .map(|class| class.customer_id)
            .collect();

        Ok(active.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap()
    }

    fn day() -> TimeRange {
        TimeRange::new(at(0), at(23)).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_teacher() {
        let repo = InMemoryRepository::new();
        let teacher = Teacher::new("Ms. Smith", chrono_tz::Europe::London);

        repo.create_teacher(&teacher).await.unwrap();

        let fetched = repo.get_teacher(teacher.id).await.unwrap();
        assert_eq!(fetched, Some(teacher));
    }

    #[tokio::test]
    async fn test_create_duplicate_teacher_fails() {
        let repo = InMemoryRepository::new();
        let teacher = Teacher::new("Ms. Smith", chrono_tz::UTC);

        repo.create_teacher(&teacher).await.unwrap();
        let result = repo.create_teacher(&teacher).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_working_hours_by_weekday() {
        let repo = InMemoryRepository::new();
        let teacher_id = Uuid::new_v4();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let monday = WorkingHours::new(teacher_id, 0, nine, five).unwrap();
        let tuesday = WorkingHours::new(teacher_id, 1, nine, five).unwrap();
        repo.create_working_hours(&monday).await.unwrap();
        repo.create_working_hours(&tuesday).await.unwrap();

        let all = repo.get_working_hours(teacher_id).await.unwrap();
        let mondays = repo
            .get_working_hours_for_weekday(teacher_id, Weekday::Mon)
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(mondays, vec![monday.clone()]);

        repo.delete_working_hours(monday.id).await.unwrap();
        assert_eq!(repo.get_working_hours(teacher_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_default_scope() {
        let repo = InMemoryRepository::new();
        let teacher_id = Uuid::new_v4();
        let active = TimelineEntry::new(teacher_id, at(9), at(10));
        let inactive = TimelineEntry::new(teacher_id, at(11), at(12)).inactive();
        repo.save_entry(&active).await.unwrap();
        repo.save_entry(&inactive).await.unwrap();

        let listed = repo
            .get_entries_by_teacher(teacher_id, day(), EntryScope::Active)
            .await
            .unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![active.id]);
        assert!(repo
            .get_entry(inactive.id, EntryScope::Active)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .get_entry(inactive.id, EntryScope::All)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_entries_filtered_by_teacher_and_range() {
        let repo = InMemoryRepository::new();
        let teacher_id = Uuid::new_v4();
        let inside = TimelineEntry::new(teacher_id, at(9), at(10));
        let touching = TimelineEntry::new(teacher_id, at(12), at(13));
        let other_teacher = TimelineEntry::new(Uuid::new_v4(), at(9), at(10));
        for entry in [&inside, &touching, &other_teacher] {
            repo.save_entry(entry).await.unwrap();
        }

        let range = TimeRange::new(at(8), at(12)).unwrap();
        let found = repo
            .get_entries_by_teacher(teacher_id, range, EntryScope::All)
            .await
            .unwrap();

        assert_eq!(found, vec![inside]);
    }

    #[tokio::test]
    async fn test_save_entry_replaces_existing() {
        let repo = InMemoryRepository::new();
        let mut entry = TimelineEntry::new(Uuid::new_v4(), at(9), at(10));
        repo.save_entry(&entry).await.unwrap();

        entry.customers.insert(Uuid::new_v4());
        repo.save_entry(&entry).await.unwrap();

        let fetched = repo.get_entry(entry.id, EntryScope::All).await.unwrap();
        assert_eq!(fetched.map(|e| e.taken_slots()), Some(1));
    }

    #[tokio::test]
    async fn test_customers_with_open_subscription() {
        let repo = InMemoryRepository::new();
        let open = Customer::new("Open", "open@example.com", chrono_tz::UTC);
        let used = Customer::new("Used", "used@example.com", chrono_tz::UTC);
        let none = Customer::new("None", "none@example.com", chrono_tz::UTC);
        for customer in [&open, &used, &none] {
            repo.create_customer(customer).await.unwrap();
        }
        repo.create_subscription(&Subscription::new(open.id))
            .await
            .unwrap();
        let mut spent = Subscription::new(used.id);
        repo.create_subscription(&spent).await.unwrap();
        spent.is_fully_used = true;
        repo.update_subscription(&spent).await.unwrap();

        let subscribed = repo.get_customers_with_open_subscription().await.unwrap();

        assert_eq!(subscribed, vec![open]);
    }

    #[tokio::test]
    async fn test_customers_with_class_ended_within() {
        let repo = InMemoryRepository::new();
        let customer = Customer::new("Ann", "ann@example.com", chrono_tz::UTC);
        let subscription = Subscription::new(customer.id);
        let entry = TimelineEntry::new(Uuid::new_v4(), at(9), at(10));
        repo.save_entry(&entry).await.unwrap();
        repo.create_class(
            &Class::new(customer.id)
                .with_subscription(subscription.id)
                .scheduled_on(entry.id),
        )
        .await
        .unwrap();

        let within = TimeRange::trailing_days(at(12), 7);
        let later = TimeRange::trailing_days(at(12) + Duration::days(10), 7);

        assert_eq!(
            repo.get_customers_with_class_ended_within(within)
                .await
                .unwrap(),
            vec![customer.id]
        );
        assert!(repo
            .get_customers_with_class_ended_within(later)
            .await
            .unwrap()
            .is_empty());
    }
}
