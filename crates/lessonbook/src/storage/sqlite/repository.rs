//! SQLite repository implementation.
//!
//! Implements the repository traits from `lessonbook_core::storage` using SQLite.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Weekday;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use lessonbook_core::market::{Class, Customer, Subscription};
use lessonbook_core::schedule::{Teacher, TimelineEntry, WorkingHours};
use lessonbook_core::storage::{
    CustomerRepository, EntryRepository, EntryScope, RepositoryError, Result,
    SubscriptionRepository, TeacherRepository, TimeRange, WorkingHoursRepository,
};

use super::conversions::{
    format_datetime, format_time, format_timezone, lesson_to_json, row_to_customer, row_to_entry,
    row_to_teacher, row_to_uuid, row_to_working_hours,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn scope_flag(scope: EntryScope) -> i64 {
    match scope {
        EntryScope::Active => 1,
        EntryScope::All => 0,
    }
}

/// Loads the attendance set of every entry in `entries`.
fn attach_customers(
    conn: &rusqlite::Connection,
    entries: &mut [TimelineEntry],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(schema::SELECT_ENTRY_CUSTOMERS)?;
    for entry in entries.iter_mut() {
        let customers = stmt
            .query_map([entry.id.to_string()], row_to_uuid)?
            .collect::<rusqlite::Result<BTreeSet<Uuid>>>()?;
        entry.customers = customers;
    }
    Ok(())
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// TeacherRepository implementation
// ============================================================================

#[async_trait]
impl TeacherRepository for SqliteRepository {
    async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_TEACHER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_teacher) {
                    Ok(teacher) => Ok(Some(teacher)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Teacher", id.to_string()))
    }

    async fn create_teacher(&self, teacher: &Teacher) -> Result<()> {
        let id = teacher.id.to_string();
        let name = teacher.name.clone();
        let timezone = format_timezone(&teacher.timezone);
        let teacher_id = teacher.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_TEACHER, rusqlite::params![id, name, timezone])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Teacher", teacher_id))
    }
}

// ============================================================================
// WorkingHoursRepository implementation
// ============================================================================

#[async_trait]
impl WorkingHoursRepository for SqliteRepository {
    async fn get_working_hours(&self, teacher_id: Uuid) -> Result<Vec<WorkingHours>> {
        let teacher_id_str = teacher_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_WORKING_HOURS_BY_TEACHER)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&teacher_id_str], row_to_working_hours)
                    .map_err(wrap_err)?;

                let mut hours = Vec::new();
                for row_result in rows {
                    hours.push(row_result.map_err(wrap_err)?);
                }
                Ok(hours)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "WorkingHours"))
    }

    async fn get_working_hours_for_weekday(
        &self,
        teacher_id: Uuid,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>> {
        let teacher_id_str = teacher_id.to_string();
        let weekday_index = weekday.num_days_from_monday();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_WORKING_HOURS_BY_TEACHER_AND_WEEKDAY)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![teacher_id_str, weekday_index],
                        row_to_working_hours,
                    )
                    .map_err(wrap_err)?;

                let mut hours = Vec::new();
                for row_result in rows {
                    hours.push(row_result.map_err(wrap_err)?);
                }
                Ok(hours)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "WorkingHours"))
    }

    async fn create_working_hours(&self, hours: &WorkingHours) -> Result<()> {
        let id = hours.id.to_string();
        let teacher_id = hours.teacher_id.to_string();
        let weekday = hours.weekday_index();
        let start = format_time(&hours.start);
        let end = format_time(&hours.end);
        let hours_id = hours.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_WORKING_HOURS,
                    rusqlite::params![id, teacher_id, weekday, start, end],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "WorkingHours", hours_id))
    }

    async fn delete_working_hours(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_WORKING_HOURS, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "WorkingHours", id.to_string()))
    }
}

// ============================================================================
// EntryRepository implementation
// ============================================================================

#[async_trait]
impl EntryRepository for SqliteRepository {
    async fn get_entry(&self, id: Uuid, scope: EntryScope) -> Result<Option<TimelineEntry>> {
        let id_str = id.to_string();
        let active_only = scope_flag(scope);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ENTRY_BY_ID).map_err(wrap_err)?;
                let entry = match stmt.query_row(rusqlite::params![id_str, active_only], row_to_entry)
                {
                    Ok(entry) => entry,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(wrap_err(e)),
                };

                let mut entries = [entry];
                attach_customers(conn, &mut entries).map_err(wrap_err)?;
                let [entry] = entries;
                Ok(Some(entry))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "TimelineEntry", id.to_string()))
    }

    async fn get_entries_by_teacher(
        &self,
        teacher_id: Uuid,
        range: TimeRange,
        scope: EntryScope,
    ) -> Result<Vec<TimelineEntry>> {
        let teacher_id_str = teacher_id.to_string();
        let start_str = format_datetime(&range.start);
        let end_str = format_datetime(&range.end);
        let active_only = scope_flag(scope);

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ENTRIES_BY_TEACHER_AND_RANGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![teacher_id_str, start_str, end_str, active_only],
                        row_to_entry,
                    )
                    .map_err(wrap_err)?;

                let mut entries = Vec::new();
                for row_result in rows {
                    entries.push(row_result.map_err(wrap_err)?);
                }
                attach_customers(conn, &mut entries).map_err(wrap_err)?;
                Ok(entries)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "TimelineEntry"))
    }

    async fn save_entry(&self, entry: &TimelineEntry) -> Result<()> {
        let id = entry.id.to_string();
        let teacher_id = entry.teacher_id.to_string();
        let lesson = entry.lesson.as_ref().map(lesson_to_json).transpose()?;
        let starts_at = format_datetime(&entry.start);
        let ends_at = format_datetime(&entry.end);
        let active = entry.active;
        let allow_overlap = entry.allow_overlap;
        let allow_besides_working_hours = entry.allow_besides_working_hours;
        let customers: Vec<String> = entry.customers.iter().map(Uuid::to_string).collect();
        let entry_id = entry.id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(
                    schema::UPSERT_ENTRY,
                    rusqlite::params![
                        id,
                        teacher_id,
                        lesson,
                        starts_at,
                        ends_at,
                        active,
                        allow_overlap,
                        allow_besides_working_hours
                    ],
                )
                .map_err(wrap_err)?;
                tx.execute(schema::DELETE_ENTRY_CUSTOMERS, [&id])
                    .map_err(wrap_err)?;
                for customer_id in &customers {
                    tx.execute(schema::INSERT_ENTRY_CUSTOMER, [&id, customer_id])
                        .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "TimelineEntry", entry_id))
    }
}

// ============================================================================
// CustomerRepository implementation
// ============================================================================

#[async_trait]
impl CustomerRepository for SqliteRepository {
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_CUSTOMER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_customer) {
                    Ok(customer) => Ok(Some(customer)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Customer", id.to_string()))
    }

    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        let id = customer.id.to_string();
        let name = customer.name.clone();
        let email = customer.email.clone();
        let timezone = format_timezone(&customer.timezone);
        let customer_id = customer.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_CUSTOMER,
                    rusqlite::params![id, name, email, timezone],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Customer", customer_id))
    }
}

// ============================================================================
// SubscriptionRepository implementation
// ============================================================================

#[async_trait]
impl SubscriptionRepository for SqliteRepository {
    async fn create_subscription(&self, subscription: &Subscription) -> Result<()> {
        let id = subscription.id.to_string();
        let customer_id = subscription.customer_id.to_string();
        let is_fully_used = subscription.is_fully_used;
        let subscription_id = subscription.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_SUBSCRIPTION,
                    rusqlite::params![id, customer_id, is_fully_used],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Subscription", subscription_id))
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let id = subscription.id.to_string();
        let customer_id = subscription.customer_id.to_string();
        let is_fully_used = subscription.is_fully_used;
        let subscription_id = subscription.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_SUBSCRIPTION,
                        rusqlite::params![id, customer_id, is_fully_used],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Subscription", subscription_id))
    }

    async fn create_class(&self, class: &Class) -> Result<()> {
        let id = class.id.to_string();
        let customer_id = class.customer_id.to_string();
        let subscription_id = class.subscription_id.map(|id| id.to_string());
        let timeline_entry_id = class.timeline_entry_id.map(|id| id.to_string());
        let class_id = class.id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_CLASS,
                    rusqlite::params![id, customer_id, subscription_id, timeline_entry_id],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Class", class_id))
    }

    async fn get_customers_with_open_subscription(&self) -> Result<Vec<Customer>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_CUSTOMERS_WITH_OPEN_SUBSCRIPTION)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_customer).map_err(wrap_err)?;

                let mut customers = Vec::new();
                for row_result in rows {
                    customers.push(row_result.map_err(wrap_err)?);
                }
                Ok(customers)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Customer"))
    }

    async fn get_customers_with_class_ended_within(&self, range: TimeRange) -> Result<Vec<Uuid>> {
        let start_str = format_datetime(&range.start);
        let end_str = format_datetime(&range.end);

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_CUSTOMERS_WITH_CLASS_ENDED_WITHIN)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&start_str, &end_str], row_to_uuid)
                    .map_err(wrap_err)?;

                let mut ids = Vec::new();
                for row_result in rows {
                    ids.push(row_result.map_err(wrap_err)?);
                }
                Ok(ids)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Class"))
    }
}
