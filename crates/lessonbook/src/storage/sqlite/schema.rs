//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.
//!
//! Instants are stored as fixed-width RFC 3339 UTC strings so that text
//! comparison orders them chronologically.
//!
//! Foreign keys are enforced: working hours need their teacher, subscriptions
//! and classes need their customer, attendance rows need their entry.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Teachers table
CREATE TABLE IF NOT EXISTS teachers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    timezone TEXT NOT NULL
);

-- Weekly working hours, weekday 0 = Monday
CREATE TABLE IF NOT EXISTS working_hours (
    id TEXT PRIMARY KEY,
    teacher_id TEXT NOT NULL,
    weekday INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    FOREIGN KEY (teacher_id) REFERENCES teachers(id) ON DELETE CASCADE
);

-- Timeline entries table
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    teacher_id TEXT NOT NULL,
    lesson TEXT,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    allow_overlap INTEGER NOT NULL DEFAULT 0,
    allow_besides_working_hours INTEGER NOT NULL DEFAULT 0
);

-- Customers attending an entry
CREATE TABLE IF NOT EXISTS entry_customers (
    entry_id TEXT NOT NULL,
    customer_id TEXT NOT NULL,
    PRIMARY KEY (entry_id, customer_id),
    FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE
);

-- Customers table
CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    timezone TEXT NOT NULL
);

-- Subscriptions table
CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL,
    is_fully_used INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
);

-- Classes table
CREATE TABLE IF NOT EXISTS classes (
    id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL,
    subscription_id TEXT,
    timeline_entry_id TEXT,
    FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_working_hours_teacher_weekday ON working_hours(teacher_id, weekday);
CREATE INDEX IF NOT EXISTS idx_entries_teacher_start ON entries(teacher_id, starts_at);
CREATE INDEX IF NOT EXISTS idx_entries_ends_at ON entries(ends_at);
CREATE INDEX IF NOT EXISTS idx_subscriptions_customer_id ON subscriptions(customer_id);
CREATE INDEX IF NOT EXISTS idx_classes_timeline_entry_id ON classes(timeline_entry_id);
"#;

// Teacher queries
pub const INSERT_TEACHER: &str = r#"
INSERT INTO teachers (id, name, timezone)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_TEACHER_BY_ID: &str = r#"
SELECT id, name, timezone
FROM teachers
WHERE id = ?1
"#;

// Working hours queries
pub const INSERT_WORKING_HOURS: &str = r#"
INSERT INTO working_hours (id, teacher_id, weekday, start_time, end_time)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_WORKING_HOURS_BY_TEACHER: &str = r#"
SELECT id, teacher_id, weekday, start_time, end_time
FROM working_hours
WHERE teacher_id = ?1
ORDER BY weekday, start_time
"#;

pub const SELECT_WORKING_HOURS_BY_TEACHER_AND_WEEKDAY: &str = r#"
SELECT id, teacher_id, weekday, start_time, end_time
FROM working_hours
WHERE teacher_id = ?1 AND weekday = ?2
ORDER BY start_time
"#;

pub const DELETE_WORKING_HOURS: &str = r#"
DELETE FROM working_hours
WHERE id = ?1
"#;

// Entry queries
pub const UPSERT_ENTRY: &str = r#"
INSERT INTO entries (id, teacher_id, lesson, starts_at, ends_at, active, allow_overlap, allow_besides_working_hours)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT(id) DO UPDATE SET
    teacher_id = excluded.teacher_id,
    lesson = excluded.lesson,
    starts_at = excluded.starts_at,
    ends_at = excluded.ends_at,
    active = excluded.active,
    allow_overlap = excluded.allow_overlap,
    allow_besides_working_hours = excluded.allow_besides_working_hours
"#;

/// `?2 = 1` restricts the lookup to active entries.
pub const SELECT_ENTRY_BY_ID: &str = r#"
SELECT id, teacher_id, lesson, starts_at, ends_at, active, allow_overlap, allow_besides_working_hours
FROM entries
WHERE id = ?1 AND (?2 = 0 OR active = 1)
"#;

/// Half-open overlap with `?2..?3`; `?4 = 1` restricts to active entries.
pub const SELECT_ENTRIES_BY_TEACHER_AND_RANGE: &str = r#"
SELECT id, teacher_id, lesson, starts_at, ends_at, active, allow_overlap, allow_besides_working_hours
FROM entries
WHERE teacher_id = ?1 AND starts_at < ?3 AND ?2 < ends_at AND (?4 = 0 OR active = 1)
ORDER BY starts_at
"#;

pub const SELECT_ENTRY_CUSTOMERS: &str = r#"
SELECT customer_id
FROM entry_customers
WHERE entry_id = ?1
"#;

pub const DELETE_ENTRY_CUSTOMERS: &str = r#"
DELETE FROM entry_customers
WHERE entry_id = ?1
"#;

pub const INSERT_ENTRY_CUSTOMER: &str = r#"
INSERT INTO entry_customers (entry_id, customer_id)
VALUES (?1, ?2)
"#;

// Customer queries
pub const INSERT_CUSTOMER: &str = r#"
INSERT INTO customers (id, name, email, timezone)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_CUSTOMER_BY_ID: &str = r#"
SELECT id, name, email, timezone
FROM customers
WHERE id = ?1
"#;

// Subscription queries
pub const INSERT_SUBSCRIPTION: &str = r#"
INSERT INTO subscriptions (id, customer_id, is_fully_used)
VALUES (?1, ?2, ?3)
"#;

pub const UPDATE_SUBSCRIPTION: &str = r#"
UPDATE subscriptions
SET customer_id = ?2, is_fully_used = ?3
WHERE id = ?1
"#;

pub const INSERT_CLASS: &str = r#"
INSERT INTO classes (id, customer_id, subscription_id, timeline_entry_id)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_CUSTOMERS_WITH_OPEN_SUBSCRIPTION: &str = r#"
SELECT DISTINCT c.id, c.name, c.email, c.timezone
FROM customers c
INNER JOIN subscriptions s ON s.customer_id = c.id
WHERE s.is_fully_used = 0
ORDER BY c.name
"#;

pub const SELECT_CUSTOMERS_WITH_CLASS_ENDED_WITHIN: &str = r#"
SELECT DISTINCT cl.customer_id
FROM classes cl
INNER JOIN entries e ON e.id = cl.timeline_entry_id
WHERE cl.subscription_id IS NOT NULL AND e.ends_at >= ?1 AND e.ends_at <= ?2
"#;
