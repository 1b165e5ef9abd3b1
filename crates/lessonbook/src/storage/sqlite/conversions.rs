//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc, Weekday};
use chrono_tz::Tz;
use lessonbook_core::market::Customer;
use lessonbook_core::schedule::{weekday_from_index, Lesson, Teacher, TimelineEntry, WorkingHours};
use lessonbook_core::storage::RepositoryError;
use rusqlite::Row;
use uuid::Uuid;

// ============================================================================
// Teacher conversions
// ============================================================================

/// Convert a SQLite row to a Teacher.
///
/// Expected columns: id, name, timezone
pub fn row_to_teacher(row: &Row) -> rusqlite::Result<Teacher> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let timezone: String = row.get(2)?;

    Ok(Teacher {
        id: parse_uuid(&id)?,
        name,
        timezone: parse_timezone(&timezone)?,
    })
}

// ============================================================================
// Working hours conversions
// ============================================================================

/// Convert a SQLite row to WorkingHours.
///
/// Expected columns: id, teacher_id, weekday, start_time, end_time
pub fn row_to_working_hours(row: &Row) -> rusqlite::Result<WorkingHours> {
    let id: String = row.get(0)?;
    let teacher_id: String = row.get(1)?;
    let weekday: u8 = row.get(2)?;
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;

    Ok(WorkingHours {
        id: parse_uuid(&id)?,
        teacher_id: parse_uuid(&teacher_id)?,
        weekday: parse_weekday(weekday)?,
        start: parse_time(&start)?,
        end: parse_time(&end)?,
    })
}

// ============================================================================
// Entry conversions
// ============================================================================

/// Convert a SQLite row to a TimelineEntry without its attendance set.
///
/// Expected columns: id, teacher_id, lesson, starts_at, ends_at, active,
/// allow_overlap, allow_besides_working_hours
pub fn row_to_entry(row: &Row) -> rusqlite::Result<TimelineEntry> {
    let id: String = row.get(0)?;
    let teacher_id: String = row.get(1)?;
    let lesson: Option<String> = row.get(2)?;
    let starts_at: String = row.get(3)?;
    let ends_at: String = row.get(4)?;
    let active: bool = row.get(5)?;
    let allow_overlap: bool = row.get(6)?;
    let allow_besides_working_hours: bool = row.get(7)?;

    let lesson = match lesson {
        Some(json) => Some(json_to_lesson(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(TimelineEntry {
        id: parse_uuid(&id)?,
        teacher_id: parse_uuid(&teacher_id)?,
        lesson,
        start: parse_datetime(&starts_at)?,
        end: parse_datetime(&ends_at)?,
        active,
        allow_overlap,
        allow_besides_working_hours,
        customers: BTreeSet::new(),
    })
}

/// Convert a single-column row to a Uuid.
pub fn row_to_uuid(row: &Row) -> rusqlite::Result<Uuid> {
    let id: String = row.get(0)?;
    parse_uuid(&id)
}

/// Serialize a Lesson to JSON for storage.
pub fn lesson_to_json(lesson: &Lesson) -> Result<String, RepositoryError> {
    serde_json::to_string(lesson).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Deserialize a Lesson from JSON.
pub fn json_to_lesson(json: &str) -> Result<Lesson, serde_json::Error> {
    serde_json::from_str(json)
}

// ============================================================================
// Customer conversions
// ============================================================================

/// Convert a SQLite row to a Customer.
///
/// Expected columns: id, name, email, timezone
pub fn row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let timezone: String = row.get(3)?;

    Ok(Customer {
        id: parse_uuid(&id)?,
        name,
        email,
        timezone: parse_timezone(&timezone)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse a time of day from `HH:MM:SS`.
fn parse_time(s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse an IANA timezone name.
fn parse_timezone(s: &str) -> rusqlite::Result<Tz> {
    Tz::from_str(s).map_err(|_| conversion_error(format!("Unknown timezone: {}", s)))
}

/// Parse a 0-based weekday index.
fn parse_weekday(index: u8) -> rusqlite::Result<Weekday> {
    weekday_from_index(index).ok_or_else(|| conversion_error(format!("Unknown weekday: {}", index)))
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Always microsecond precision with a `Z` suffix, so stored values sort
/// lexicographically in time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format a NaiveTime for SQLite storage (HH:MM:SS).
pub fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Format a Tz for SQLite storage (IANA name).
pub fn format_timezone(tz: &Tz) -> String {
    tz.name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_lesson_json_round_trip() {
        let lesson = Lesson::master_class("Idioms", Duration::minutes(90), Uuid::new_v4(), 12);

        let json = lesson_to_json(&lesson).unwrap();
        let parsed = json_to_lesson(&json).unwrap();

        assert!(json.contains("master_class"));
        assert_eq!(parsed, lesson);
    }

    #[test]
    fn test_json_to_lesson_invalid() {
        assert!(json_to_lesson(r#"{"type":"seminar"}"#).is_err());
    }

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let fractional = whole + Duration::milliseconds(250);

        assert_eq!(format_datetime(&whole), "2024-06-15T10:30:00.000000Z");
        assert_eq!(format_datetime(&fractional), "2024-06-15T10:30:00.250000Z");
        assert!(format_datetime(&whole) < format_datetime(&fractional));
    }

    #[test]
    fn test_parse_datetime_valid() {
        let parsed = parse_datetime("2024-06-15T10:30:00.000000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("not-a-datetime").is_err());
    }

    #[test]
    fn test_format_and_parse_time() {
        let time = NaiveTime::from_hms_opt(23, 59, 0).unwrap();

        assert_eq!(format_time(&time), "23:59:00");
        assert_eq!(parse_time("23:59:00").unwrap(), time);
        assert!(parse_time("24:00:00").is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Moscow").unwrap(), chrono_tz::Europe::Moscow);
        assert_eq!(format_timezone(&chrono_tz::Asia::Tokyo), "Asia/Tokyo");
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday(0).unwrap(), Weekday::Mon);
        assert!(parse_weekday(7).is_err());
    }

    #[test]
    fn test_parse_uuid_invalid() {
        assert!(parse_uuid("not-a-uuid").is_err());
    }
}
