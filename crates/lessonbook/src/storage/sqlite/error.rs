//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError` from
//! `lessonbook_core::storage`. Constraint violations and missing rows get their
//! own variants; everything else becomes `QueryFailed`.

use lessonbook_core::storage::RepositoryError;

/// Maps a rusqlite error to a RepositoryError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `AlreadyExists`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` / `SQLITE_CONSTRAINT_CHECK` → `InvalidData`
/// - `CannotOpen` → `ConnectionFailed`
/// - `QueryReturnedNoRows` → `NotFound`
/// - Column conversion failures → `Serialization`
/// - All other errors → `QueryFailed`
fn map_rusqlite_error(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: Option<&str>,
) -> RepositoryError {
    let id = || id.unwrap_or("unknown").to_string();

    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepositoryError::InvalidData(format!(
                "Foreign key constraint violation for {entity_type}"
            ))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
        {
            RepositoryError::InvalidData(format!("Check constraint violation for {entity_type}"))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
            entity_type,
            id: id(),
        },

        rusqlite::Error::FromSqlConversionFailure(..) => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
///
/// This is the main entry point for error mapping in async code.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    map_error(err, entity_type, None)
}

/// Maps a tokio_rusqlite error with a known ID to a RepositoryError.
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    map_error(err, entity_type, Some(id.into()))
}

fn map_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: Option<String>,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id.as_deref())
        }
        tokio_rusqlite::Error::Close(_) | tokio_rusqlite::Error::ConnectionClosed => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
