use lessonbook_core::schedule::ValidationFailure;
use lessonbook_core::storage::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by booking operations.
///
/// A `Validation` error means the candidate entry was rejected and nothing
/// was written.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Entry rejected: {0}")]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },
}

impl BookingError {
    pub(crate) fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }

    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonbook_core::schedule::ValidationRule;

    #[test]
    fn test_validation_error_exposes_rule() {
        let err = BookingError::from(ValidationFailure::OutsideWorkingHours);

        assert_eq!(
            err.validation().map(ValidationFailure::rule),
            Some(ValidationRule::OutsideWorkingHours)
        );
        assert_eq!(
            err.to_string(),
            "Entry rejected: Entry does not fit the teacher's working hours"
        );
    }

    #[test]
    fn test_repository_error_is_transparent() {
        let err = BookingError::from(RepositoryError::QueryFailed("disk full".to_string()));

        assert!(err.validation().is_none());
        assert_eq!(err.to_string(), "Query failed: disk full");
    }
}
