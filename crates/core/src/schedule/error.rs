use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// The scheduling rule a rejected entry violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    HostMismatch,
    InvalidInterval,
    OverCapacity,
    Overlap,
    OutsideWorkingHours,
}

/// A timeline entry was rejected before anything was persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Event is hosted by teacher {host_id}, not by entry teacher {teacher_id}")]
    HostMismatch { teacher_id: Uuid, host_id: Uuid },
    #[error("Entry must start before it ends ({start} .. {end})")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Entry has {slots} slots, {requested} requested")]
    OverCapacity { slots: u32, requested: usize },
    #[error("Entry overlaps entry {conflicting_entry}")]
    Overlap { conflicting_entry: Uuid },
    #[error("Entry does not fit the teacher's working hours")]
    OutsideWorkingHours,
}

impl ValidationFailure {
    /// Returns which rule failed.
    pub fn rule(&self) -> ValidationRule {
        match self {
            ValidationFailure::HostMismatch { .. } => ValidationRule::HostMismatch,
            ValidationFailure::InvalidInterval { .. } => ValidationRule::InvalidInterval,
            ValidationFailure::OverCapacity { .. } => ValidationRule::OverCapacity,
            ValidationFailure::Overlap { .. } => ValidationRule::Overlap,
            ValidationFailure::OutsideWorkingHours => ValidationRule::OutsideWorkingHours,
        }
    }
}

/// Errors that can occur when declaring working hours.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkingHoursError {
    #[error("Weekday must be between 0 (Monday) and 6 (Sunday), got {0}")]
    InvalidWeekday(u8),
    #[error("Working hours must start before they end")]
    InvalidTimeRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_display() {
        assert_eq!(
            ValidationFailure::OverCapacity {
                slots: 10,
                requested: 11
            }
            .to_string(),
            "Entry has 10 slots, 11 requested"
        );
        assert_eq!(
            ValidationFailure::OutsideWorkingHours.to_string(),
            "Entry does not fit the teacher's working hours"
        );
    }

    #[test]
    fn test_validation_failure_rule() {
        let failure = ValidationFailure::Overlap {
            conflicting_entry: Uuid::nil(),
        };
        assert_eq!(failure.rule(), ValidationRule::Overlap);

        let failure = ValidationFailure::HostMismatch {
            teacher_id: Uuid::nil(),
            host_id: Uuid::nil(),
        };
        assert_eq!(failure.rule(), ValidationRule::HostMismatch);
    }

    #[test]
    fn test_working_hours_error_display() {
        assert_eq!(
            WorkingHoursError::InvalidWeekday(7).to_string(),
            "Weekday must be between 0 (Monday) and 6 (Sunday), got 7"
        );
    }
}
