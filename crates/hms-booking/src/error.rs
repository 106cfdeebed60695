//! Booking error taxonomy.

use thiserror::Error;

use hms_core::db::DatabaseError;

use crate::model::AppointmentStatus;
use crate::validate::ValidationErrors;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Errors returned by the booking workflow.
#[derive(Debug, Error)]
pub enum BookingError {
    /// One or more fields failed intake validation. User-correctable.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The slot is held by another active appointment. User-correctable.
    #[error("Slot no longer available, please choose another")]
    SlotConflict { conflicting_id: Option<String> },

    /// Storage was unreachable, timed out or failed. Transient.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

impl BookingError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::SlotConflict { .. } => "slot_conflict",
            Self::StorageFailure(_) => "storage_unavailable",
            Self::NotFound(_) => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
        }
    }

    /// Whether the caller may retry the same request later.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

impl From<DatabaseError> for BookingError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::UniqueViolation(_) => Self::SlotConflict {
                conflicting_id: None,
            },
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for BookingError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}
