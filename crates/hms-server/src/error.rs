//! HTTP error mapping for the JSON API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use hms_booking::BookingError;

/// Message returned to callers when storage is unavailable.
pub const RETRY_LATER: &str = "Please try again shortly";

/// Message returned when a slot is already taken.
pub const SLOT_TAKEN: &str = "slot no longer available, please choose another";

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Malformed request body")]
    MalformedBody,

    #[error("Expected a JSON body")]
    UnsupportedMediaType,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Booking(e) => booking_status(e),
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MalformedBody => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

/// HTTP status for a booking error.
pub const fn booking_status(e: &BookingError) -> StatusCode {
    match e {
        BookingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::SlotConflict { .. } | BookingError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        BookingError::StorageFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Booking(BookingError::Validation(fields)) => {
                json!({ "error": "validation_failed", "fields": fields })
            }
            Self::Booking(BookingError::SlotConflict { .. }) => {
                json!({ "error": "slot_conflict", "message": SLOT_TAKEN })
            }
            Self::Booking(BookingError::StorageFailure(detail)) => {
                error!(detail = %detail, "Storage unavailable");
                json!({ "error": "storage_unavailable", "message": RETRY_LATER })
            }
            Self::Booking(e @ BookingError::InvalidTransition { .. }) => {
                json!({ "error": e.code(), "message": e.to_string() })
            }
            Self::Booking(BookingError::NotFound(_)) | Self::NotFound => {
                json!({ "error": "not_found" })
            }
            Self::Unauthenticated => json!({ "error": "unauthenticated" }),
            Self::MalformedBody => json!({ "error": "malformed_body" }),
            Self::UnsupportedMediaType => json!({ "error": "unsupported_media_type" }),
        };
        (status, Json(body)).into_response()
    }
}
