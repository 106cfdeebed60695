//! Browser-facing pages and the form-encoded booking flow.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::warn;

use hms_booking::validate::{Field, Reason};
use hms_booking::{AppointmentForm, BookingContext, BookingError, Doctor, ValidationErrors};

use super::AppState;
use crate::auth::Patient;
use crate::error::booking_status;
use crate::html::{self, FormView, Notice};

/// Shown when storage cannot be reached during a submission.
const SUBMIT_UNAVAILABLE: &str =
    "We could not save your appointment right now. Please try again shortly.";

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    pub booked: Option<String>,
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(html::home_page(&state.hospital_name))
}

/// `GET /page/{slug}`
pub async fn content(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    html::content_page(&state.hospital_name, &slug).map_or_else(
        || not_found_response(&state),
        |page| Html(page).into_response(),
    )
}

/// Fallback for unknown paths.
pub async fn not_found(State(state): State<AppState>) -> Response {
    not_found_response(&state)
}

fn not_found_response(state: &AppState) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(html::not_found_page(&state.hospital_name)),
    )
        .into_response()
}

async fn doctors_or_empty(state: &AppState) -> Vec<Doctor> {
    state.booking.doctors().await.unwrap_or_else(|e| {
        warn!(error = %e, "Doctor list unavailable");
        Vec::new()
    })
}

/// `GET /appointment`
pub async fn appointment_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Html<String> {
    let doctors = doctors_or_empty(&state).await;
    let view = FormView {
        doctors: &doctors,
        notice: query
            .booked
            .map(|appointment_id| Notice::Booked { appointment_id }),
        ..FormView::default()
    };
    Html(html::appointment_page(&state.hospital_name, &view))
}

/// `POST /appointment`
///
/// Success redirects back to the form with the booking reference. Rejections
/// re-render the form with the submitted values.
pub async fn submit_appointment(
    State(state): State<AppState>,
    patient: Option<Patient>,
    Form(form): Form<AppointmentForm>,
) -> Response {
    let Some(patient) = patient else {
        return (
            StatusCode::UNAUTHORIZED,
            Html(html::sign_in_required_page(&state.hospital_name)),
        )
            .into_response();
    };

    let ctx = BookingContext::today_local(patient.id);
    let err = match state.booking.book(&ctx, form.clone()).await {
        Ok(confirmation) => {
            return Redirect::to(&format!("/appointment?booked={}", confirmation.appointment_id))
                .into_response();
        }
        Err(e) => e,
    };

    let status = booking_status(&err);
    let (errors, notice) = match err {
        BookingError::Validation(errors) => (errors, None),
        BookingError::SlotConflict { .. } => {
            (ValidationErrors::single(Field::Slot, Reason::Unavailable), None)
        }
        BookingError::StorageFailure(detail) => {
            warn!(detail = %detail, "Booking submission hit unavailable storage");
            (
                ValidationErrors::new(),
                Some(Notice::Failure(SUBMIT_UNAVAILABLE.to_string())),
            )
        }
        other => (
            ValidationErrors::new(),
            Some(Notice::Failure(other.to_string())),
        ),
    };

    let doctors = doctors_or_empty(&state).await;
    let view = FormView {
        doctors: &doctors,
        form: Some(&form),
        errors: Some(&errors),
        notice,
    };
    (status, Html(html::appointment_page(&state.hospital_name, &view))).into_response()
}
