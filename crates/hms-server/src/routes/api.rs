//! JSON booking API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use hms_booking::{Appointment, BookingConfirmation, BookingContext, Doctor};

use super::AppState;
use crate::auth::Patient;
use crate::error::ApiError;
use crate::extract::BookingJson;

#[derive(Debug, Serialize)]
pub struct AppointmentList {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
pub struct DoctorList {
    pub doctors: Vec<Doctor>,
}

/// `POST /api/appointments`
pub async fn create_appointment(
    State(state): State<AppState>,
    patient: Patient,
    BookingJson(form): BookingJson,
) -> Result<(StatusCode, Json<BookingConfirmation>), ApiError> {
    let ctx = BookingContext::today_local(patient.id);
    let confirmation = state.booking.book(&ctx, form).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// `GET /api/appointments`
pub async fn list_appointments(
    State(state): State<AppState>,
    patient: Patient,
) -> Result<Json<AppointmentList>, ApiError> {
    let appointments = state.booking.appointments_for_patient(&patient.id).await?;
    Ok(Json(AppointmentList { appointments }))
}

/// `POST /api/appointments/{id}/cancel`
pub async fn cancel_appointment(
    State(state): State<AppState>,
    patient: Patient,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state.booking.cancel(&patient.id, &id).await?;
    Ok(Json(appointment))
}

/// `GET /api/doctors`
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<DoctorList>, ApiError> {
    let doctors = state.booking.doctors().await?;
    Ok(Json(DoctorList { doctors }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
