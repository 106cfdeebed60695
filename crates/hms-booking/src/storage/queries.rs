//! Appointment queries for HMS booking storage.

use chrono::NaiveDate;

use hms_core::db::{DatabaseError, unix_timestamp};

use super::db::BookingDatabase;
use super::models::AppointmentRow;
use crate::model::{Appointment, AppointmentStatus, slot_to_string};
use crate::request::{AppointmentRequest, SlotKey};

/// Result of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(Appointment),
    /// No appointment with that id (or not owned by the given patient).
    NotFound,
    /// The appointment exists but its current status forbids the move.
    Rejected { from: AppointmentStatus },
}

fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl BookingDatabase {
    /// Insert a new `pending` appointment.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when an active appointment
    /// already holds the same doctor/date/shift/slot.
    pub async fn insert_appointment(
        &self,
        id: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO appointments (id, patient_id, doctor_id, specialist, appointment_date, shift, time_slot, message, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(patient_id)
        .bind(request.doctor_id)
        .bind(request.specialist.as_str())
        .bind(date_to_string(request.date))
        .bind(request.shift.as_str())
        .bind(slot_to_string(request.slot))
        .bind(&request.message)
        .bind(AppointmentStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Get an appointment by ID.
    pub async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, DatabaseError> {
        sqlx::query_as::<_, AppointmentRow>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    /// ID of the active (pending or confirmed) appointment holding a slot, if any.
    pub async fn find_active_at(&self, key: &SlotKey) -> Result<Option<String>, DatabaseError> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM appointments WHERE doctor_id = ? AND appointment_date = ? AND shift = ? AND time_slot = ? AND status IN ('pending', 'confirmed') LIMIT 1",
        )
        .bind(key.doctor_id)
        .bind(date_to_string(key.date))
        .bind(key.shift.as_str())
        .bind(slot_to_string(key.slot))
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    /// List a patient's appointments, newest first.
    pub async fn list_appointments_for_patient(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments WHERE patient_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(patient_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(Appointment::try_from)
        .collect()
    }

    /// List a doctor's appointments on a date, optionally filtered by status.
    pub async fn list_appointments_for_doctor(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        status_filter: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let rows = if let Some(status) = status_filter {
            sqlx::query_as::<_, AppointmentRow>(
                "SELECT * FROM appointments WHERE doctor_id = ? AND appointment_date = ? AND status = ? ORDER BY time_slot",
            )
            .bind(doctor_id)
            .bind(date_to_string(date))
            .bind(status.as_str())
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, AppointmentRow>(
                "SELECT * FROM appointments WHERE doctor_id = ? AND appointment_date = ? ORDER BY time_slot",
            )
            .bind(doctor_id)
            .bind(date_to_string(date))
            .fetch_all(self.pool())
            .await?
        };

        rows.into_iter().map(Appointment::try_from).collect()
    }

    /// Move an appointment to `to` if its current status allows it.
    ///
    /// The check and the write are one conditional `UPDATE`. When `owner` is
    /// set, appointments of other patients read as not found.
    pub async fn transition_status(
        &self,
        id: &str,
        to: AppointmentStatus,
        owner: Option<&str>,
    ) -> Result<TransitionOutcome, DatabaseError> {
        let current = self.get_appointment(id).await?;
        let Some(current) = current.filter(|a| owner.is_none_or(|o| a.patient_id == o)) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if !current.status.can_transition_to(to) {
            return Ok(TransitionOutcome::Rejected {
                from: current.status,
            });
        }

        let sources = to.allowed_sources();
        let placeholders = vec!["?"; sources.len()].join(", ");
        let sql = format!(
            "UPDATE appointments SET status = ?, updated_at = ? WHERE id = ? AND status IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql)
            .bind(to.as_str())
            .bind(unix_timestamp())
            .bind(id);
        for source in sources {
            query = query.bind(source.as_str());
        }
        let result = query.execute(self.pool()).await?;

        match self.get_appointment(id).await? {
            Some(updated) if result.rows_affected() > 0 => Ok(TransitionOutcome::Applied(updated)),
            Some(unchanged) => Ok(TransitionOutcome::Rejected {
                from: unchanged.status,
            }),
            None => Ok(TransitionOutcome::NotFound),
        }
    }
}
