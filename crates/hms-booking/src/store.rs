//! Appointment storage seam consumed by the booking workflow.

use async_trait::async_trait;

use hms_core::db::DatabaseError;

use crate::model::{Appointment, AppointmentStatus};
use crate::request::{AppointmentRequest, SlotKey};
use crate::storage::{BookingDatabase, TransitionOutcome};

/// Durable appointment storage with a uniqueness-constrained insert.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert a pending appointment. Must fail with
    /// [`DatabaseError::UniqueViolation`] when the slot is already held.
    async fn insert_pending(
        &self,
        id: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> Result<(), DatabaseError>;

    async fn get(&self, id: &str) -> Result<Option<Appointment>, DatabaseError>;

    /// ID of the active appointment holding the slot, if any.
    async fn active_holder(&self, key: &SlotKey) -> Result<Option<String>, DatabaseError>;

    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    async fn transition(
        &self,
        id: &str,
        to: AppointmentStatus,
        owner: Option<&str>,
    ) -> Result<TransitionOutcome, DatabaseError>;
}

#[async_trait]
impl AppointmentStore for BookingDatabase {
    async fn insert_pending(
        &self,
        id: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> Result<(), DatabaseError> {
        self.insert_appointment(id, patient_id, request).await
    }

    async fn get(&self, id: &str) -> Result<Option<Appointment>, DatabaseError> {
        self.get_appointment(id).await
    }

    async fn active_holder(&self, key: &SlotKey) -> Result<Option<String>, DatabaseError> {
        self.find_active_at(key).await
    }

    async fn list_for_patient(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        self.list_appointments_for_patient(patient_id, limit).await
    }

    async fn transition(
        &self,
        id: &str,
        to: AppointmentStatus,
        owner: Option<&str>,
    ) -> Result<TransitionOutcome, DatabaseError> {
        self.transition_status(id, to, owner).await
    }
}
