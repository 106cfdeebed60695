//! Booking entry point: directory lookup, validation, availability, record.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, instrument};

use hms_core::config::{BookingRules, StorageConfig};

use crate::availability::{Availability, check_availability};
use crate::directory::DoctorDirectory;
use crate::error::{BookingError, Result};
use crate::guard::StorageGuard;
use crate::model::{Appointment, AppointmentStatus, Doctor, slot_label};
use crate::notify::NotificationDispatcher;
use crate::recorder::Recorder;
use crate::request::AppointmentForm;
use crate::storage::{BookingDatabase, TransitionOutcome};
use crate::store::AppointmentStore;
use crate::validate::{ValidationContext, parse_doctor_id, validate};

/// Upper bound on appointments returned for one patient.
pub const PATIENT_HISTORY_LIMIT: u32 = 100;

/// Caller identity and clock for a booking call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingContext {
    pub patient_id: String,
    pub today: NaiveDate,
}

impl BookingContext {
    pub fn new(patient_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            today,
        }
    }

    /// Context dated with the server's local calendar day.
    pub fn today_local(patient_id: impl Into<String>) -> Self {
        Self::new(patient_id, Local::now().date_naive())
    }
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    pub appointment_id: String,
    pub status: AppointmentStatus,
    pub summary: String,
}

impl BookingConfirmation {
    fn new(appointment: &Appointment, doctor: &Doctor) -> Self {
        let summary = format!(
            "{} ({}) on {}, {} shift at {}",
            doctor.name,
            appointment.specialist.label(),
            appointment.date.format("%Y-%m-%d"),
            appointment.shift.label(),
            slot_label(appointment.slot),
        );
        Self {
            appointment_id: appointment.id.clone(),
            status: appointment.status,
            summary,
        }
    }
}

/// Patient-facing booking operations.
#[derive(Clone)]
pub struct BookingService {
    directory: Arc<dyn DoctorDirectory>,
    store: Arc<dyn AppointmentStore>,
    recorder: Recorder,
    rules: BookingRules,
    guard: StorageGuard,
}

impl BookingService {
    pub fn new(
        directory: Arc<dyn DoctorDirectory>,
        store: Arc<dyn AppointmentStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        rules: BookingRules,
        storage: &StorageConfig,
    ) -> Self {
        let guard = StorageGuard::from_config(storage);
        let recorder = Recorder::new(Arc::clone(&store), guard.clone(), rules.clone(), dispatcher);
        Self {
            directory,
            store,
            recorder,
            rules,
            guard,
        }
    }

    /// Service backed by one booking database for both doctors and appointments.
    pub fn from_database(
        db: BookingDatabase,
        dispatcher: Arc<dyn NotificationDispatcher>,
        rules: BookingRules,
        storage: &StorageConfig,
    ) -> Self {
        let db = Arc::new(db);
        let directory: Arc<dyn DoctorDirectory> = db.clone();
        Self::new(directory, db, dispatcher, rules, storage)
    }

    pub const fn rules(&self) -> &BookingRules {
        &self.rules
    }

    /// Book an appointment for the context's patient.
    #[instrument(skip(self, ctx, form), fields(patient_id = %ctx.patient_id))]
    pub async fn book(&self, ctx: &BookingContext, form: AppointmentForm) -> Result<BookingConfirmation> {
        let doctor = match parse_doctor_id(form.doctor.as_deref()) {
            Some(id) => {
                let directory = &*self.directory;
                self.guard
                    .call("find_active_doctor", || directory.find_active(id))
                    .await?
            }
            None => None,
        };

        let request = validate(
            &form,
            &ValidationContext {
                rules: &self.rules,
                today: ctx.today,
                doctor: doctor.as_ref(),
            },
        )?;

        let key = request.slot_key();
        if let Availability::Unavailable { conflicting_id } =
            check_availability(&*self.store, &self.guard, &key).await?
        {
            debug!(%conflicting_id, "Rejected before insert");
            return Err(BookingError::SlotConflict {
                conflicting_id: Some(conflicting_id),
            });
        }

        let appointment = self.recorder.record(&request, &ctx.patient_id).await?;
        // Validation only succeeds with a resolved doctor.
        let doctor = doctor.ok_or_else(|| BookingError::NotFound(format!("doctor {}", request.doctor_id)))?;

        Ok(BookingConfirmation::new(&appointment, &doctor))
    }

    /// Active doctors, ordered by name.
    pub async fn doctors(&self) -> Result<Vec<Doctor>> {
        let directory = &*self.directory;
        self.guard.call("list_active_doctors", || directory.list_active()).await
    }

    /// A patient's appointments, newest first.
    pub async fn appointments_for_patient(&self, patient_id: &str) -> Result<Vec<Appointment>> {
        let store = &*self.store;
        self.guard
            .call("list_appointments_for_patient", || {
                store.list_for_patient(patient_id, PATIENT_HISTORY_LIMIT)
            })
            .await
    }

    /// Cancel one of the patient's own pending or confirmed appointments.
    #[instrument(skip(self))]
    pub async fn cancel(&self, patient_id: &str, appointment_id: &str) -> Result<Appointment> {
        let store = &*self.store;
        let outcome = self
            .guard
            .call("cancel_appointment", || {
                store.transition(appointment_id, AppointmentStatus::Cancelled, Some(patient_id))
            })
            .await?;

        match outcome {
            TransitionOutcome::Applied(appointment) => {
                info!(appointment_id, "Appointment cancelled");
                Ok(appointment)
            }
            TransitionOutcome::NotFound => Err(BookingError::NotFound(format!("appointment {appointment_id}"))),
            TransitionOutcome::Rejected { from } => Err(BookingError::InvalidTransition {
                from,
                to: AppointmentStatus::Cancelled,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
