//! Appointment recording.
//!
//! The insert runs against the partial unique index on active slots, which
//! makes a constraint violation the authoritative double-booking signal.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use hms_core::config::BookingRules;

use crate::error::{BookingError, Result};
use crate::guard::StorageGuard;
use crate::model::Appointment;
use crate::notify::{BookingConfirmed, NotificationDispatcher};
use crate::request::AppointmentRequest;
use crate::store::AppointmentStore;
use crate::validate::{Field, Reason, ValidationErrors};

/// Persists validated requests as `pending` appointments.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn AppointmentStore>,
    guard: StorageGuard,
    rules: BookingRules,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl Recorder {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        guard: StorageGuard,
        rules: BookingRules,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            guard,
            rules,
            dispatcher,
        }
    }

    /// Record a booking for `patient_id`.
    ///
    /// The appointment id is fixed before the first attempt. A retried insert
    /// that hits the unique index on a row carrying that id means an earlier
    /// attempt committed, so it resolves to success.
    #[instrument(skip(self, request), fields(doctor_id = request.doctor_id, date = %request.date, shift = %request.shift))]
    pub async fn record(&self, request: &AppointmentRequest, patient_id: &str) -> Result<Appointment> {
        self.recheck(request)?;

        let id = Uuid::new_v4().to_string();
        let store = &*self.store;

        match self
            .guard
            .call("insert_appointment", || store.insert_pending(&id, patient_id, request))
            .await
        {
            Ok(()) => {}
            Err(BookingError::SlotConflict { .. }) => {
                if self.guard.call("get_appointment", || store.get(&id)).await?.is_none() {
                    let key = request.slot_key();
                    let conflicting_id = self
                        .guard
                        .call("active_holder", || store.active_holder(&key))
                        .await
                        .unwrap_or_default();
                    info!(conflicting_id = ?conflicting_id, "Slot already held");
                    return Err(BookingError::SlotConflict { conflicting_id });
                }
                info!(appointment_id = %id, "Insert committed on an earlier attempt");
            }
            Err(e) => return Err(e),
        }

        let appointment = self
            .guard
            .call("get_appointment", || store.get(&id))
            .await?
            .ok_or_else(|| BookingError::StorageFailure(format!("appointment {id} missing after insert")))?;

        info!(appointment_id = %appointment.id, "Appointment recorded");

        if let Err(e) = self.dispatcher.dispatch(&BookingConfirmed::from(&appointment)) {
            warn!(appointment_id = %appointment.id, error = %e, "Booking notification not dispatched");
        }

        Ok(appointment)
    }

    fn recheck(&self, request: &AppointmentRequest) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if request.message.trim().is_empty() {
            errors.add(Field::Message, Reason::Required);
        } else if request.message.chars().count() > self.rules.message_max_chars {
            errors.add(Field::Message, Reason::TooLong);
        }
        if !self.rules.shift_hours.window(request.shift).contains(request.slot) {
            errors.add(Field::Slot, Reason::OutOfShift);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BookingError::Validation(errors))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};

    use hms_core::db::DatabaseError;
    use hms_core::retry::RetryPolicy;
    use hms_core::schedule::{Shift, Specialist};

    use super::*;
    use crate::model::AppointmentStatus;
    use crate::notify::ChannelDispatcher;
    use crate::request::SlotKey;
    use crate::storage::{BookingDatabase, TransitionOutcome};

    fn request(slot: (u32, u32)) -> AppointmentRequest {
        AppointmentRequest {
            doctor_id: 1,
            specialist: Specialist::Cardiology,
            date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            shift: Shift::Morning,
            slot: NaiveTime::from_hms_opt(slot.0, slot.1, 0).unwrap(),
            message: "checkup".to_string(),
        }
    }

    fn fast_guard() -> StorageGuard {
        StorageGuard::new(
            Duration::from_secs(2),
            RetryPolicy {
                initial_delay_ms: 1,
                max_delay_ms: 5,
                multiplier: 2.0,
                max_attempts: 3,
            },
        )
    }

    fn recorder(store: Arc<dyn AppointmentStore>) -> (Recorder, tokio::sync::mpsc::Receiver<BookingConfirmed>) {
        let (dispatcher, rx) = ChannelDispatcher::channel(16);
        let recorder = Recorder::new(store, fast_guard(), BookingRules::default(), Arc::new(dispatcher));
        (recorder, rx)
    }

    /// Commits the first insert but reports it as failed.
    struct LostAckStore {
        inner: BookingDatabase,
        dropped: AtomicBool,
    }

    #[async_trait]
    impl AppointmentStore for LostAckStore {
        async fn insert_pending(
            &self,
            id: &str,
            patient_id: &str,
            request: &AppointmentRequest,
        ) -> std::result::Result<(), DatabaseError> {
            self.inner.insert_pending(id, patient_id, request).await?;
            if self.dropped.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DatabaseError::Connection("connection reset".into()))
            }
        }

        async fn get(&self, id: &str) -> std::result::Result<Option<Appointment>, DatabaseError> {
            self.inner.get(id).await
        }

        async fn active_holder(&self, key: &SlotKey) -> std::result::Result<Option<String>, DatabaseError> {
            self.inner.active_holder(key).await
        }

        async fn list_for_patient(
            &self,
            patient_id: &str,
            limit: u32,
        ) -> std::result::Result<Vec<Appointment>, DatabaseError> {
            self.inner.list_for_patient(patient_id, limit).await
        }

        async fn transition(
            &self,
            id: &str,
            to: AppointmentStatus,
            owner: Option<&str>,
        ) -> std::result::Result<TransitionOutcome, DatabaseError> {
            self.inner.transition(id, to, owner).await
        }
    }

    #[tokio::test]
    async fn record_inserts_pending_and_notifies() {
        let db = BookingDatabase::open_in_memory().await.unwrap();
        let (recorder, mut rx) = recorder(Arc::new(db.clone()));

        let appointment = recorder.record(&request((10, 0)), "p1").await.unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.patient_id, "p1");
        assert_eq!(db.get_appointment(&appointment.id).await.unwrap().unwrap(), appointment);
        assert_eq!(rx.recv().await.unwrap().appointment_id, appointment.id);
    }

    #[tokio::test]
    async fn second_record_of_same_slot_conflicts_with_holder() {
        let db = BookingDatabase::open_in_memory().await.unwrap();
        let (recorder, _rx) = recorder(Arc::new(db));

        let first = recorder.record(&request((10, 0)), "p1").await.unwrap();
        let err = recorder.record(&request((10, 0)), "p2").await.unwrap_err();

        match err {
            BookingError::SlotConflict { conflicting_id } => {
                assert_eq!(conflicting_id.as_deref(), Some(first.id.as_str()));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lost_acknowledgment_resolves_to_success() {
        let store = LostAckStore {
            inner: BookingDatabase::open_in_memory().await.unwrap(),
            dropped: AtomicBool::new(false),
        };
        let (recorder, _rx) = recorder(Arc::new(store));

        let appointment = recorder.record(&request((9, 30)), "p1").await.unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.patient_id, "p1");
    }

    #[tokio::test]
    async fn recheck_rejects_slot_outside_shift() {
        let db = BookingDatabase::open_in_memory().await.unwrap();
        let (recorder, _rx) = recorder(Arc::new(db.clone()));

        let err = recorder.record(&request((15, 0)), "p1").await.unwrap_err();
        match err {
            BookingError::Validation(errors) => {
                assert_eq!(errors.get(Field::Slot), Some(Reason::OutOfShift));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(db.list_appointments_for_patient("p1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_notification_channel_does_not_fail_booking() {
        let db = BookingDatabase::open_in_memory().await.unwrap();
        let (recorder, rx) = recorder(Arc::new(db));
        drop(rx);

        assert!(recorder.record(&request((11, 0)), "p1").await.is_ok());
    }
}
