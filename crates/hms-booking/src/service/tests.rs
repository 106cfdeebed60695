//! Booking service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use hms_core::db::DatabaseError;
use hms_core::retry::RetryPolicy;

use super::*;
use crate::notify::LogDispatcher;
use crate::request::{AppointmentRequest, SlotKey};
use crate::validate::{Field, Reason};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()
}

fn ctx(patient: &str) -> BookingContext {
    BookingContext::new(patient, today())
}

fn fast_storage() -> StorageConfig {
    StorageConfig {
        op_timeout_ms: 5_000,
        retry: RetryPolicy {
            initial_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
            max_attempts: 3,
        },
    }
}

async fn service() -> (BookingService, BookingDatabase) {
    let db = BookingDatabase::open_in_memory().await.unwrap();
    let service = BookingService::from_database(
        db.clone(),
        Arc::new(LogDispatcher),
        BookingRules::default(),
        &fast_storage(),
    );
    (service, db)
}

fn scenario_a_form() -> AppointmentForm {
    AppointmentForm {
        doctor: Some("1".to_string()),
        specialist: Some("cardiology".to_string()),
        date: Some(today().checked_add_days(Days::new(1)).unwrap().to_string()),
        shift: Some("morning".to_string()),
        slot: Some("10:00 AM".to_string()),
        message: Some("chest pain".to_string()),
    }
}

fn validation_reason(err: BookingError, field: Field) -> Option<Reason> {
    match err {
        BookingError::Validation(errors) => errors.get(field),
        _ => None,
    }
}

// === Scenarios ===

#[tokio::test]
async fn scenario_a_valid_booking_is_pending() {
    let (service, db) = service().await;

    let confirmation = service.book(&ctx("p1"), scenario_a_form()).await.unwrap();

    assert_eq!(confirmation.status, AppointmentStatus::Pending);
    assert_eq!(
        confirmation.summary,
        "Dr. John Smith (Cardiology) on 2030-01-11, Morning shift at 10:00 AM"
    );

    let stored = db.get_appointment(&confirmation.appointment_id).await.unwrap().unwrap();
    assert_eq!(stored.patient_id, "p1");
    assert_eq!(stored.doctor_id, 1);
    assert_eq!(stored.message, "chest pain");
    assert_eq!(stored.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn scenario_b_repeat_submission_conflicts() {
    let (service, db) = service().await;

    let first = service.book(&ctx("p1"), scenario_a_form()).await.unwrap();
    let err = service.book(&ctx("p2"), scenario_a_form()).await.unwrap_err();

    match err {
        BookingError::SlotConflict { conflicting_id } => {
            assert_eq!(conflicting_id, Some(first.appointment_id));
        }
        other => panic!("expected slot conflict, got {other:?}"),
    }
    assert!(db.list_appointments_for_patient("p2", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_c_past_date_is_rejected() {
    let (service, db) = service().await;
    let form = AppointmentForm {
        date: Some("2030-01-09".to_string()),
        ..scenario_a_form()
    };

    let err = service.book(&ctx("p1"), form).await.unwrap_err();
    assert_eq!(validation_reason(err, Field::Date), Some(Reason::InPast));
    assert!(db.list_appointments_for_patient("p1", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_d_slot_outside_shift_is_rejected() {
    let (service, _db) = service().await;
    let form = AppointmentForm {
        slot: Some("8:00 PM".to_string()),
        ..scenario_a_form()
    };

    let err = service.book(&ctx("p1"), form).await.unwrap_err();
    assert_eq!(validation_reason(err, Field::Slot), Some(Reason::OutOfShift));
}

#[tokio::test]
async fn scenario_e_empty_message_is_rejected() {
    let (service, _db) = service().await;
    let form = AppointmentForm {
        message: Some(String::new()),
        ..scenario_a_form()
    };

    let err = service.book(&ctx("p1"), form).await.unwrap_err();
    assert_eq!(validation_reason(err, Field::Message), Some(Reason::Required));
}

// === Directory-dependent validation ===

#[tokio::test]
async fn deactivated_doctor_is_not_found() {
    let (service, db) = service().await;
    db.set_doctor_active(1, false).await.unwrap();

    let err = service.book(&ctx("p1"), scenario_a_form()).await.unwrap_err();
    assert_eq!(validation_reason(err, Field::Doctor), Some(Reason::NotFound));
}

#[tokio::test]
async fn doctor_must_match_specialist() {
    let (service, _db) = service().await;
    let form = AppointmentForm {
        doctor: Some("2".to_string()),
        ..scenario_a_form()
    };

    let err = service.book(&ctx("p1"), form).await.unwrap_err();
    assert_eq!(
        validation_reason(err, Field::Doctor),
        Some(Reason::SpecialistMismatch)
    );
}

// === Lifecycle ===

#[tokio::test]
async fn cancelled_slot_can_be_booked_again() {
    let (service, _db) = service().await;

    let first = service.book(&ctx("p1"), scenario_a_form()).await.unwrap();
    let cancelled = service.cancel("p1", &first.appointment_id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let second = service.book(&ctx("p2"), scenario_a_form()).await.unwrap();
    assert_ne!(second.appointment_id, first.appointment_id);
}

#[tokio::test]
async fn cancel_is_scoped_to_owner_and_not_repeatable() {
    let (service, db) = service().await;
    let booked = service.book(&ctx("p1"), scenario_a_form()).await.unwrap();

    let err = service.cancel("p2", &booked.appointment_id).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
    let still = db.get_appointment(&booked.appointment_id).await.unwrap().unwrap();
    assert_eq!(still.status, AppointmentStatus::Pending);

    service.cancel("p1", &booked.appointment_id).await.unwrap();
    let err = service.cancel("p1", &booked.appointment_id).await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::InvalidTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Cancelled,
        }
    ));
}

#[tokio::test]
async fn patient_history_is_newest_first() {
    let (service, _db) = service().await;
    let first = service.book(&ctx("p1"), scenario_a_form()).await.unwrap();
    let later = AppointmentForm {
        slot: Some("11:00 AM".to_string()),
        ..scenario_a_form()
    };
    let second = service.book(&ctx("p1"), later).await.unwrap();

    let history = service.appointments_for_patient("p1").await.unwrap();
    let ids: Vec<_> = history.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec![second.appointment_id.as_str(), first.appointment_id.as_str()]);
    assert!(service.appointments_for_patient("p2").await.unwrap().is_empty());
}

#[tokio::test]
async fn doctors_lists_active_directory() {
    let (service, db) = service().await;
    db.set_doctor_active(2, false).await.unwrap();

    let doctors = service.doctors().await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].name, "Dr. John Smith");
}

// === Storage failures ===

/// A store whose backend is unreachable.
struct UnreachableStore;

#[async_trait]
impl AppointmentStore for UnreachableStore {
    async fn insert_pending(
        &self,
        _id: &str,
        _patient_id: &str,
        _request: &AppointmentRequest,
    ) -> std::result::Result<(), DatabaseError> {
        Err(DatabaseError::Connection("unable to open database file".into()))
    }

    async fn get(&self, _id: &str) -> std::result::Result<Option<Appointment>, DatabaseError> {
        Err(DatabaseError::Connection("unable to open database file".into()))
    }

    async fn active_holder(&self, _key: &SlotKey) -> std::result::Result<Option<String>, DatabaseError> {
        Err(DatabaseError::Connection("unable to open database file".into()))
    }

    async fn list_for_patient(
        &self,
        _patient_id: &str,
        _limit: u32,
    ) -> std::result::Result<Vec<Appointment>, DatabaseError> {
        Err(DatabaseError::Connection("unable to open database file".into()))
    }

    async fn transition(
        &self,
        _id: &str,
        _to: AppointmentStatus,
        _owner: Option<&str>,
    ) -> std::result::Result<TransitionOutcome, DatabaseError> {
        Err(DatabaseError::Connection("unable to open database file".into()))
    }
}

#[tokio::test]
async fn unreachable_storage_surfaces_as_storage_failure() {
    let db = BookingDatabase::open_in_memory().await.unwrap();
    let service = BookingService::new(
        Arc::new(db),
        Arc::new(UnreachableStore),
        Arc::new(LogDispatcher),
        BookingRules::default(),
        &fast_storage(),
    );

    let err = service.book(&ctx("p1"), scenario_a_form()).await.unwrap_err();
    assert!(matches!(err, BookingError::StorageFailure(_)));
    assert!(err.is_retryable());
}

// === Concurrency ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_of_one_slot_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let db = BookingDatabase::open(&dir.path().join("hms.db")).await.unwrap();
    let service = BookingService::from_database(
        db.clone(),
        Arc::new(LogDispatcher),
        BookingRules::default(),
        &fast_storage(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.book(&ctx(&format!("p{i}")), scenario_a_form()).await })
        })
        .collect();

    let mut booked = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(BookingError::SlotConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(booked, 1);
    assert_eq!(conflicts, 7);

    let date = today().checked_add_days(Days::new(1)).unwrap();
    let rows = db.list_appointments_for_doctor(1, date, None).await.unwrap();
    assert_eq!(rows.len(), 1);
}
