//! HMS booking core.
//!
//! Intake validation, slot availability, and appointment recording for the
//! hospital booking flow. The double-booking guard is a partial unique index
//! in the appointments schema; everything above it treats a constraint
//! violation as the authoritative conflict signal.

pub mod availability;
pub mod directory;
pub mod error;
pub mod guard;
pub mod model;
pub mod notify;
pub mod recorder;
pub mod request;
pub mod service;
pub mod storage;
pub mod store;
pub mod validate;

pub use availability::{Availability, check_availability};
pub use directory::DoctorDirectory;
pub use error::{BookingError, Result};
pub use guard::StorageGuard;
pub use model::{Appointment, AppointmentStatus, Doctor};
pub use notify::{BookingConfirmed, ChannelDispatcher, LogDispatcher, NotificationDispatcher, NotifyError};
pub use recorder::Recorder;
pub use request::{AppointmentForm, AppointmentRequest, SlotKey};
pub use service::{BookingConfirmation, BookingContext, BookingService};
pub use storage::{BookingDatabase, TransitionOutcome};
pub use store::AppointmentStore;
pub use validate::{Field, Reason, ValidationErrors};

#[cfg(feature = "webhook")]
pub use notify::WebhookDispatcher;
