//! Post-booking notification dispatch.
//!
//! Dispatch never blocks the booking path and its failures never fail a
//! booking; the recorder only logs them.

#[cfg(feature = "webhook")]
mod webhook;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use hms_core::schedule::{Shift, Specialist};

use crate::model::{Appointment, serialize_slot};

#[cfg(feature = "webhook")]
pub use webhook::WebhookDispatcher;

/// Emitted once an appointment has been durably recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmed {
    pub appointment_id: String,
    pub patient_id: String,
    pub doctor_id: i64,
    pub specialist: Specialist,
    pub date: chrono::NaiveDate,
    pub shift: Shift,
    #[serde(serialize_with = "serialize_slot")]
    pub slot: chrono::NaiveTime,
}

impl From<&Appointment> for BookingConfirmed {
    fn from(a: &Appointment) -> Self {
        Self {
            appointment_id: a.id.clone(),
            patient_id: a.patient_id.clone(),
            doctor_id: a.doctor_id,
            specialist: a.specialist,
            date: a.date,
            shift: a.shift,
            slot: a.slot,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Notification channel full")]
    Full,

    #[error("Webhook error: {0}")]
    Webhook(String),
}

/// Receives booking events. Implementations must return promptly.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, event: &BookingConfirmed) -> Result<(), NotifyError>;
}

/// Writes each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn dispatch(&self, event: &BookingConfirmed) -> Result<(), NotifyError> {
        info!(
            appointment_id = %event.appointment_id,
            doctor_id = event.doctor_id,
            date = %event.date,
            shift = %event.shift,
            "Booking confirmed"
        );
        Ok(())
    }
}

/// Hands events to a background consumer over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::Sender<BookingConfirmed>,
}

impl ChannelDispatcher {
    pub const fn new(tx: mpsc::Sender<BookingConfirmed>) -> Self {
        Self { tx }
    }

    /// Create a dispatcher together with the receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BookingConfirmed>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl NotificationDispatcher for ChannelDispatcher {
    fn dispatch(&self, event: &BookingConfirmed) -> Result<(), NotifyError> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotifyError::Full,
            mpsc::error::TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}
