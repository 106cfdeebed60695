//! Slot availability check.
//!
//! A fast-rejection path only: the check and the later insert are not atomic,
//! so the recorder's unique-constrained insert stays the source of truth.

use serde::Serialize;
use tracing::debug;

use crate::error::BookingError;
use crate::guard::StorageGuard;
use crate::request::SlotKey;
use crate::store::AppointmentStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable { conflicting_id: String },
}

impl Availability {
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Check whether a slot is free of active appointments.
pub async fn check_availability(
    store: &dyn AppointmentStore,
    guard: &StorageGuard,
    key: &SlotKey,
) -> Result<Availability, BookingError> {
    let holder = guard
        .call("active_holder", || store.active_holder(key))
        .await?;

    debug!(
        doctor_id = key.doctor_id,
        date = %key.date,
        shift = %key.shift,
        slot = %key.slot,
        held = holder.is_some(),
        "Slot availability checked"
    );

    Ok(holder.map_or(Availability::Available, |conflicting_id| {
        Availability::Unavailable { conflicting_id }
    }))
}
