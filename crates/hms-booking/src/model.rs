//! Persisted booking entities and their lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};

use hms_core::schedule::{Shift, Specialist, UnknownOption};

/// Appointment status. Rows are never deleted; `cancelled` is the soft removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Statuses that occupy a slot.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Statuses from which a move to `self` is allowed.
    ///
    /// Nothing moves back to `pending`, and `cancelled`/`completed` are terminal.
    pub const fn allowed_sources(self) -> &'static [Self] {
        match self {
            Self::Pending => &[],
            Self::Confirmed => &[Self::Pending],
            Self::Cancelled | Self::Completed => &[Self::Pending, Self::Confirmed],
        }
    }

    pub fn can_transition_to(self, to: Self) -> bool {
        to.allowed_sources().contains(&self)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: i64,
    pub specialist: Specialist,
    pub date: NaiveDate,
    pub shift: Shift,
    #[serde(serialize_with = "serialize_slot")]
    pub slot: NaiveTime,
    pub message: String,
    pub status: AppointmentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A doctor from the staff directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialist: Specialist,
    pub is_active: bool,
}

/// Canonical storage form of a slot time (`HH:MM`, 24h).
pub fn slot_to_string(slot: NaiveTime) -> String {
    slot.format("%H:%M").to_string()
}

/// Human-readable slot label, e.g. `10:00 AM`.
pub fn slot_label(slot: NaiveTime) -> String {
    slot.format("%-I:%M %p").to_string()
}

pub fn serialize_slot<S: Serializer>(slot: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&slot_to_string(*slot))
}
