//! Inbound booking payloads: the raw form and the normalized request.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use hms_core::schedule::{Shift, Specialist};

use crate::model::serialize_slot;

/// Raw booking fields as submitted. Every field may be absent.
///
/// Accepts both form-encoded and JSON bodies; `doctor` may arrive as a number
/// in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub doctor: Option<String>,
    #[serde(default)]
    pub specialist: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// A booking request that passed intake validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentRequest {
    pub doctor_id: i64,
    pub specialist: Specialist,
    pub date: NaiveDate,
    pub shift: Shift,
    #[serde(serialize_with = "serialize_slot")]
    pub slot: NaiveTime,
    pub message: String,
}

impl AppointmentRequest {
    pub const fn slot_key(&self) -> SlotKey {
        SlotKey {
            doctor_id: self.doctor_id,
            date: self.date,
            shift: self.shift,
            slot: self.slot,
        }
    }
}

/// Identity of a bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub slot: NaiveTime,
}
