//! Row models for HMS booking storage.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use hms_core::db::DatabaseError;

use crate::model::{Appointment, Doctor};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: i64,
    pub specialist: String,
    pub appointment_date: String,
    pub shift: String,
    pub time_slot: String,
    pub message: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DoctorRow {
    pub id: i64,
    pub name: String,
    pub specialist: String,
    pub is_active: i64,
    pub created_at: i64,
}

fn corrupt(table: &str, id: &str, detail: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Query(format!("corrupt {table} row {id}: {detail}"))
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DatabaseError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let specialist = row
            .specialist
            .parse()
            .map_err(|e| corrupt("appointments", &row.id, e))?;
        let date = NaiveDate::parse_from_str(&row.appointment_date, "%Y-%m-%d")
            .map_err(|e| corrupt("appointments", &row.id, e))?;
        let shift = row
            .shift
            .parse()
            .map_err(|e| corrupt("appointments", &row.id, e))?;
        let slot = NaiveTime::parse_from_str(&row.time_slot, "%H:%M")
            .map_err(|e| corrupt("appointments", &row.id, e))?;
        let status = row
            .status
            .parse()
            .map_err(|e| corrupt("appointments", &row.id, e))?;

        Ok(Self {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            specialist,
            date,
            shift,
            slot,
            message: row.message,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = DatabaseError;

    fn try_from(row: DoctorRow) -> Result<Self, Self::Error> {
        let specialist = row
            .specialist
            .parse()
            .map_err(|e| corrupt("doctors", &row.id.to_string(), e))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            specialist,
            is_active: row.is_active != 0,
        })
    }
}
