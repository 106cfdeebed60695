//! Admin subcommands: doctor directory upkeep, staff status changes, dev tokens.
//!
//! User-facing output uses writeln! to the given writer (this is a CLI, not debug output).

use std::io::Write;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use tracing::info;

use hms_booking::{AppointmentStatus, BookingDatabase, TransitionOutcome};
use hms_core::schedule::Specialist;

use crate::auth::JwtManager;

/// Admin subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AdminAction {
    /// Add a doctor to the directory.
    AddDoctor {
        /// Display name, e.g. "Dr. Jane Doe".
        #[arg(long)]
        name: String,
        /// cardiology, neurology or pediatrics.
        #[arg(long)]
        specialist: Specialist,
    },
    /// List active doctors.
    ListDoctors,
    /// Stop offering a doctor for new bookings.
    DeactivateDoctor {
        id: i64,
    },
    /// List a doctor's appointments on a date.
    ListAppointments {
        #[arg(long)]
        doctor: i64,
        /// Date as YYYY-MM-DD.
        #[arg(long)]
        date: NaiveDate,
        /// Only show appointments in this status.
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },
    /// Move an appointment to a new status (confirmed, cancelled, completed).
    SetStatus {
        id: String,
        status: AppointmentStatus,
    },
    /// Issue a development session token for a patient.
    IssueToken {
        patient_id: String,
    },
}

/// Execute an admin subcommand.
pub async fn run(
    action: AdminAction,
    db: &BookingDatabase,
    jwt: &JwtManager,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match action {
        AdminAction::AddDoctor { name, specialist } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("Doctor name must not be empty");
            }
            let doctor = db.create_doctor(name, specialist).await?;
            info!(doctor_id = doctor.id, "Doctor added");
            writeln!(out, "Added doctor {} ({}) with id {}", doctor.name, doctor.specialist, doctor.id)?;
        }
        AdminAction::ListDoctors => {
            let doctors = db.list_active_doctors().await?;
            if doctors.is_empty() {
                writeln!(out, "No active doctors")?;
            }
            for doctor in doctors {
                writeln!(out, "{:>4}  {:<28} {}", doctor.id, doctor.name, doctor.specialist)?;
            }
        }
        AdminAction::DeactivateDoctor { id } => {
            if !db.set_doctor_active(id, false).await? {
                bail!("No doctor with id {id}");
            }
            info!(doctor_id = id, "Doctor deactivated");
            writeln!(out, "Deactivated doctor {id}")?;
        }
        AdminAction::ListAppointments {
            doctor,
            date,
            status,
        } => {
            let appointments = db.list_appointments_for_doctor(doctor, date, status).await?;
            if appointments.is_empty() {
                writeln!(out, "No appointments for doctor {doctor} on {date}")?;
            }
            for a in appointments {
                writeln!(
                    out,
                    "{}  {:<9} {:<10} {}  {}",
                    a.slot.format("%H:%M"),
                    a.shift,
                    a.status,
                    a.id,
                    a.patient_id
                )?;
            }
        }
        AdminAction::SetStatus { id, status } => match db.transition_status(&id, status, None).await? {
            TransitionOutcome::Applied(appointment) => {
                info!(appointment_id = %id, status = %appointment.status, "Appointment status changed");
                writeln!(out, "Appointment {id} is now {}", appointment.status)?;
            }
            TransitionOutcome::NotFound => bail!("No appointment with id {id}"),
            TransitionOutcome::Rejected { from } => {
                bail!("Cannot move appointment {id} from {from} to {status}")
            }
        },
        AdminAction::IssueToken { patient_id } => {
            let (token, exp) = jwt.issue(&patient_id).context("Failed to issue token")?;
            writeln!(out, "{token}")?;
            info!(patient_id = %patient_id, exp, "Session token issued");
        }
    }
    Ok(())
}
