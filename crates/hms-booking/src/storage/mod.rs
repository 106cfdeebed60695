//! SQLite storage for HMS bookings.
//!
//! Provides persistence for doctors and appointments. The double-booking
//! guard lives in the schema: a partial unique index over
//! (doctor, date, shift, slot) restricted to active statuses.

mod db;
mod models;
mod queries;
mod queries_doctors;


pub use db::BookingDatabase;
pub use models::{AppointmentRow, DoctorRow};
pub use queries::TransitionOutcome;
