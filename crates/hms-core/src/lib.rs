//! HMS Core Library
//!
//! Shared functionality for HMS components:
//! - Schedule vocabulary (shifts, specialties, shift windows)
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and the shared database error type
//! - Retry policy for transient storage failures
//! - Tracing initialisation

pub mod config;
pub mod db;
pub mod error;
pub mod retry;
pub mod schedule;
pub mod tracing_init;

pub use config::{BookingRules, Config};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use schedule::{Shift, ShiftHours, ShiftWindow, Specialist};
