//! HMS web server.
//!
//! Serves the hospital pages, the booking form, and the JSON booking API on
//! top of `hms-booking`.

pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod html;
pub mod routes;
