//! Patient identity for HMS requests.
//!
//! Provides JWT token management and the request extractor.

pub mod claims;
pub mod extract;
pub mod jwt;

pub use claims::Claims;
pub use extract::{Patient, SESSION_COOKIE};
pub use jwt::JwtManager;
