//! Authenticated patient extractor.
//!
//! The token is read from `Authorization: Bearer <jwt>` first, then from the
//! session cookie.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use tracing::debug;

use crate::error::ApiError;
use crate::routes::AppState;

/// Cookie carrying the session token for browser requests.
pub const SESSION_COOKIE: &str = "hms_session";

/// The patient making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
}

/// Raw session token from the request headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

fn authenticate(parts: &Parts, state: &AppState) -> Option<Patient> {
    let token = session_token(&parts.headers)?;
    match state.jwt.validate(token) {
        Ok(claims) => Some(Patient { id: claims.sub }),
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            None
        }
    }
}

impl FromRequestParts<AppState> for Patient {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).ok_or(ApiError::Unauthenticated)
    }
}

impl OptionalFromRequestParts<AppState> for Patient {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(authenticate(parts, state))
    }
}
