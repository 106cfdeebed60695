//! HTTP routing for the HMS server.

pub mod api;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use hms_booking::BookingService;

use crate::auth::JwtManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub jwt: Arc<JwtManager>,
    pub hospital_name: Arc<str>,
}

impl AppState {
    pub fn new(booking: BookingService, jwt: JwtManager, hospital_name: &str) -> Self {
        Self {
            booking,
            jwt: Arc::new(jwt),
            hospital_name: Arc::from(hospital_name),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/page/{slug}", get(pages::content))
        .route(
            "/appointment",
            get(pages::appointment_form).post(pages::submit_appointment),
        )
        .route(
            "/api/appointments",
            get(api::list_appointments).post(api::create_appointment),
        )
        .route("/api/appointments/{id}/cancel", post(api::cancel_appointment))
        .route("/api/doctors", get(api::list_doctors))
        .route("/health", get(api::health))
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
