//! JSON body extractor for booking requests.
//!
//! Decode failures become structured [`ApiError`] payloads: a field with the
//! wrong JSON type is reported as `invalid` on that field, anything that is not
//! a JSON object is a malformed body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};
use tracing::debug;

use hms_booking::{AppointmentForm, BookingError, Field, Reason, ValidationErrors};

use crate::error::ApiError;

/// A booking form decoded from a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingJson(pub AppointmentForm);

impl<S: Send + Sync> FromRequest<S> for BookingJson {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection.body_text(), "Rejected JSON body");
                match rejection {
                    JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
                    _ => ApiError::MalformedBody,
                }
            })?;
        decode_form(value).map(Self)
    }
}

/// Decode a booking form, naming each field whose value has the wrong type.
pub fn decode_form(value: Value) -> Result<AppointmentForm, ApiError> {
    let Value::Object(fields) = value else {
        return Err(ApiError::MalformedBody);
    };

    let mut errors = ValidationErrors::new();
    for field in Field::ALL {
        if let Some(raw) = fields.get(field.as_str()) {
            let single = Map::from_iter([(field.as_str().to_string(), raw.clone())]);
            if serde_json::from_value::<AppointmentForm>(Value::Object(single)).is_err() {
                errors.add(field, Reason::Invalid);
            }
        }
    }
    if !errors.is_empty() {
        return Err(BookingError::Validation(errors).into());
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        debug!(error = %e, "Booking form did not decode");
        ApiError::MalformedBody
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn invalid_fields(err: ApiError) -> Vec<Field> {
        match err {
            ApiError::Booking(BookingError::Validation(errors)) => {
                errors.iter().map(|(field, _)| field).collect()
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn well_typed_body_decodes() {
        let form = decode_form(json!({
            "doctor": 3,
            "specialist": "neurology",
            "message": "headache",
        }))
        .unwrap();

        assert_eq!(form.doctor.as_deref(), Some("3"));
        assert_eq!(form.specialist.as_deref(), Some("neurology"));
        assert_eq!(form.date, None);
    }

    #[test]
    fn wrong_types_are_reported_per_field() {
        let err = decode_form(json!({
            "doctor": 1.5,
            "specialist": "neurology",
            "message": 5,
            "slot": ["14:00"],
        }))
        .unwrap_err();

        let mut fields = invalid_fields(err);
        fields.sort_by_key(|f| f.as_str());
        assert_eq!(fields, vec![Field::Doctor, Field::Message, Field::Slot]);
    }

    #[test]
    fn null_fields_count_as_missing() {
        let form = decode_form(json!({ "message": null })).unwrap();
        assert_eq!(form.message, None);
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(matches!(
            decode_form(json!(["doctor", 1])),
            Err(ApiError::MalformedBody)
        ));
        assert!(matches!(decode_form(json!("x")), Err(ApiError::MalformedBody)));
    }
}
