//! Intake validation.
//!
//! Turns an [`AppointmentForm`] into an [`AppointmentRequest`] or reports every
//! invalid field at once, one machine-readable [`Reason`] per field. The check
//! is pure: "today" and the directory lookup for the submitted doctor are
//! supplied by the caller through [`ValidationContext`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate, NaiveTime};
use serde::Serialize;

use hms_core::config::BookingRules;
use hms_core::schedule::{Shift, Specialist};

use crate::model::Doctor;
use crate::request::{AppointmentForm, AppointmentRequest};

/// Fields of the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Doctor,
    Specialist,
    Date,
    Shift,
    Slot,
    Message,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Doctor,
        Self::Specialist,
        Self::Date,
        Self::Shift,
        Self::Slot,
        Self::Message,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Specialist => "specialist",
            Self::Date => "date",
            Self::Shift => "shift",
            Self::Slot => "slot",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable rejection reason for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Required,
    Invalid,
    NotFound,
    SpecialistMismatch,
    UnknownOption,
    InPast,
    TooFarAhead,
    OutOfShift,
    TooLong,
    Unavailable,
}

impl Reason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Invalid => "invalid",
            Self::NotFound => "not_found",
            Self::SpecialistMismatch => "specialist_mismatch",
            Self::UnknownOption => "unknown_option",
            Self::InPast => "in_past",
            Self::TooFarAhead => "too_far_ahead",
            Self::OutOfShift => "out_of_shift",
            Self::TooLong => "too_long",
            Self::Unavailable => "unavailable",
        }
    }

    /// Message shown next to the field.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Required => "This field is required.",
            Self::Invalid => "This value is not valid.",
            Self::NotFound => "The selected doctor is not available.",
            Self::SpecialistMismatch => "The selected doctor does not practise this specialty.",
            Self::UnknownOption => "Please choose one of the listed options.",
            Self::InPast => "The date cannot be in the past.",
            Self::TooFarAhead => "The date is too far in the future.",
            Self::OutOfShift => "The time is outside the hours of the selected shift.",
            Self::TooLong => "The text is too long.",
            Self::Unavailable => "This slot is no longer available, please choose another.",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, Reason>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first reason recorded for a field is kept.
    pub fn add(&mut self, field: Field, reason: Reason) {
        self.0.entry(field).or_insert(reason);
    }

    pub fn single(field: Field, reason: Reason) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }

    pub fn get(&self, field: Field) -> Option<Reason> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Reason)> + '_ {
        self.0.iter().map(|(f, r)| (*f, *r))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, reason)| format!("{field}: {reason}")).collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Read-only inputs of a validation run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub rules: &'a BookingRules,
    pub today: NaiveDate,
    /// Directory lookup result for the submitted doctor id.
    pub doctor: Option<&'a Doctor>,
}

/// Parse the doctor field into an id, if it is one.
pub fn parse_doctor_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim).and_then(|s| s.parse::<i64>().ok())
}

/// Parse a slot time.
///
/// Accepts 12-hour times with a meridiem (`10:00 AM`, `10:00am`, `10 AM`) and
/// 24-hour `HH:MM`. Minutes, when present, must be two digits.
pub fn parse_slot(raw: &str) -> Option<NaiveTime> {
    let compact = raw.split_whitespace().collect::<String>().to_ascii_uppercase();

    let (clock, pm) = if let Some(c) = compact.strip_suffix("AM") {
        (c, Some(false))
    } else if let Some(c) = compact.strip_suffix("PM") {
        (c, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        Some(_) => return None,
        None if pm.is_some() => (clock.parse::<u32>().ok()?, 0),
        None => return None,
    };

    let hour = match pm {
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(pm) => hour % 12 + if pm { 12 } else { 0 },
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Validate a raw form against the booking rules.
pub fn validate(
    form: &AppointmentForm,
    ctx: &ValidationContext<'_>,
) -> Result<AppointmentRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let specialist = match present(form.specialist.as_ref()) {
        None => {
            errors.add(Field::Specialist, Reason::Required);
            None
        }
        Some(raw) => raw
            .parse::<Specialist>()
            .map_err(|_| errors.add(Field::Specialist, Reason::UnknownOption))
            .ok(),
    };

    let doctor = check_doctor(form, ctx, specialist, &mut errors);
    let date = check_date(form, ctx, &mut errors);

    let shift = match present(form.shift.as_ref()) {
        None => {
            errors.add(Field::Shift, Reason::Required);
            None
        }
        Some(raw) => raw
            .parse::<Shift>()
            .map_err(|_| errors.add(Field::Shift, Reason::UnknownOption))
            .ok(),
    };

    let slot = match present(form.slot.as_ref()) {
        None => {
            errors.add(Field::Slot, Reason::Required);
            None
        }
        Some(raw) => match parse_slot(raw) {
            None => {
                errors.add(Field::Slot, Reason::Invalid);
                None
            }
            Some(time) => {
                if let Some(shift) = shift {
                    if !ctx.rules.shift_hours.window(shift).contains(time) {
                        errors.add(Field::Slot, Reason::OutOfShift);
                    }
                }
                Some(time)
            }
        },
    };

    let message = match present(form.message.as_ref()) {
        None => {
            errors.add(Field::Message, Reason::Required);
            None
        }
        Some(text) if text.chars().count() > ctx.rules.message_max_chars => {
            errors.add(Field::Message, Reason::TooLong);
            None
        }
        Some(text) => Some(text.to_string()),
    };

    match (doctor, specialist, date, shift, slot, message) {
        (Some(doctor_id), Some(specialist), Some(date), Some(shift), Some(slot), Some(message))
            if errors.is_empty() =>
        {
            Ok(AppointmentRequest {
                doctor_id,
                specialist,
                date,
                shift,
                slot,
                message,
            })
        }
        _ => Err(errors),
    }
}

fn check_doctor(
    form: &AppointmentForm,
    ctx: &ValidationContext<'_>,
    specialist: Option<Specialist>,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let Some(raw) = present(form.doctor.as_ref()) else {
        errors.add(Field::Doctor, Reason::Required);
        return None;
    };
    let Ok(id) = raw.parse::<i64>() else {
        errors.add(Field::Doctor, Reason::Invalid);
        return None;
    };
    let Some(doctor) = ctx.doctor.filter(|d| d.id == id && d.is_active) else {
        errors.add(Field::Doctor, Reason::NotFound);
        return None;
    };
    if specialist.is_some_and(|s| s != doctor.specialist) {
        errors.add(Field::Doctor, Reason::SpecialistMismatch);
        return None;
    }
    Some(id)
}

fn check_date(
    form: &AppointmentForm,
    ctx: &ValidationContext<'_>,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let Some(raw) = present(form.date.as_ref()) else {
        errors.add(Field::Date, Reason::Required);
        return None;
    };
    let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        errors.add(Field::Date, Reason::Invalid);
        return None;
    };
    if date < ctx.today {
        errors.add(Field::Date, Reason::InPast);
        return None;
    }
    let horizon = ctx
        .rules
        .max_days_ahead
        .and_then(|days| ctx.today.checked_add_days(Days::new(u64::from(days))));
    if horizon.is_some_and(|last| date > last) {
        errors.add(Field::Date, Reason::TooFarAhead);
        return None;
    }
    Some(date)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn cardiologist() -> Doctor {
        Doctor {
            id: 1,
            name: "Dr. John Smith".to_string(),
            specialist: Specialist::Cardiology,
            is_active: true,
        }
    }

    fn valid_form() -> AppointmentForm {
        AppointmentForm {
            doctor: Some("1".to_string()),
            specialist: Some("cardiology".to_string()),
            date: Some("2026-03-11".to_string()),
            shift: Some("morning".to_string()),
            slot: Some("10:00 AM".to_string()),
            message: Some("chest pain".to_string()),
        }
    }

    fn run(form: &AppointmentForm, doctor: Option<&Doctor>) -> Result<AppointmentRequest, ValidationErrors> {
        let rules = BookingRules::default();
        validate(
            form,
            &ValidationContext {
                rules: &rules,
                today: today(),
                doctor,
            },
        )
    }

    #[test]
    fn valid_form_normalizes_to_request() {
        let doctor = cardiologist();
        let req = run(&valid_form(), Some(&doctor)).unwrap();

        assert_eq!(req.doctor_id, 1);
        assert_eq!(req.specialist, Specialist::Cardiology);
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert_eq!(req.shift, Shift::Morning);
        assert_eq!(req.slot, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(req.message, "chest pain");
    }

    #[test]
    fn today_is_bookable() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            date: Some("2026-03-10".to_string()),
            ..valid_form()
        };
        assert!(run(&form, Some(&doctor)).is_ok());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = run(&AppointmentForm::default(), None).unwrap_err();
        assert_eq!(errors.len(), Field::ALL.len());
        for field in Field::ALL {
            assert_eq!(errors.get(field), Some(Reason::Required), "{field}");
        }
    }

    #[test]
    fn each_missing_field_is_named() {
        let doctor = cardiologist();
        for field in Field::ALL {
            let mut form = valid_form();
            let slot = match field {
                Field::Doctor => &mut form.doctor,
                Field::Specialist => &mut form.specialist,
                Field::Date => &mut form.date,
                Field::Shift => &mut form.shift,
                Field::Slot => &mut form.slot,
                Field::Message => &mut form.message,
            };
            *slot = Some("   ".to_string());

            let errors = run(&form, Some(&doctor)).unwrap_err();
            assert_eq!(errors.get(field), Some(Reason::Required), "{field}");
        }
    }

    #[test]
    fn yesterday_is_in_past() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            date: Some("2026-03-09".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Date), Some(Reason::InPast));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn date_beyond_horizon_is_rejected() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            date: Some("2027-03-10".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Date), Some(Reason::TooFarAhead));
    }

    #[test]
    fn malformed_date_is_invalid() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            date: Some("11/03/2026".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Date), Some(Reason::Invalid));
    }

    #[test]
    fn evening_time_in_morning_shift_is_out_of_shift() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            slot: Some("8:00 PM".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Slot), Some(Reason::OutOfShift));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_shift_skips_window_check() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            shift: Some("night".to_string()),
            slot: Some("11:00 PM".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Shift), Some(Reason::UnknownOption));
        assert!(!errors.contains(Field::Slot));
    }

    #[test]
    fn empty_message_is_required() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            message: Some(String::new()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Message), Some(Reason::Required));
    }

    #[test]
    fn message_length_counts_characters() {
        let doctor = cardiologist();
        let at_limit = AppointmentForm {
            message: Some("é".repeat(2000)),
            ..valid_form()
        };
        assert!(run(&at_limit, Some(&doctor)).is_ok());

        let over = AppointmentForm {
            message: Some("a".repeat(2001)),
            ..valid_form()
        };
        let errors = run(&over, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Message), Some(Reason::TooLong));
    }

    #[test]
    fn unknown_or_inactive_doctor_is_not_found() {
        let errors = run(&valid_form(), None).unwrap_err();
        assert_eq!(errors.get(Field::Doctor), Some(Reason::NotFound));

        let retired = Doctor {
            is_active: false,
            ..cardiologist()
        };
        let errors = run(&valid_form(), Some(&retired)).unwrap_err();
        assert_eq!(errors.get(Field::Doctor), Some(Reason::NotFound));
    }

    #[test]
    fn non_numeric_doctor_is_invalid() {
        let form = AppointmentForm {
            doctor: Some("dr-smith".to_string()),
            ..valid_form()
        };
        let errors = run(&form, None).unwrap_err();
        assert_eq!(errors.get(Field::Doctor), Some(Reason::Invalid));
    }

    #[test]
    fn doctor_must_practise_chosen_specialty() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            specialist: Some("neurology".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Doctor), Some(Reason::SpecialistMismatch));
        assert!(!errors.contains(Field::Specialist));
    }

    #[test]
    fn unknown_specialist() {
        let doctor = cardiologist();
        let form = AppointmentForm {
            specialist: Some("astrology".to_string()),
            ..valid_form()
        };
        let errors = run(&form, Some(&doctor)).unwrap_err();
        assert_eq!(errors.get(Field::Specialist), Some(Reason::UnknownOption));
        assert!(!errors.contains(Field::Doctor));
    }

    #[test]
    fn errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Date, Reason::InPast);
        errors.add(Field::Date, Reason::Invalid);
        errors.add(Field::Slot, Reason::OutOfShift);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"date": "in_past", "slot": "out_of_shift"})
        );
    }

    #[test]
    fn slot_formats_accepted() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_slot("10:00 AM"), Some(t(10, 0)));
        assert_eq!(parse_slot("10:30am"), Some(t(10, 30)));
        assert_eq!(parse_slot("10 am"), Some(t(10, 0)));
        assert_eq!(parse_slot("12:15 PM"), Some(t(12, 15)));
        assert_eq!(parse_slot("12:15 AM"), Some(t(0, 15)));
        assert_eq!(parse_slot("8:00 PM"), Some(t(20, 0)));
        assert_eq!(parse_slot("14:30"), Some(t(14, 30)));
    }

    #[test]
    fn slot_formats_rejected() {
        for raw in ["", "noon", "13:00 PM", "10:5", "10", "25:00", "10:60", "0 AM"] {
            assert_eq!(parse_slot(raw), None, "{raw}");
        }
    }
}
