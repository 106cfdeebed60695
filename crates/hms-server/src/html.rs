//! Server-rendered HTML pages.

use std::fmt::Write;

use hms_booking::validate::{Field, ValidationErrors};
use hms_booking::{AppointmentForm, Doctor};
use hms_core::schedule::{Shift, Specialist};

/// Escape text for HTML element and attribute content.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap page content in the site layout.
fn layout(hospital: &str, title: &str, content: &str) -> String {
    let hospital = escape_html(hospital);
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {hospital}</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         color: #1f2933; background: #f5f7fa; line-height: 1.6; }}
  header {{ background: #0b6e4f; color: #fff; padding: 1rem 0; }}
  header a {{ color: #fff; margin-right: 1.25rem; text-decoration: none; }}
  .container {{ max-width: 820px; margin: 0 auto; padding: 1.5rem 1rem; }}
  h1 {{ font-size: 1.8rem; margin-bottom: 0.75rem; }}
  p {{ margin-bottom: 1rem; }}
  label {{ display: block; font-weight: 600; margin-top: 1rem; }}
  select, input, textarea {{ width: 100%; padding: 0.5rem; border: 1px solid #cbd2d9; border-radius: 6px; }}
  button {{ margin-top: 1.25rem; padding: 0.6rem 1.5rem; background: #0b6e4f; color: #fff;
            border: 0; border-radius: 6px; cursor: pointer; }}
  .error {{ color: #b42318; font-size: 0.9em; }}
  .flash {{ padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }}
  .flash.success {{ background: #d1fadf; color: #05603a; }}
  .flash.failure {{ background: #fee4e2; color: #912018; }}
</style>
</head>
<body>
<header><div class="container">
  <a href="/"><strong>{hospital}</strong></a>
  <a href="/page/about">About</a>
  <a href="/page/services">Services</a>
  <a href="/page/contact">Contact</a>
  <a href="/appointment">Book an appointment</a>
</div></header>
<main class="container">
{content}
</main>
</body>
</html>"#
    )
}

/// `/` welcome page.
pub fn home_page(hospital: &str) -> String {
    let name = escape_html(hospital);
    layout(
        hospital,
        "Welcome",
        &format!(
            r#"<h1>Welcome to {name}</h1>
<p>Our cardiology, neurology and pediatrics teams see patients every day in
morning, afternoon and evening shifts.</p>
<p><a href="/appointment">Book an appointment</a></p>"#
        ),
    )
}

/// Static content pages by slug.
pub fn content_page(hospital: &str, slug: &str) -> Option<String> {
    let (title, body) = match slug {
        "about" => (
            "About us",
            "<p>We are a community hospital offering specialist outpatient care.</p>",
        ),
        "services" => (
            "Services",
            "<ul><li>Cardiology</li><li>Neurology</li><li>Pediatrics</li></ul>",
        ),
        "contact" => (
            "Contact",
            "<p>Call the front desk or visit reception during opening hours.</p>",
        ),
        _ => return None,
    };
    Some(layout(hospital, title, &format!("<h1>{title}</h1>\n{body}")))
}

pub fn not_found_page(hospital: &str) -> String {
    layout(
        hospital,
        "Page not found",
        r#"<h1>Page not found</h1><p><a href="/">Back to the home page</a></p>"#,
    )
}

pub fn sign_in_required_page(hospital: &str) -> String {
    layout(
        hospital,
        "Sign in required",
        "<h1>Sign in required</h1><p>Please sign in to book an appointment.</p>",
    )
}

/// Banner shown above the booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Booked { appointment_id: String },
    Failure(String),
}

/// Everything the booking form needs to render.
#[derive(Debug, Default)]
pub struct FormView<'a> {
    pub doctors: &'a [Doctor],
    pub form: Option<&'a AppointmentForm>,
    pub errors: Option<&'a ValidationErrors>,
    pub notice: Option<Notice>,
}

impl FormView<'_> {
    fn old(&self, field: Field) -> &str {
        let Some(form) = self.form else { return "" };
        let value = match field {
            Field::Doctor => &form.doctor,
            Field::Specialist => &form.specialist,
            Field::Date => &form.date,
            Field::Shift => &form.shift,
            Field::Slot => &form.slot,
            Field::Message => &form.message,
        };
        value.as_deref().unwrap_or("")
    }

    fn error(&self, field: Field) -> String {
        self.errors
            .and_then(|e| e.get(field))
            .map(|reason| {
                format!(
                    r#"<p class="error" data-field="{field}" data-reason="{reason}">{}</p>"#,
                    reason.describe()
                )
            })
            .unwrap_or_default()
    }
}

fn option(value: &str, label: &str, selected: &str) -> String {
    let mark = if value == selected { " selected" } else { "" };
    format!(
        r#"<option value="{}"{mark}>{}</option>"#,
        escape_html(value),
        escape_html(label)
    )
}

/// `/appointment` booking form with inline errors and previous input.
pub fn appointment_page(hospital: &str, view: &FormView<'_>) -> String {
    let mut content = String::from("<h1>Book an appointment</h1>\n");

    match &view.notice {
        Some(Notice::Booked { appointment_id }) => {
            let _ = write!(
                content,
                r#"<div class="flash success">Your appointment request has been received and is pending confirmation. Reference: <code>{}</code></div>"#,
                escape_html(appointment_id)
            );
        }
        Some(Notice::Failure(message)) => {
            let _ = write!(
                content,
                r#"<div class="flash failure">{}</div>"#,
                escape_html(message)
            );
        }
        None => {}
    }

    let mut doctors = option("", "Select a doctor", view.old(Field::Doctor));
    for doctor in view.doctors {
        doctors.push_str(&option(
            &doctor.id.to_string(),
            &format!("{} ({})", doctor.name, doctor.specialist.label()),
            view.old(Field::Doctor),
        ));
    }

    let mut specialists = option("", "Select a specialty", view.old(Field::Specialist));
    for specialist in Specialist::ALL {
        specialists.push_str(&option(
            specialist.as_str(),
            specialist.label(),
            view.old(Field::Specialist),
        ));
    }

    let mut shifts = option("", "Select a shift", view.old(Field::Shift));
    for shift in Shift::ALL {
        shifts.push_str(&option(shift.as_str(), shift.label(), view.old(Field::Shift)));
    }

    let _ = write!(
        content,
        r#"<form method="post" action="/appointment">
  <label for="doctor">Doctor</label>
  <select id="doctor" name="doctor">{doctors}</select>
  {doctor_error}
  <label for="specialist">Specialty</label>
  <select id="specialist" name="specialist">{specialists}</select>
  {specialist_error}
  <label for="date">Date</label>
  <input id="date" name="date" type="date" value="{date}">
  {date_error}
  <label for="shift">Shift</label>
  <select id="shift" name="shift">{shifts}</select>
  {shift_error}
  <label for="slot">Time</label>
  <input id="slot" name="slot" placeholder="10:00 AM" value="{slot}">
  {slot_error}
  <label for="message">Reason for visit</label>
  <textarea id="message" name="message" rows="4">{message}</textarea>
  {message_error}
  <button type="submit">Request appointment</button>
</form>"#,
        doctor_error = view.error(Field::Doctor),
        specialist_error = view.error(Field::Specialist),
        date = escape_html(view.old(Field::Date)),
        date_error = view.error(Field::Date),
        shift_error = view.error(Field::Shift),
        slot = escape_html(view.old(Field::Slot)),
        slot_error = view.error(Field::Slot),
        message = escape_html(view.old(Field::Message)),
        message_error = view.error(Field::Message),
    );

    layout(hospital, "Book an appointment", &content)
}
