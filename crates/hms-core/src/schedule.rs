//! Schedule vocabulary: shifts, specialties and the hour window of each shift.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A value that is not one of the fixed options of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown option: {0}")]
pub struct UnknownOption(pub String);

/// Coarse daily period used to bucket slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// Specialties offered for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    Cardiology,
    Neurology,
    Pediatrics,
}

impl Specialist {
    pub const ALL: [Self; 3] = [Self::Cardiology, Self::Neurology, Self::Pediatrics];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cardiology => "cardiology",
            Self::Neurology => "neurology",
            Self::Pediatrics => "pediatrics",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cardiology => "Cardiology",
            Self::Neurology => "Neurology",
            Self::Pediatrics => "Pediatrics",
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialist {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cardiology" => Ok(Self::Cardiology),
            "neurology" => Ok(Self::Neurology),
            "pediatrics" => Ok(Self::Pediatrics),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// Bookable hours of a shift. `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl ShiftWindow {
    /// Build a window from whole hours. Hours past 23 clamp to midnight.
    pub fn hours(start: u32, end: u32) -> Self {
        let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            start: at(start),
            end: at(end),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Window configuration for every shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHours {
    pub morning: ShiftWindow,
    pub afternoon: ShiftWindow,
    pub evening: ShiftWindow,
}

impl Default for ShiftHours {
    fn default() -> Self {
        Self {
            morning: ShiftWindow::hours(8, 12),
            afternoon: ShiftWindow::hours(12, 17),
            evening: ShiftWindow::hours(17, 21),
        }
    }
}

impl ShiftHours {
    pub const fn window(&self, shift: Shift) -> ShiftWindow {
        match shift {
            Shift::Morning => self.morning,
            Shift::Afternoon => self.afternoon,
            Shift::Evening => self.evening,
        }
    }
}

/// `HH:MM` serde representation for shift bounds in settings files.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn shift_parses_case_insensitively() {
        assert_eq!("Morning".parse::<Shift>().unwrap(), Shift::Morning);
        assert_eq!(" EVENING ".parse::<Shift>().unwrap(), Shift::Evening);
        assert!("night".parse::<Shift>().is_err());
    }

    #[test]
    fn specialist_round_trips_through_as_str() {
        for s in Specialist::ALL {
            assert_eq!(s.as_str().parse::<Specialist>().unwrap(), s);
        }
        assert_eq!(
            "dermatology".parse::<Specialist>().unwrap_err(),
            UnknownOption("dermatology".to_string())
        );
    }

    #[test]
    fn window_end_is_exclusive() {
        let morning = ShiftHours::default().window(Shift::Morning);
        assert!(morning.contains(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
        assert!(morning.contains(NaiveTime::from_hms_opt(11, 59, 0).unwrap()));
        assert!(!morning.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!morning.contains(NaiveTime::from_hms_opt(7, 59, 0).unwrap()));
    }

    #[test]
    fn shift_hours_deserialize_from_hhmm() {
        let json = r#"{
            "morning": {"start": "07:30", "end": "11:00"},
            "afternoon": {"start": "12:00", "end": "16:00"},
            "evening": {"start": "18:00", "end": "22:00"}
        }"#;
        let hours: ShiftHours = serde_json::from_str(json).unwrap();
        assert_eq!(
            hours.morning.start,
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        let back = serde_json::to_value(hours).unwrap();
        assert_eq!(back["evening"]["end"], "22:00");
    }
}
