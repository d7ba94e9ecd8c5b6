//! Registration entity model
//!
//! A Registration is a citizen's appointment record as held by the backend.
//! Instances are never edited locally; the cache replaces them wholesale.

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::wire::{optional_string, string_or_number};

/// Formats accepted for the birth date cell
const BIRTH_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// A citizen's registration and appointment slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// National ID, unique key
    #[serde(deserialize_with = "string_or_number")]
    pub citizen_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub full_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: String,
    /// Appointment time bucket, e.g. "09:00-10:00"
    #[serde(default, deserialize_with = "string_or_number")]
    pub appointment_slot: String,
    /// Birth date as sent by the backend
    #[serde(
        default,
        deserialize_with = "optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<String>,
}

impl Registration {
    /// Create a registration without a birth date
    pub fn new(
        citizen_id: impl Into<String>,
        full_name: impl Into<String>,
        phone: impl Into<String>,
        appointment_slot: impl Into<String>,
    ) -> Self {
        Self {
            citizen_id: citizen_id.into(),
            full_name: full_name.into(),
            phone: phone.into(),
            appointment_slot: appointment_slot.into(),
            birth_date: None,
        }
    }

    /// Attach a birth date
    #[must_use]
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Parsed birth date, if present and in a recognised format
    #[must_use]
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date.as_deref().and_then(parse_birth_date)
    }

    /// Age in whole years on the given date
    ///
    /// Calendar based: the year difference, less one if the birthday has not
    /// yet come around in the reference year.
    #[must_use]
    pub fn age_on(&self, reference_date: NaiveDate) -> Option<i32> {
        let birth_date = self.birth_date()?;
        if birth_date > reference_date {
            return None;
        }

        let years = reference_date.year() - birth_date.year();
        if reference_date.month() < birth_date.month()
            || (reference_date.month() == birth_date.month()
                && reference_date.day() < birth_date.day())
        {
            Some(years - 1)
        } else {
            Some(years)
        }
    }

    /// Age in whole years today
    #[must_use]
    pub fn age(&self) -> Option<i32> {
        self.age_on(Local::now().date_naive())
    }
}

/// Parse a birth date cell with multiple format attempts
#[must_use]
pub fn parse_birth_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for format in BIRTH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    // Serialized date cells arrive as RFC 3339 timestamps
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}
