//! Vaccination events and history records

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::wire::string_or_number;

/// Wire format for an explicit vaccination time
pub const VACCINATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

const VACCINATED_AT_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Raw form values for recording a vaccination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaccinationInput {
    pub staff_id: String,
    pub injection_site: String,
    /// Reason picked from the preset list
    pub notes_preset: String,
    /// Free-text addition to the preset
    pub notes_extra: String,
    /// Explicit administration time; the backend stamps the event when absent
    pub vaccinated_at: Option<NaiveDateTime>,
}

impl VaccinationInput {
    pub fn new(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_injection_site(mut self, site: impl Into<String>) -> Self {
        self.injection_site = site.into();
        self
    }

    #[must_use]
    pub fn with_notes(mut self, preset: impl Into<String>, extra: impl Into<String>) -> Self {
        self.notes_preset = preset.into();
        self.notes_extra = extra.into();
        self
    }

    #[must_use]
    pub const fn with_vaccinated_at(mut self, at: NaiveDateTime) -> Self {
        self.vaccinated_at = Some(at);
        self
    }
}

/// A vaccination event ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccinationEvent {
    pub citizen_id: String,
    pub staff_id: String,
    pub injection_site: String,
    pub notes: String,
    pub vaccinated_at: Option<NaiveDateTime>,
}

impl VaccinationEvent {
    /// Form fields sent alongside the `saveVaccination` action
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("citizenId", self.citizen_id.clone()),
            ("staffId", self.staff_id.clone()),
            (
                "vaccinatedAt",
                self.vaccinated_at
                    .map(|at| at.format(VACCINATED_AT_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
            ("injectionSite", self.injection_site.clone()),
            ("notes", self.notes.clone()),
        ]
    }
}

/// One past vaccination of a citizen, as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationHistoryRecord {
    /// When the event was recorded
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: String,
    /// When the dose was administered
    #[serde(default, deserialize_with = "string_or_number")]
    pub vaccinated_at: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub vaccine_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub injection_site: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub staff_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub notes: String,
}

/// Join a preset reason and free text into the stored notes value
///
/// Both present gives `"<preset> - <extra>"`, otherwise whichever is present.
#[must_use]
pub fn compose_notes(preset: &str, extra: &str) -> String {
    [preset.trim(), extra.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .join(" - ")
}

/// Parse a form-style date-time (`YYYY-MM-DDTHH:MM`); blank means absent
pub fn parse_vaccinated_at(raw: &str) -> Result<Option<NaiveDateTime>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    VACCINATED_AT_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(Some)
        .ok_or_else(|| Error::validation(format!("unrecognised vaccination time: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_compose_notes() {
        assert_eq!(compose_notes("A", ""), "A");
        assert_eq!(compose_notes("", "B"), "B");
        assert_eq!(compose_notes("A", "B"), "A - B");
        assert_eq!(compose_notes("", ""), "");
        assert_eq!(compose_notes("  A ", "   "), "A");
    }

    #[test]
    fn test_parse_vaccinated_at() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_vaccinated_at("2024-03-01T09:30").unwrap(), Some(expected));
        assert_eq!(parse_vaccinated_at("2024-03-01 09:30").unwrap(), Some(expected));
        assert_eq!(parse_vaccinated_at("  ").unwrap(), None);
        assert!(matches!(
            parse_vaccinated_at("yesterday"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_form_fields() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut event = VaccinationEvent {
            citizen_id: "123".to_string(),
            staff_id: "S01".to_string(),
            injection_site: "left arm".to_string(),
            notes: "A - B".to_string(),
            vaccinated_at: Some(at),
        };

        let fields = event.form_fields();
        assert!(fields.contains(&("vaccinatedAt", "2024-03-01 09:30".to_string())));
        assert!(fields.contains(&("citizenId", "123".to_string())));

        event.vaccinated_at = None;
        assert!(event.form_fields().contains(&("vaccinatedAt", String::new())));
    }
}
