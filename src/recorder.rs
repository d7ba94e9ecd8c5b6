//! Vaccination recording for the selected citizen.

use std::sync::Arc;

use log::{info, warn};

use crate::backend::Backend;
use crate::error::{Error, RejectionKind, Result};
use crate::models::{VaccinationEvent, VaccinationInput, compose_notes};

pub const STAFF_ID_REQUIRED: &str = "staff id required";

/// Validates and submits vaccination events
pub struct VaccinationRecorder {
    backend: Arc<dyn Backend>,
}

impl VaccinationRecorder {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Build the event for the selected citizen from form input
    ///
    /// Fails with `NoActiveSession` when nothing is selected and with a
    /// validation error when the staff id is blank.
    pub fn prepare(
        selected_citizen: Option<&str>,
        input: &VaccinationInput,
    ) -> Result<VaccinationEvent> {
        let citizen_id = selected_citizen.ok_or(Error::NoActiveSession)?;

        let staff_id = input.staff_id.trim();
        if staff_id.is_empty() {
            return Err(Error::validation(STAFF_ID_REQUIRED));
        }

        Ok(VaccinationEvent {
            citizen_id: citizen_id.to_string(),
            staff_id: staff_id.to_string(),
            injection_site: input.injection_site.trim().to_string(),
            notes: compose_notes(&input.notes_preset, &input.notes_extra),
            vaccinated_at: input.vaccinated_at,
        })
    }

    /// Send the event; returns the backend's success message
    pub async fn submit(&self, event: &VaccinationEvent) -> Result<String> {
        match self.backend.save_vaccination(event).await {
            Ok(message) => {
                info!(
                    "Vaccination saved for {} by staff {}",
                    event.citizen_id, event.staff_id
                );
                Ok(message)
            }
            Err(e) => {
                match &e {
                    Error::Rejected {
                        kind: RejectionKind::Duplicate,
                        ..
                    } => warn!("Duplicate vaccination rejected for {}", event.citizen_id),
                    _ => warn!("Vaccination save failed for {}: {e}", event.citizen_id),
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_requires_selection() {
        let input = VaccinationInput::new("S01");
        assert!(matches!(
            VaccinationRecorder::prepare(None, &input),
            Err(Error::NoActiveSession)
        ));
    }

    #[test]
    fn test_prepare_requires_staff() {
        let err = VaccinationRecorder::prepare(Some("123"), &VaccinationInput::new("   "))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), STAFF_ID_REQUIRED);
    }

    #[test]
    fn test_prepare_trims_and_composes() {
        let input = VaccinationInput::new(" S01 ")
            .with_injection_site("  left deltoid ")
            .with_notes(" follow-up ", " mild fever ");

        let event = VaccinationRecorder::prepare(Some("123"), &input).unwrap();
        assert_eq!(event.citizen_id, "123");
        assert_eq!(event.staff_id, "S01");
        assert_eq!(event.injection_site, "left deltoid");
        assert_eq!(event.notes, "follow-up - mild fever");
        assert_eq!(event.vaccinated_at, None);
    }
}
