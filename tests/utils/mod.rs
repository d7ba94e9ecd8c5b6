//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use vax_checkin::{
    CheckInCoordinator, CheckInEvent, DashboardAggregate, InMemoryBackend, Registration,
    SlotSummary, VaccinationHistoryRecord,
};

/// Registration with a fixed slot
#[must_use]
pub fn registration(citizen_id: &str, full_name: &str) -> Registration {
    Registration::new(citizen_id, full_name, "0812345678", "09:00-10:00")
}

#[must_use]
pub fn history_record(vaccine_name: &str, vaccinated_at: &str) -> VaccinationHistoryRecord {
    VaccinationHistoryRecord {
        timestamp: vaccinated_at.to_string(),
        vaccinated_at: vaccinated_at.to_string(),
        vaccine_name: vaccine_name.to_string(),
        injection_site: "left arm".to_string(),
        staff_id: "S01".to_string(),
        notes: String::new(),
    }
}

#[must_use]
pub fn aggregate(total_registrations: u64, total_vaccinations: u64) -> DashboardAggregate {
    DashboardAggregate {
        total_registrations,
        total_vaccinations,
        total_unique_vaccinated: total_vaccinations,
        total_unvaccinated: total_registrations.saturating_sub(total_vaccinations),
        slots: vec![
            SlotSummary {
                slot: "09:00-10:00".to_string(),
                registrations: total_registrations,
                vaccinated: total_vaccinations,
            },
            SlotSummary {
                slot: "10:00-11:00".to_string(),
                registrations: 0,
                vaccinated: 0,
            },
        ],
    }
}

/// Backend with two registrations and one resolvable staff member
#[must_use]
pub fn seeded_backend() -> Arc<InMemoryBackend> {
    Arc::new(
        InMemoryBackend::new()
            .with_registrations(vec![registration("123", "A"), registration("456", "B")])
            .with_staff("S01", "Nurse Malee"),
    )
}

/// Coordinator over the backend with the cache already loaded
pub async fn loaded_coordinator(backend: &Arc<InMemoryBackend>) -> CheckInCoordinator {
    let coordinator = CheckInCoordinator::new(backend.clone());
    coordinator
        .refresh_all()
        .await
        .expect("initial registration refresh");
    coordinator
}

/// Everything published since the last drain
pub fn drain(receiver: &mut Receiver<CheckInEvent>) -> Vec<CheckInEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}
