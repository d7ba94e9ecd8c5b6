//! Backend seam
//!
//! The remote data store is reached through the [`Backend`] trait. Every
//! operation resolves the backend's `{success, message, data}` envelope into a
//! `Result`, keeping the backend's message verbatim on failure.

pub mod envelope;
pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    DashboardAggregate, Registration, StaffLookupResult, VaccinationEvent,
    VaccinationHistoryRecord,
};

pub use envelope::{ApiResponse, DUPLICATE_VACCINATION_CODE, classify_rejection};
pub use http::HttpBackend;
pub use mock::InMemoryBackend;

/// Action discriminator sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetAllRegistrations,
    GetVaccinationHistory,
    GetStaff,
    GetDashboard,
    SaveVaccination,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetAllRegistrations => "getAllRegistrations",
            Self::GetVaccinationHistory => "getVaccinationHistory",
            Self::GetStaff => "getStaff",
            Self::GetDashboard => "getDashboard",
            Self::SaveVaccination => "saveVaccination",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations the check-in core consumes from the remote store
#[async_trait]
pub trait Backend: Send + Sync {
    /// Complete registration set, in backend order
    async fn get_all_registrations(&self) -> Result<Vec<Registration>>;

    /// Past vaccinations of one citizen, in backend order
    async fn get_vaccination_history(
        &self,
        citizen_id: &str,
    ) -> Result<Vec<VaccinationHistoryRecord>>;

    /// Resolve a staff id to a display name
    async fn get_staff(&self, staff_id: &str) -> Result<StaffLookupResult>;

    /// Backend-computed totals
    async fn get_dashboard(&self) -> Result<DashboardAggregate>;

    /// Store a vaccination event; returns the backend's success message
    async fn save_vaccination(&self, event: &VaccinationEvent) -> Result<String>;
}
