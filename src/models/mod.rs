//! Domain models for vaccination check-in
//!
//! These are the plain data types exchanged with the backend and handed to
//! presentation layers. None of them carries behaviour beyond small display
//! derivations.

pub mod dashboard;
pub mod registration;
pub mod staff;
pub mod vaccination;
pub mod wire;

// Re-export commonly used types
pub use dashboard::{ChartSeries, DashboardAggregate, SlotSummary};
pub use registration::Registration;
pub use staff::StaffLookupResult;
pub use vaccination::{
    VaccinationEvent, VaccinationHistoryRecord, VaccinationInput, compose_notes,
    parse_vaccinated_at,
};
