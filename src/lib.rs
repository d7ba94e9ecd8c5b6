//! Client-side core for on-site vaccination check-in: a cached registration
//! snapshot, a single check-in session, vaccination recording and backend
//! dashboard totals, refreshed on a schedule.

pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod history;
pub mod models;
pub mod recorder;
pub mod scheduler;
pub mod session;

// Re-export the most common types for easier use
// Core types
pub use config::CheckInConfig;
pub use coordinator::CheckInCoordinator;
pub use error::{Error, RejectionKind, Result};
pub use events::CheckInEvent;
pub use scheduler::RefreshScheduler;
pub use session::SessionState;

// Backends
pub use backend::{Backend, HttpBackend, InMemoryBackend};

// Data model
pub use dashboard::DashboardView;
pub use models::{
    DashboardAggregate, Registration, SlotSummary, StaffLookupResult, VaccinationEvent,
    VaccinationHistoryRecord, VaccinationInput,
};
