//! Registration cache
//!
//! Holds the locally cached snapshot of every registration and answers
//! citizen id lookups against it without a backend round trip.

pub mod registration_cache;
pub mod resolver;

pub use registration_cache::{RegistrationCache, RegistrationSnapshot};
pub use resolver::{CITIZEN_ID_REQUIRED, resolve_citizen};
