//! Citizen id lookups against the cached snapshot.

use crate::cache::RegistrationCache;
use crate::error::{Error, Result};
use crate::models::Registration;

pub const CITIZEN_ID_REQUIRED: &str = "citizen id required";

/// Resolve typed input to a cached registration
///
/// Input is trimmed; blank input is a validation error and an unknown id is
/// `NotFound`. No backend call is made.
pub fn resolve_citizen(cache: &RegistrationCache, raw_citizen_id: &str) -> Result<Registration> {
    let citizen_id = raw_citizen_id.trim();
    if citizen_id.is_empty() {
        return Err(Error::validation(CITIZEN_ID_REQUIRED));
    }

    cache
        .find(citizen_id)
        .ok_or_else(|| Error::not_found(format!("no registration for citizen id {citizen_id}")))
}
