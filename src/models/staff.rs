//! Staff lookup result

use serde::{Deserialize, Serialize};

/// Name resolved for a typed staff id; shown next to the input only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLookupResult {
    pub staff_id: String,
    pub staff_name: String,
}

impl StaffLookupResult {
    pub fn new(staff_id: impl Into<String>, staff_name: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
            staff_name: staff_name.into(),
        }
    }
}
