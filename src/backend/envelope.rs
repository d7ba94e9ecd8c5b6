//! Response envelope shared by every backend action.

use serde::{Deserialize, Serialize};

use crate::backend::Action;
use crate::error::{Error, RejectionKind, Result};

/// Rejection code marking a same-day duplicate vaccination
pub const DUPLICATE_VACCINATION_CODE: &str = "DUPLICATE_VACCINATION";

/// Messages older backends send for a duplicate instead of a code
const LEGACY_DUPLICATE_MARKERS: [&str; 2] = ["ไม่สามารถบันทึกซ้ำได้", "cannot save duplicate"];

const SAVE_SUCCEEDED: &str = "vaccination saved";

/// `{success, message?, code?, data?}` as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            code: None,
            data: Some(data),
        }
    }

    /// Failed response with the backend's message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            code: None,
            data: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn failure_message(&self, action: Action) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("{action} failed"))
    }

    /// Unwrap a read response; a missing payload is an error
    pub fn into_data(self, action: Action) -> Result<T> {
        if !self.success {
            return Err(Error::backend(self.failure_message(action)));
        }
        self.data
            .ok_or_else(|| Error::backend(format!("{action} returned no data")))
    }

    /// Unwrap a write response into the backend's success message
    pub fn into_save_outcome(self) -> Result<String> {
        if self.success {
            return Ok(self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| SAVE_SUCCEEDED.to_string()));
        }

        let message = self.failure_message(Action::SaveVaccination);
        Err(Error::Rejected {
            kind: classify_rejection(self.code.as_deref(), &message),
            message,
        })
    }
}

impl<T: Default> ApiResponse<T> {
    /// Unwrap a read response; a missing payload reads as empty
    pub fn into_data_or_default(self, action: Action) -> Result<T> {
        if !self.success {
            return Err(Error::backend(self.failure_message(action)));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Decide whether a write rejection is a duplicate
///
/// An explicit code is authoritative. Without one, the legacy message markers
/// are consulted.
#[must_use]
pub fn classify_rejection(code: Option<&str>, message: &str) -> RejectionKind {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) if code.eq_ignore_ascii_case(DUPLICATE_VACCINATION_CODE) => {
            RejectionKind::Duplicate
        }
        Some(_) => RejectionKind::Other,
        None if LEGACY_DUPLICATE_MARKERS
            .iter()
            .any(|marker| message.contains(marker)) =>
        {
            RejectionKind::Duplicate
        }
        None => RejectionKind::Other,
    }
}
