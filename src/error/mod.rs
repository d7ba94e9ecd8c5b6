//! Error handling for the check-in core.

/// Why the backend refused to store a vaccination event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Same citizen already has an event recorded for the day
    Duplicate,
    /// Any other backend-reported refusal
    Other,
}

/// Specialized error type for check-in operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required input missing or blank
    #[error("{0}")]
    Validation(String),

    /// No match for the given identifier
    #[error("{0}")]
    NotFound(String),

    /// A vaccination was submitted without a selected registrant
    #[error("search for a registrant first")]
    NoActiveSession,

    /// Backend reported failure on a read operation
    #[error("{0}")]
    Backend(String),

    /// Backend refused a vaccination write; the message is the backend's own
    #[error("{message}")]
    Rejected {
        kind: RejectionKind,
        message: String,
    },

    /// Transport failure talking to the backend
    #[error("Backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Base endpoint could not be parsed
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a backend-reported read failure
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Network failures and backend-reported read failures
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Http(_))
    }

    /// True when the backend rejected a write as a duplicate
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::Rejected {
                kind: RejectionKind::Duplicate,
                ..
            }
        )
    }
}

/// Result type for check-in operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(
            Error::validation("citizen id required").to_string(),
            "citizen id required"
        );
        assert_eq!(
            Error::NoActiveSession.to_string(),
            "search for a registrant first"
        );
        let rejected = Error::Rejected {
            kind: RejectionKind::Duplicate,
            message: "ไม่สามารถบันทึกซ้ำได้".to_string(),
        };
        assert_eq!(rejected.to_string(), "ไม่สามารถบันทึกซ้ำได้");
        assert!(rejected.is_duplicate());
        assert!(!rejected.is_backend());
    }

    #[test]
    fn test_backend_classification() {
        assert!(Error::backend("sheet missing").is_backend());
        assert!(!Error::not_found("x").is_backend());
        assert!(!Error::validation("x").is_duplicate());
    }
}
