//! Vaccination history for the selected citizen.

use std::sync::Arc;

use log::{debug, warn};

use crate::backend::Backend;
use crate::models::VaccinationHistoryRecord;

/// Fetches a citizen's past vaccinations
///
/// A failed fetch yields an empty history; it never blocks check-in.
pub struct HistoryLoader {
    backend: Arc<dyn Backend>,
}

impl HistoryLoader {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Records in backend order, or empty on failure
    pub async fn load(&self, citizen_id: &str) -> Vec<VaccinationHistoryRecord> {
        match self.backend.get_vaccination_history(citizen_id).await {
            Ok(records) => {
                debug!(
                    "Loaded {} history records for {citizen_id}",
                    records.len()
                );
                records
            }
            Err(e) => {
                warn!("Failed to load vaccination history for {citizen_id}: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn record(vaccine: &str) -> VaccinationHistoryRecord {
        VaccinationHistoryRecord {
            vaccine_name: vaccine.to_string(),
            ..VaccinationHistoryRecord::default()
        }
    }

    #[tokio::test]
    async fn test_history_kept_in_backend_order() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_history("123", vec![record("dose 2"), record("dose 1")]);

        let records = HistoryLoader::new(backend).load("123").await;
        let names: Vec<_> = records.iter().map(|r| r.vaccine_name.as_str()).collect();
        assert_eq!(names, vec!["dose 2", "dose 1"]);
    }

    #[tokio::test]
    async fn test_history_failure_is_empty() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_history("123", vec![record("dose 1")]);
        backend.fail_history("quota exceeded");

        assert!(HistoryLoader::new(backend).load("123").await.is_empty());
    }
}
