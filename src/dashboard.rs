//! Dashboard aggregation.
//!
//! Totals come straight from the backend on every load so events recorded by
//! other devices show up. Nothing here reads the registration cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::backend::Backend;
use crate::error::Result;
use crate::models::DashboardAggregate;

/// Whether the dashboard has ever been activated in this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardView {
    #[default]
    Unopened,
    Opened,
}

#[derive(Debug, Default)]
struct DashboardState {
    view: DashboardView,
    aggregate: Option<DashboardAggregate>,
    /// Sequence number of the last fetch started
    issued: u64,
    /// Sequence number of the fetch whose aggregate is shown
    applied: u64,
}

/// Lazily activated, fail-soft view of backend totals
pub struct DashboardAggregator {
    backend: Arc<dyn Backend>,
    state: Mutex<DashboardState>,
}

impl DashboardAggregator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: Mutex::new(DashboardState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn view(&self) -> DashboardView {
        self.lock().view
    }

    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.view() == DashboardView::Opened
    }

    /// Aggregate currently shown, if any load has succeeded
    #[must_use]
    pub fn aggregate(&self) -> Option<DashboardAggregate> {
        self.lock().aggregate.clone()
    }

    /// Mark the view opened; true when a fetch is needed
    ///
    /// A fetch is needed on first activation and whenever no aggregate has
    /// been loaded yet.
    pub fn activate(&self) -> bool {
        let mut state = self.lock();
        state.view = DashboardView::Opened;
        state.aggregate.is_none()
    }

    /// Fetch and install a fresh aggregate
    ///
    /// On failure the previous aggregate stays in place. A response that
    /// arrives after a newer one has been installed is discarded and
    /// `Ok(None)` returned.
    pub async fn load(&self) -> Result<Option<DashboardAggregate>> {
        let sequence = {
            let mut state = self.lock();
            state.issued += 1;
            state.issued
        };

        let fetched = self.backend.get_dashboard().await.inspect_err(|e| {
            warn!("Dashboard load failed, keeping previous totals: {e}");
        })?;

        let mut state = self.lock();
        if sequence < state.applied {
            debug!("Discarding dashboard response {sequence}, {} already shown", state.applied);
            return Ok(None);
        }

        state.applied = sequence;
        state.aggregate = Some(fetched.clone());
        Ok(Some(fetched))
    }
}
