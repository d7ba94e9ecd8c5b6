//! Check-in coordinator
//!
//! Owns every piece of mutable check-in state: the registration cache, the
//! single check-in session, what is currently displayed, and the dashboard.
//! User actions and timer refreshes all go through this one object.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use tokio::sync::broadcast;

use crate::backend::Backend;
use crate::cache::{RegistrationCache, resolve_citizen};
use crate::dashboard::{DashboardAggregator, DashboardView};
use crate::error::{Error, Result};
use crate::events::{CheckInEvent, EventBus};
use crate::history::HistoryLoader;
use crate::models::{
    DashboardAggregate, Registration, StaffLookupResult, VaccinationHistoryRecord,
    VaccinationInput,
};
use crate::recorder::VaccinationRecorder;
use crate::session::{CheckInSession, SessionState};

pub const STAFF_NOT_FOUND: &str = "staff id not found";

/// What the check-in view currently shows
#[derive(Debug, Default)]
struct DisplayState {
    registration: Option<Registration>,
    history: Vec<VaccinationHistoryRecord>,
    staff: Option<StaffLookupResult>,
}

impl DisplayState {
    fn clear_citizen(&mut self) {
        self.registration = None;
        self.history.clear();
    }
}

#[derive(Debug, Default)]
struct CheckInState {
    session: CheckInSession,
    display: DisplayState,
    /// Sequence number of the latest staff lookup
    staff_lookups: u64,
}

/// Single owner of check-in state
pub struct CheckInCoordinator {
    backend: Arc<dyn Backend>,
    cache: RegistrationCache,
    state: Mutex<CheckInState>,
    history: HistoryLoader,
    recorder: VaccinationRecorder,
    dashboard: DashboardAggregator,
    events: EventBus,
}

impl CheckInCoordinator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            cache: RegistrationCache::new(),
            state: Mutex::new(CheckInState::default()),
            history: HistoryLoader::new(Arc::clone(&backend)),
            recorder: VaccinationRecorder::new(Arc::clone(&backend)),
            dashboard: DashboardAggregator::new(Arc::clone(&backend)),
            events: EventBus::default(),
            backend,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CheckInState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CheckInEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub const fn cache(&self) -> &RegistrationCache {
        &self.cache
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.lock_state().session.state().clone()
    }

    #[must_use]
    pub fn selected_citizen(&self) -> Option<String> {
        self.lock_state().session.selected().map(str::to_owned)
    }

    #[must_use]
    pub fn displayed_registration(&self) -> Option<Registration> {
        self.lock_state().display.registration.clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<VaccinationHistoryRecord> {
        self.lock_state().display.history.clone()
    }

    #[must_use]
    pub fn staff(&self) -> Option<StaffLookupResult> {
        self.lock_state().display.staff.clone()
    }

    #[must_use]
    pub fn dashboard_view(&self) -> DashboardView {
        self.dashboard.view()
    }

    #[must_use]
    pub fn dashboard(&self) -> Option<DashboardAggregate> {
        self.dashboard.aggregate()
    }

    /// Replace the registration cache from the backend
    ///
    /// On failure the previous cache is kept and the error returned.
    pub async fn refresh_all(&self) -> Result<usize> {
        let count = self.cache.refresh_all(self.backend.as_ref()).await?;
        self.events.publish(CheckInEvent::CacheRefreshed {
            registrations: count,
        });
        Ok(count)
    }

    /// Scheduled or manual refresh: the cache, then the dashboard if opened
    pub async fn refresh(&self) -> Result<usize> {
        let refreshed = self.refresh_all().await;
        self.refresh_dashboard_if_opened().await;
        refreshed
    }

    /// Find a registration in the cache and select it
    ///
    /// Any previous selection and display are dropped first. On a hit the
    /// citizen's history is loaded before returning.
    pub async fn lookup(&self, raw_citizen_id: &str) -> Result<Registration> {
        let (outcome, generation) = {
            let mut state = self.lock_state();
            let generation = state.session.begin_lookup();
            state.display.clear_citizen();

            let outcome = resolve_citizen(&self.cache, raw_citizen_id);
            if let Ok(registration) = &outcome {
                state.session.select(registration.citizen_id.as_str(), generation);
                state.display.registration = Some(registration.clone());
            }
            (outcome, generation)
        };

        self.events.publish(CheckInEvent::RegistrationCleared);
        self.events.publish(CheckInEvent::HistoryCleared);

        let registration = outcome.inspect_err(|e| debug!("Lookup failed: {e}"))?;
        self.events
            .publish(CheckInEvent::RegistrationShown(registration.clone()));

        self.load_history(&registration.citizen_id, generation).await;
        Ok(registration)
    }

    async fn load_history(&self, citizen_id: &str, generation: u64) {
        let records = self.history.load(citizen_id).await;

        {
            let mut state = self.lock_state();
            if !state.session.is_current(generation) {
                debug!("Discarding history for {citizen_id}, selection changed");
                return;
            }
            state.display.history = records.clone();
        }

        if !records.is_empty() {
            self.events.publish(CheckInEvent::HistoryShown(records));
        }
    }

    /// Drop the selection and everything displayed for it
    pub fn reset(&self) {
        {
            let mut state = self.lock_state();
            state.session.clear();
            state.display.clear_citizen();
        }
        self.events.publish(CheckInEvent::RegistrationCleared);
        self.events.publish(CheckInEvent::HistoryCleared);
    }

    /// Resolve a typed staff id to a name for display
    ///
    /// Blank input clears the name and returns `None`. A reply that arrives
    /// after a newer staff lookup started is dropped and also returns `None`.
    pub async fn lookup_staff(&self, raw_staff_id: &str) -> Result<Option<StaffLookupResult>> {
        let sequence = {
            let mut state = self.lock_state();
            state.display.staff = None;
            state.staff_lookups += 1;
            state.staff_lookups
        };
        self.events.publish(CheckInEvent::StaffCleared);

        let staff_id = raw_staff_id.trim();
        if staff_id.is_empty() {
            return Ok(None);
        }

        let fetched = self.backend.get_staff(staff_id).await;

        let mut state = self.lock_state();
        if state.staff_lookups != sequence {
            debug!("Discarding staff reply for {staff_id}, a newer lookup started");
            return Ok(None);
        }

        let staff = match fetched {
            Ok(staff) => staff,
            Err(Error::Backend(message)) => {
                debug!("Staff lookup for {staff_id} failed: {message}");
                return Err(Error::not_found(STAFF_NOT_FOUND));
            }
            Err(e) => return Err(e),
        };

        state.display.staff = Some(staff.clone());
        drop(state);
        self.events
            .publish(CheckInEvent::StaffResolved(staff.clone()));
        Ok(Some(staff))
    }

    /// Record a vaccination for the selected citizen
    ///
    /// Returns the backend's success message. On success the session and
    /// every displayed field are cleared, then the dashboard is refreshed if
    /// it has been opened. Failures leave the session untouched.
    pub async fn record_vaccination(&self, input: VaccinationInput) -> Result<String> {
        let selected = self.selected_citizen();
        let event = VaccinationRecorder::prepare(selected.as_deref(), &input)?;

        let message = match self.recorder.submit(&event).await {
            Ok(message) => message,
            Err(e) => {
                if e.is_duplicate() {
                    self.events.publish(CheckInEvent::DuplicateRejected {
                        message: e.to_string(),
                    });
                }
                return Err(e);
            }
        };

        {
            let mut state = self.lock_state();
            state.session.clear();
            state.display.clear_citizen();
            state.display.staff = None;
            state.staff_lookups += 1;
        }
        self.events.publish(CheckInEvent::FormCleared);
        self.events.publish(CheckInEvent::RegistrationCleared);
        self.events.publish(CheckInEvent::HistoryCleared);
        self.events.publish(CheckInEvent::StaffCleared);
        self.events.publish(CheckInEvent::VaccinationSaved {
            citizen_id: event.citizen_id.clone(),
            message: message.clone(),
        });

        self.refresh_dashboard_if_opened().await;
        Ok(message)
    }

    /// Activate the dashboard view, fetching on first activation
    pub async fn open_dashboard(&self) -> Option<DashboardAggregate> {
        if self.dashboard.activate() {
            info!("Dashboard opened");
            self.load_dashboard().await
        } else {
            self.dashboard.aggregate()
        }
    }

    /// Fetch fresh totals; on failure the previous ones stay
    ///
    /// Only an installed aggregate is published. A late response superseded
    /// by a newer one returns what is shown without an event.
    pub async fn load_dashboard(&self) -> Option<DashboardAggregate> {
        match self.dashboard.load().await {
            Ok(Some(aggregate)) => {
                self.events
                    .publish(CheckInEvent::DashboardUpdated(aggregate.clone()));
                Some(aggregate)
            }
            Ok(None) | Err(_) => self.dashboard.aggregate(),
        }
    }

    async fn refresh_dashboard_if_opened(&self) {
        if self.dashboard.is_opened() {
            self.load_dashboard().await;
        }
    }
}
