//! In-memory backend for tests and offline demos.
//!
//! Responses are programmable per action and every call is counted, so tests
//! can assert which backend operations a coordinator flow reached.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Action, ApiResponse, Backend};
use crate::error::Result;
use crate::models::{
    DashboardAggregate, Registration, StaffLookupResult, VaccinationEvent,
    VaccinationHistoryRecord,
};

/// Number of calls received per backend action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub registrations: usize,
    pub history: usize,
    pub staff: usize,
    pub dashboard: usize,
    pub save: usize,
    /// Highest number of registration fetches seen in flight at once
    pub max_concurrent_registrations: usize,
}

#[derive(Debug)]
struct MockState {
    registrations: ApiResponse<Vec<Registration>>,
    registrations_delay: Option<Duration>,
    histories: HashMap<String, Vec<VaccinationHistoryRecord>>,
    history_failure: Option<String>,
    history_delays: HashMap<String, Duration>,
    staff: HashMap<String, String>,
    staff_delays: HashMap<String, Duration>,
    dashboard: ApiResponse<DashboardAggregate>,
    dashboard_delays: VecDeque<Duration>,
    save_replies: VecDeque<ApiResponse<()>>,
    saved: Vec<VaccinationEvent>,
    registrations_in_flight: usize,
    calls: CallCounts,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            registrations: ApiResponse::ok(Vec::new()),
            registrations_delay: None,
            histories: HashMap::new(),
            history_failure: None,
            history_delays: HashMap::new(),
            staff: HashMap::new(),
            staff_delays: HashMap::new(),
            dashboard: ApiResponse::ok(DashboardAggregate::default()),
            dashboard_delays: VecDeque::new(),
            save_replies: VecDeque::new(),
            saved: Vec::new(),
            registrations_in_flight: 0,
            calls: CallCounts::default(),
        }
    }
}

/// Programmable `Backend` double
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<MockState>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given registration set
    #[must_use]
    pub fn with_registrations(self, registrations: Vec<Registration>) -> Self {
        self.set_registrations(registrations);
        self
    }

    /// Make a staff id resolvable
    #[must_use]
    pub fn with_staff(self, staff_id: &str, staff_name: &str) -> Self {
        self.lock()
            .staff
            .insert(staff_id.to_string(), staff_name.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_registrations(&self, registrations: Vec<Registration>) {
        self.lock().registrations = ApiResponse::ok(registrations);
    }

    /// Make `getAllRegistrations` report failure
    pub fn fail_registrations(&self, message: &str) {
        self.lock().registrations = ApiResponse::failure(message);
    }

    /// Answer `getAllRegistrations` with a raw envelope
    pub fn set_registrations_reply(&self, reply: ApiResponse<Vec<Registration>>) {
        self.lock().registrations = reply;
    }

    /// Hold each registration fetch for the given time
    pub fn delay_registrations(&self, delay: Duration) {
        self.lock().registrations_delay = Some(delay);
    }

    pub fn set_history(&self, citizen_id: &str, records: Vec<VaccinationHistoryRecord>) {
        self.lock()
            .histories
            .insert(citizen_id.to_string(), records);
    }

    /// Make `getVaccinationHistory` report failure
    pub fn fail_history(&self, message: &str) {
        self.lock().history_failure = Some(message.to_string());
    }

    /// Hold history replies for one citizen
    pub fn delay_history(&self, citizen_id: &str, delay: Duration) {
        self.lock()
            .history_delays
            .insert(citizen_id.to_string(), delay);
    }

    /// Hold lookups of one staff id
    pub fn delay_staff(&self, staff_id: &str, delay: Duration) {
        self.lock().staff_delays.insert(staff_id.to_string(), delay);
    }

    pub fn set_dashboard(&self, aggregate: DashboardAggregate) {
        self.lock().dashboard = ApiResponse::ok(aggregate);
    }

    /// Make `getDashboard` report failure
    pub fn fail_dashboard(&self, message: &str) {
        self.lock().dashboard = ApiResponse::failure(message);
    }

    /// Answer `getDashboard` with a raw envelope
    pub fn set_dashboard_reply(&self, reply: ApiResponse<DashboardAggregate>) {
        self.lock().dashboard = reply;
    }

    /// Hold the next `getDashboard` reply
    ///
    /// The reply is taken when the call arrives, so a later `set_dashboard`
    /// does not change what a held call returns.
    pub fn delay_next_dashboard(&self, delay: Duration) {
        self.lock().dashboard_delays.push_back(delay);
    }

    /// Queue the reply for the next `saveVaccination`; success when empty
    pub fn push_save_reply(&self, reply: ApiResponse<()>) {
        self.lock().save_replies.push_back(reply);
    }

    /// Events accepted by `saveVaccination`
    #[must_use]
    pub fn saved_events(&self) -> Vec<VaccinationEvent> {
        self.lock().saved.clone()
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn get_all_registrations(&self) -> Result<Vec<Registration>> {
        let delay = {
            let mut state = self.lock();
            state.calls.registrations += 1;
            state.registrations_in_flight += 1;
            state.calls.max_concurrent_registrations = state
                .calls
                .max_concurrent_registrations
                .max(state.registrations_in_flight);
            state.registrations_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.registrations_in_flight -= 1;
        state
            .registrations
            .clone()
            .into_data(Action::GetAllRegistrations)
    }

    async fn get_vaccination_history(
        &self,
        citizen_id: &str,
    ) -> Result<Vec<VaccinationHistoryRecord>> {
        let (response, delay) = {
            let mut state = self.lock();
            state.calls.history += 1;
            let response = match &state.history_failure {
                Some(message) => ApiResponse::failure(message.as_str()),
                None => ApiResponse::ok(
                    state
                        .histories
                        .get(citizen_id)
                        .cloned()
                        .unwrap_or_default(),
                ),
            };
            (response, state.history_delays.get(citizen_id).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.into_data_or_default(Action::GetVaccinationHistory)
    }

    async fn get_staff(&self, staff_id: &str) -> Result<StaffLookupResult> {
        let (response, delay) = {
            let mut state = self.lock();
            state.calls.staff += 1;
            let response = match state.staff.get(staff_id) {
                Some(name) => ApiResponse::ok(StaffLookupResult::new(staff_id, name.as_str())),
                None => ApiResponse::failure("staff not found"),
            };
            (response, state.staff_delays.get(staff_id).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.into_data(Action::GetStaff)
    }

    async fn get_dashboard(&self) -> Result<DashboardAggregate> {
        let (response, delay) = {
            let mut state = self.lock();
            state.calls.dashboard += 1;
            (state.dashboard.clone(), state.dashboard_delays.pop_front())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.into_data(Action::GetDashboard)
    }

    async fn save_vaccination(&self, event: &VaccinationEvent) -> Result<String> {
        let mut state = self.lock();
        state.calls.save += 1;
        let reply = state
            .save_replies
            .pop_front()
            .unwrap_or_else(|| ApiResponse::ok(()).with_message("vaccination saved"));

        if reply.success {
            state.saved.push(event.clone());
        }
        reply.into_save_outcome()
    }
}
