//! Events published to presentation layers.
//!
//! The coordinator never renders anything. It publishes plain data on a
//! broadcast channel and views subscribe.

use log::trace;
use tokio::sync::broadcast;

use crate::models::{DashboardAggregate, Registration, StaffLookupResult, VaccinationHistoryRecord};

const DEFAULT_CAPACITY: usize = 64;

/// State changes a view may want to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInEvent {
    /// The registration cache was replaced
    CacheRefreshed { registrations: usize },
    RegistrationShown(Registration),
    RegistrationCleared,
    /// Non-empty history for the selected citizen
    HistoryShown(Vec<VaccinationHistoryRecord>),
    HistoryCleared,
    StaffResolved(StaffLookupResult),
    StaffCleared,
    /// Backend accepted a vaccination; `message` is the backend's own text
    VaccinationSaved { citizen_id: String, message: String },
    /// Input fields, including the citizen id, should be emptied
    FormCleared,
    /// Duplicate rejection; needs a blocking acknowledgement from the user
    DuplicateRejected { message: String },
    DashboardUpdated(DashboardAggregate),
}

/// Broadcast fan-out of `CheckInEvent`s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CheckInEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CheckInEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers; dropped when nobody listens
    pub fn publish(&self, event: CheckInEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            trace!("No subscribers for {event:?}");
        }
    }
}
