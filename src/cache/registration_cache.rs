//! Snapshot-swapping registration cache.
//!
//! Readers clone an `Arc` to the current snapshot and never see a partially
//! rebuilt one. A refresh builds the next snapshot off to the side and swaps
//! it in only once the backend has returned the complete set.

use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Local};
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::backend::Backend;
use crate::error::Result;
use crate::models::Registration;

/// Immutable view of the registration set at one point in time
#[derive(Debug, Default)]
pub struct RegistrationSnapshot {
    registrations: Vec<Registration>,
    index: FxHashMap<String, usize>,
    refreshed_at: Option<DateTime<Local>>,
}

impl RegistrationSnapshot {
    /// Build a snapshot, keeping backend order
    ///
    /// When a citizen id repeats, the first row wins.
    #[must_use]
    pub fn new(registrations: Vec<Registration>) -> Self {
        let mut index =
            FxHashMap::with_capacity_and_hasher(registrations.len(), Default::default());
        let mut duplicates = 0usize;
        for (position, registration) in registrations.iter().enumerate() {
            match index.entry(registration.citizen_id.clone()) {
                Entry::Occupied(_) => duplicates += 1,
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }
        if duplicates > 0 {
            warn!("{duplicates} registrations share a citizen id with an earlier row");
        }

        Self {
            registrations,
            index,
            refreshed_at: Some(Local::now()),
        }
    }

    /// Exact match on citizen id
    #[must_use]
    pub fn get(&self, citizen_id: &str) -> Option<&Registration> {
        self.index
            .get(citizen_id)
            .map(|&position| &self.registrations[position])
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// When this snapshot was installed; `None` before the first refresh
    #[must_use]
    pub const fn refreshed_at(&self) -> Option<DateTime<Local>> {
        self.refreshed_at
    }
}

/// Cached registration set, refreshed wholesale from the backend
#[derive(Debug, Default)]
pub struct RegistrationCache {
    current: RwLock<Arc<RegistrationSnapshot>>,
    /// At most one `refresh_all` fetch in flight
    refresh_guard: tokio::sync::Mutex<()>,
}

impl RegistrationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot currently installed
    #[must_use]
    pub fn snapshot(&self) -> Arc<RegistrationSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Exact match on citizen id against the current snapshot
    #[must_use]
    pub fn find(&self, citizen_id: &str) -> Option<Registration> {
        self.snapshot().get(citizen_id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Install a new registration set in one swap
    pub fn replace(&self, registrations: Vec<Registration>) -> Arc<RegistrationSnapshot> {
        let next = Arc::new(RegistrationSnapshot::new(registrations));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        next
    }

    /// Fetch the complete registration set and swap it in
    ///
    /// Concurrent callers are serialized. On failure the previous snapshot
    /// stays installed.
    pub async fn refresh_all(&self, backend: &dyn Backend) -> Result<usize> {
        let _in_flight = self.refresh_guard.lock().await;
        let start = Instant::now();

        let registrations = backend.get_all_registrations().await.inspect_err(|e| {
            warn!(
                "Registration refresh failed, keeping {} cached rows: {e}",
                self.len()
            );
        })?;

        let snapshot = self.replace(registrations);
        info!(
            "Refreshed {} registrations in {:?}",
            snapshot.len(),
            start.elapsed()
        );
        Ok(snapshot.len())
    }
}
