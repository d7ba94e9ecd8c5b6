//! Check-in session state machine.
//!
//! `Idle -> Selected` on a successful lookup, back to `Idle` on a new lookup
//! attempt, an explicit reset, or a successful vaccination save. Every
//! transition bumps a generation counter so responses started under an older
//! selection can be recognised and dropped.

/// Where the single check-in session currently stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Selected { citizen_id: String },
}

/// At most one live citizen selection
#[derive(Debug, Default)]
pub struct CheckInSession {
    state: SessionState,
    generation: u64,
}

impl CheckInSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Citizen id of the active selection
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        match &self.state {
            SessionState::Selected { citizen_id } => Some(citizen_id),
            SessionState::Idle => None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Selected { .. })
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no transition happened since `generation` was read
    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Drop any selection ahead of a new lookup; returns the new generation
    pub fn begin_lookup(&mut self) -> u64 {
        self.clear()
    }

    /// Select the citizen found by the lookup started at `generation`
    ///
    /// Ignored if another transition happened in between.
    pub fn select(&mut self, citizen_id: impl Into<String>, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state = SessionState::Selected {
            citizen_id: citizen_id.into(),
        };
        true
    }

    /// Back to `Idle`; returns the new generation
    pub fn clear(&mut self) -> u64 {
        self.state = SessionState::Idle;
        self.generation += 1;
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_cycle() {
        let mut session = CheckInSession::new();
        assert!(!session.is_active());

        let generation = session.begin_lookup();
        assert!(session.select("123", generation));
        assert_eq!(session.selected(), Some("123"));
        assert!(session.is_current(generation));

        session.clear();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(!session.is_current(generation));
    }

    #[test]
    fn test_stale_select_is_ignored() {
        let mut session = CheckInSession::new();
        let stale = session.begin_lookup();
        let fresh = session.begin_lookup();

        assert!(!session.select("111", stale));
        assert_eq!(session.selected(), None);
        assert!(session.select("222", fresh));
        assert_eq!(session.selected(), Some("222"));
    }

    #[test]
    fn test_new_lookup_discards_selection() {
        let mut session = CheckInSession::new();
        let generation = session.begin_lookup();
        session.select("123", generation);

        session.begin_lookup();
        assert_eq!(session.selected(), None);
    }
}
