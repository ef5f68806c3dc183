//! Boundary lifecycle of the upcoming block switch.
//!
//! The tracker only accepts the listed transitions; anything else forces
//! the absorbing `FailedTerminal` state. Only `Live` may loop back to
//! `None` or open the next boundary as `Planned`.

/// States of the upcoming-boundary lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    None,
    Planned,
    PreloadIssued,
    SwitchScheduled,
    SwitchIssued,
    Live,
    FailedTerminal,
}

impl BoundaryState {
    fn may_transition_to(self, to: BoundaryState) -> bool {
        use BoundaryState::*;
        matches!(
            (self, to),
            (None, Planned)
                | (Planned, PreloadIssued)
                | (PreloadIssued, SwitchScheduled)
                | (SwitchScheduled, SwitchIssued)
                | (SwitchIssued, Live)
                | (Live, None)
                | (Live, Planned)
        )
    }

    /// States that may fail to terminal (everything but terminal itself).
    fn may_fail(self) -> bool {
        self != BoundaryState::FailedTerminal
    }
}

/// A rejected transition; the tracker is now terminal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal boundary transition {from:?} -> {to:?}")]
pub struct BoundaryFault {
    pub from: BoundaryState,
    pub to: BoundaryState,
}

/// Tracks the boundary state for one session.
#[derive(Debug)]
pub struct BoundaryTracker {
    state: BoundaryState,
    fault: Option<BoundaryFault>,
}

impl Default for BoundaryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryTracker {
    pub fn new() -> Self {
        Self {
            state: BoundaryState::None,
            fault: None,
        }
    }

    #[cfg(test)]
    fn at(state: BoundaryState) -> Self {
        Self { state, fault: None }
    }

    pub fn state(&self) -> BoundaryState {
        self.state
    }

    pub fn fault(&self) -> Option<&BoundaryFault> {
        self.fault.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state == BoundaryState::FailedTerminal
    }

    /// Request a transition. An illegal request forces `FailedTerminal`,
    /// which absorbs every further request.
    pub fn request(&mut self, to: BoundaryState) -> Result<(), BoundaryFault> {
        if self.state == BoundaryState::FailedTerminal {
            return Err(BoundaryFault {
                from: self.state,
                to,
            });
        }
        if to == BoundaryState::FailedTerminal && self.state.may_fail() {
            self.state = BoundaryState::FailedTerminal;
            return Ok(());
        }
        if self.state.may_transition_to(to) {
            self.state = to;
            return Ok(());
        }
        let fault = BoundaryFault {
            from: self.state,
            to,
        };
        tracing::error!(%fault, "boundary lifecycle violated; channel is terminal");
        self.state = BoundaryState::FailedTerminal;
        self.fault = Some(fault.clone());
        Err(fault)
    }

    /// Record an execution failure, absorbing the state.
    pub fn fail(&mut self, reason: &str) {
        if self.state != BoundaryState::FailedTerminal {
            tracing::error!(reason, from = ?self.state, "boundary failed to terminal");
            self.state = BoundaryState::FailedTerminal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BoundaryState::*;

    #[test]
    fn allowed_transitions_succeed() {
        let cases = [
            (None, Planned),
            (Planned, PreloadIssued),
            (PreloadIssued, SwitchScheduled),
            (SwitchScheduled, SwitchIssued),
            (SwitchIssued, Live),
            (Live, None),
            (Live, Planned),
        ];
        for (from, to) in cases {
            let mut tracker = BoundaryTracker::at(from);
            tracker.request(to).unwrap();
            assert_eq!(tracker.state(), to, "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn any_active_state_may_fail_to_terminal() {
        for from in [Planned, PreloadIssued, SwitchScheduled, SwitchIssued, Live] {
            let mut tracker = BoundaryTracker::at(from);
            tracker.request(FailedTerminal).unwrap();
            assert!(tracker.is_terminal(), "{from:?}");
        }
    }

    #[test]
    fn illegal_transitions_force_terminal() {
        let cases = [
            (None, SwitchIssued),
            (Planned, Live),
            (SwitchIssued, Planned),
            (Live, SwitchIssued),
        ];
        for (from, to) in cases {
            let mut tracker = BoundaryTracker::at(from);
            assert!(tracker.request(to).is_err(), "{from:?} -> {to:?}");
            assert!(tracker.is_terminal());
            assert!(tracker.fault().is_some());
        }
    }

    #[test]
    fn terminal_is_absorbing() {
        for to in [None, Planned, PreloadIssued, SwitchScheduled, SwitchIssued, Live, FailedTerminal] {
            let mut tracker = BoundaryTracker::at(FailedTerminal);
            assert!(tracker.request(to).is_err());
            assert_eq!(tracker.state(), FailedTerminal);
        }
    }

    #[test]
    fn live_opens_the_next_boundary() {
        let mut tracker = BoundaryTracker::at(Live);
        tracker.request(None).unwrap();
        assert_eq!(tracker.state(), None);

        let mut tracker = BoundaryTracker::at(Live);
        tracker.request(Planned).unwrap();
        assert_eq!(tracker.state(), Planned);
    }

    #[test]
    fn full_session_cycle_walks_only_legal_edges() {
        let mut tracker = BoundaryTracker::new();
        for to in [Planned, PreloadIssued, SwitchScheduled, SwitchIssued, Live] {
            tracker.request(to).unwrap();
        }
        // Next boundary.
        for to in [Planned, PreloadIssued, SwitchScheduled, SwitchIssued, Live] {
            tracker.request(to).unwrap();
        }
        tracker.request(None).unwrap();
    }
}
