use crate::core::models::Phase;
use tokio::task::JoinHandle;

struct Timer {
    id: u64,
    handle: JoinHandle<()>,
}

/// Mutable lifecycle of one poller, always accessed under its mutex.
pub(crate) struct PollState {
    pub(crate) armed: bool,
    pub(crate) phase: Phase,
    timer: Option<Timer>,
    next_timer_id: u64,
}

impl PollState {
    pub(crate) fn new() -> Self {
        Self {
            armed: false,
            phase: Phase::Inactive,
            timer: None,
            next_timer_id: 0,
        }
    }

    pub(crate) fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }

    /// Replaces any pending timer with the one returned by `spawn`, which
    /// receives the id the new timer must present to [`Self::release_timer`].
    pub(crate) fn arm_timer(&mut self, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.cancel_timer();
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        let id = self.next_timer_id;
        self.timer = Some(Timer {
            id,
            handle: spawn(id),
        });
    }

    /// Detaches a fired timer from the slot without aborting its task.
    ///
    /// Returns false when the slot no longer holds timer `id`, i.e. the timer
    /// was cancelled or replaced after it fired.
    pub(crate) fn release_timer(&mut self, id: u64) -> bool {
        match &self.timer {
            Some(timer) if timer.id == id => {
                self.timer = None;
                true
            }
            _ => false,
        }
    }

    /// Steps 1-3 of a poll cycle. Returns true when the caller must issue a
    /// request.
    pub(crate) fn begin_cycle(&mut self) -> bool {
        self.cancel_timer();

        if !self.armed {
            self.phase = Phase::Inactive;
            return false;
        }

        if self.phase == Phase::InFlight {
            return false;
        }

        self.phase = Phase::InFlight;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[test]
    fn test_initial_state() {
        let state = PollState::new();
        assert!(!state.armed);
        assert_eq!(state.phase, Phase::Inactive);
        assert!(!state.has_timer());
    }

    #[test]
    fn test_disarmed_cycle_goes_inactive() {
        let mut state = PollState::new();
        state.phase = Phase::Waiting;
        assert!(!state.begin_cycle());
        assert_eq!(state.phase, Phase::Inactive);
    }

    #[test]
    fn test_armed_cycle_goes_in_flight_once() {
        let mut state = PollState::new();
        state.armed = true;
        assert!(state.begin_cycle());
        assert_eq!(state.phase, Phase::InFlight);
        assert!(!state.begin_cycle());
        assert_eq!(state.phase, Phase::InFlight);
    }

    #[tokio::test]
    async fn test_arm_timer_replaces_pending_timer() {
        let mut state = PollState::new();
        state.arm_timer(|_| tokio::spawn(pending::<()>()));
        state.arm_timer(|id| {
            assert_eq!(id, 2);
            tokio::spawn(pending::<()>())
        });
        assert!(state.has_timer());

        // The first timer was dropped from the slot on replacement.
        assert!(!state.release_timer(1));
        assert!(state.release_timer(2));
        assert!(!state.has_timer());

        state.arm_timer(|_| tokio::spawn(pending::<()>()));
        state.cancel_timer();
        assert!(!state.has_timer());
        assert!(!state.release_timer(3));
    }
}
