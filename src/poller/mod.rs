//! The recurring-poll state machine.
//!
//! A [`Poller`] moves between three phases:
//!
//! ```text
//! inactive --start()--> in-flight --(outcome)--> waiting --(timer)--> in-flight ...
//! ```
//!
//! The next request is scheduled `interval` after the previous outcome was
//! processed, never on a wall-clock grid. `stop()` cancels a pending timer
//! at once but lets an in-flight request finish and deliver its result.
//!
//! All state lives behind one mutex per instance. The lock is never held
//! across an `.await` or while a callback runs.
//!
//! Callbacks are not guarded: a panic inside `on_data` or `on_error` unwinds
//! the request task. The cycle is then abandoned, the poller is disarmed and
//! left inactive, and a later `start()` resumes polling.

mod builder;
mod state;

use crate::core::error::PollError;
use crate::core::models::{Decode, Payload, Phase};
use crate::transport::{HttpTransport, Transport};
use parking_lot::Mutex;
use state::PollState;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub use builder::PollerBuilder;

pub type DataHandler = Arc<dyn Fn(Payload) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(PollError) + Send + Sync>;

type TimerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Shared<T> {
    endpoint: String,
    decode: Decode,
    interval: Duration,
    one_shot: bool,
    on_data: DataHandler,
    on_error: ErrorHandler,
    transport: T,
    state: Mutex<PollState>,
}

/// Repeatedly fetches one endpoint and hands each payload to `on_data`.
///
/// Dropping the poller disarms it and cancels its pending timer.
pub struct Poller<T: Transport = HttpTransport> {
    shared: Arc<Shared<T>>,
}

impl Poller<HttpTransport> {
    pub fn builder() -> PollerBuilder<HttpTransport> {
        PollerBuilder::new()
    }
}

impl<T: Transport> Poller<T> {
    fn from_parts(
        endpoint: String,
        on_data: DataHandler,
        on_error: ErrorHandler,
        decode: Decode,
        interval: Duration,
        one_shot: bool,
        transport: T,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                endpoint,
                decode,
                interval,
                one_shot,
                on_data,
                on_error,
                transport,
                state: Mutex::new(PollState::new()),
            }),
        }
    }

    /// Arms the poller and issues a request right away.
    ///
    /// A pending timer is cancelled first. While a request is already in
    /// flight this only re-arms; the outstanding request schedules the next
    /// cycle when it completes.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(&self) {
        let should_fetch = {
            let mut state = self.shared.state.lock();
            state.armed = true;
            state.begin_cycle()
        };

        tracing::debug!(endpoint = %self.shared.endpoint, should_fetch, "Poller started");

        if should_fetch {
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move { shared.poll_once().await });
        }
    }

    /// Disarms the poller and cancels its pending timer.
    ///
    /// A request already in flight still completes and reaches `on_data` or
    /// `on_error`, but schedules nothing afterwards.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        if !state.armed && !state.has_timer() {
            return;
        }

        state.armed = false;
        state.cancel_timer();
        if state.phase == Phase::Waiting {
            state.phase = Phase::Inactive;
        }

        tracing::debug!(endpoint = %self.shared.endpoint, phase = %state.phase, "Poller stopped");
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    pub fn is_armed(&self) -> bool {
        self.shared.state.lock().armed
    }

    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    pub fn decode_mode(&self) -> Decode {
        self.shared.decode
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn is_one_shot(&self) -> bool {
        self.shared.one_shot
    }
}

impl<T: Transport> Drop for Poller<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T: Transport> Shared<T> {
    async fn poll_once(self: &Arc<Self>) {
        tracing::debug!(endpoint = %self.endpoint, "Issuing poll request");
        let mut cycle = CycleGuard {
            shared: self,
            completed: false,
        };

        let outcome = match self.transport.fetch(&self.endpoint).await {
            Ok(response) => response.decode(self.decode).map_err(PollError::from),
            Err(e) => Err(PollError::from(e)),
        };

        let delivered = match outcome {
            Ok(payload) => {
                (self.on_data)(payload);
                true
            }
            Err(error) => {
                tracing::warn!(endpoint = %self.endpoint, error = %error, "Poll request failed");
                (self.on_error)(error);
                false
            }
        };

        cycle.completed = true;
        self.finish_cycle(delivered);
    }

    /// Steps 4-5 of a poll cycle: one-shot disarm, then schedule or go idle.
    fn finish_cycle(self: &Arc<Self>, delivered: bool) {
        let mut state = self.state.lock();

        if self.one_shot && delivered {
            tracing::debug!(endpoint = %self.endpoint, "One-shot delivery complete");
            state.armed = false;
        }

        if state.armed {
            state.phase = Phase::Waiting;
            state.arm_timer(|id| tokio::spawn(Arc::clone(self).wait_then_poll(id)));
        } else {
            state.phase = Phase::Inactive;
        }
    }

    fn wait_then_poll(self: Arc<Self>, timer_id: u64) -> TimerFuture {
        Box::pin(async move {
            tokio::time::sleep(self.interval).await;

            let should_fetch = {
                let mut state = self.state.lock();
                if !state.release_timer(timer_id) {
                    return;
                }
                state.begin_cycle()
            };

            if should_fetch {
                self.poll_once().await;
            }
        })
    }
}

/// Resets an in-flight cycle that never reached `finish_cycle`, e.g. after a
/// callback panicked or the request task was dropped.
struct CycleGuard<'a, T: Transport> {
    shared: &'a Arc<Shared<T>>,
    completed: bool,
}

impl<T: Transport> Drop for CycleGuard<'_, T> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let mut state = self.shared.state.lock();
        state.armed = false;
        state.phase = Phase::Inactive;
        tracing::error!(
            endpoint = %self.shared.endpoint,
            "Poll cycle aborted before completion, poller disarmed"
        );
    }
}
