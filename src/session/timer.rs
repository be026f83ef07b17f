//! Trial Timer
//!
//! One-shot timer that runs a callback on a dedicated thread after a fixed
//! delay. Cancellation wakes the thread immediately, and a cancelled timer
//! never fires.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::debug;

use crate::time::Duration;

struct TimerState {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

/// One-shot timer backing the trial window.
///
/// Exactly one of two things happens: the callback runs once after the delay,
/// or `cancel` wins and the callback never runs.
pub struct TrialTimer {
    state: Arc<TimerState>,
    handle: Option<JoinHandle<()>>,
}

impl TrialTimer {
    /// Arm the timer. `callback` runs on the timer thread once `delay`
    /// elapses, unless the timer is cancelled first.
    pub fn arm<F>(delay: Duration, callback: F) -> crate::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(TimerState {
            cancelled: Mutex::new(false),
            signal: Condvar::new(),
        });
        let thread_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("trial-timer".into())
            .spawn(move || {
                let deadline = Instant::now() + delay.as_std();
                let mut cancelled = thread_state.cancelled.lock();
                // Loop to absorb spurious wakeups.
                while !*cancelled {
                    if thread_state
                        .signal
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                let fire = !*cancelled;
                drop(cancelled);

                if fire {
                    callback();
                } else {
                    debug!("trial timer cancelled before firing");
                }
            })
            .map_err(|e| {
                crate::Error::Session(format!("Failed to spawn trial timer thread: {e}"))
            })?;

        Ok(Self {
            state,
            handle: Some(handle),
        })
    }

    /// Cancel the timer and wait for its thread to exit. Blocks until the
    /// callback returns if it is already running. When called from the timer
    /// thread itself the join is skipped. Idempotent.
    pub fn cancel(&mut self) {
        {
            let mut cancelled = self.state.cancelled.lock();
            *cancelled = true;
            self.state.signal.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            // A callback may drop its own timer from the timer thread; that
            // thread is already past its wait, so only join from outside it.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for TrialTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
