//! Trial Controller
//!
//! Drives the two-trial session state machine:
//!
//! ```text
//! IDLE ──start──▶ TRIAL_ACTIVE(1) ──timer──▶ AWAITING_SECOND
//!                                                  │
//!                                                start
//!                                                  ▼
//!              DECIDED ◀──timer── TRIAL_ACTIVE(2)
//! ```
//!
//! Each trial runs for a fixed window enforced by [`TrialTimer`]. When the
//! window closes the controller cancels the trial's sampling token, extracts
//! the feature vector from the accumulated traces, and either waits for the
//! second trial or scores the pair. `DECIDED` is terminal until `reset`.
//!
//! Samples that arrive outside an active trial are dropped without error.
//! A generation counter makes late timer fires and cancelled trials no-ops.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

use crate::analysis::{FeatureVector, GazeSampler, MotionSampler};
use crate::app::config::Config;
use crate::capture::types::{CancelToken, Point, PointerSample};
use crate::session::timer::TrialTimer;
use crate::similarity::{Decision, SimilarityEngine};
use crate::time::{Duration, Timestamp};

/// Phase of the two-trial session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    /// No trial has run yet.
    Idle,
    /// A trial window is open and accepting samples.
    TrialActive(u8),
    /// Trial 1 is complete; trial 2 has not started.
    AwaitingSecond,
    /// Both trials are complete and the decision is available. Terminal.
    Decided,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialStatus {
    pub phase: TrialPhase,
    /// Index of the active trial, or the number of completed trials when no
    /// trial is running.
    pub trial_index: u8,
    /// Time since the active trial started; zero when no trial is running.
    pub elapsed: Duration,
}

/// Outcome of one completed trial window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    /// 1 or 2.
    pub trial_index: u8,
    /// Features extracted when the window closed.
    pub features: FeatureVector,
    /// Velocity samples accumulated during the window.
    pub velocity_samples: usize,
    /// Gaze frames that produced a usable eye pair.
    pub gaze_frames: usize,
    /// Pointer events discarded for non-positive time deltas.
    pub discarded_pointer_events: u64,
    /// Camera frames rejected for carrying fewer than two eyes.
    pub rejected_gaze_frames: u64,
    /// Wall-clock completion time.
    pub completed_at: DateTime<Utc>,
}

/// Handle returned by `start_trial`.
///
/// The sampling token is cancelled when the trial window closes; capture
/// loops poll it every iteration and exit promptly.
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub index: u8,
    pub sampling_token: CancelToken,
}

struct ControllerState {
    phase: TrialPhase,
    /// Bumped on every transition; timer callbacks carry the generation they
    /// were armed under and ignore the fire when it no longer matches.
    generation: u64,
    motion: MotionSampler,
    gaze: GazeSampler,
    sampling_token: CancelToken,
    trial_started_at: Option<Timestamp>,
    results: [Option<TrialResult>; 2],
    decision: Option<Decision>,
}

impl ControllerState {
    fn fresh(generation: u64) -> Self {
        Self {
            phase: TrialPhase::Idle,
            generation,
            motion: MotionSampler::new(),
            gaze: GazeSampler::new(),
            sampling_token: CancelToken::new(),
            trial_started_at: None,
            results: [None, None],
            decision: None,
        }
    }
}

struct ControllerInner {
    state: Mutex<ControllerState>,
    /// Armed trial timer. Lock order is `state` first, then this slot; a
    /// taken timer is dropped (joined) outside both locks.
    timer: Mutex<Option<TrialTimer>>,
    engine: SimilarityEngine,
    trial_duration: Duration,
}

/// Orchestrates the two trials and renders the final decision.
///
/// Cloning is cheap and shares the session; capture loops typically hold a
/// clone and feed samples while the owner polls `status`.
#[derive(Clone)]
pub struct TrialController {
    inner: Arc<ControllerInner>,
}

impl TrialController {
    /// Build a controller from configuration. Fails fast on invalid values.
    pub fn new(config: &Config) -> crate::Result<Self> {
        config.trial.validate()?;
        let engine = SimilarityEngine::from_config(&config.similarity)?;
        Ok(Self {
            inner: Arc::new(ControllerInner {
                state: Mutex::new(ControllerState::fresh(0)),
                timer: Mutex::new(None),
                engine,
                trial_duration: config.trial.duration(),
            }),
        })
    }

    /// Open the next trial window and arm its timer.
    ///
    /// # Errors
    /// `InvalidState` if a trial is already running, `AlreadyDecided` once
    /// the session has reached its decision.
    pub fn start_trial(&self) -> crate::Result<ActiveTrial> {
        let (index, token, generation) = {
            let mut state = self.inner.state.lock();
            let index = match state.phase {
                TrialPhase::Idle => 1,
                TrialPhase::AwaitingSecond => 2,
                TrialPhase::TrialActive(running) => {
                    return Err(crate::Error::InvalidState(format!(
                        "trial {running} is already running"
                    )));
                }
                TrialPhase::Decided => return Err(crate::Error::AlreadyDecided),
            };

            state.generation += 1;
            state.motion.reset();
            state.gaze.reset();
            let token = CancelToken::new();
            state.sampling_token = token.clone();
            state.trial_started_at = Some(Timestamp::now());
            state.phase = TrialPhase::TrialActive(index);
            (index, token, state.generation)
        };

        let weak = Arc::downgrade(&self.inner);
        let timer = TrialTimer::arm(self.inner.trial_duration, move || {
            if let Some(inner) = weak.upgrade() {
                inner.complete_active_trial(generation);
            }
        });
        let timer = match timer {
            Ok(timer) => timer,
            Err(e) => {
                // Roll the transition back so the session stays usable.
                let mut state = self.inner.state.lock();
                if state.generation == generation {
                    token.cancel();
                    state.trial_started_at = None;
                    state.phase = if index == 1 {
                        TrialPhase::Idle
                    } else {
                        TrialPhase::AwaitingSecond
                    };
                }
                return Err(e);
            }
        };
        // Hand the timer to the session only while this trial is still the
        // live generation; an interleaved cancel or reset owns the slot and
        // this window is already closed.
        let replaced = {
            let state = self.inner.state.lock();
            if state.generation == generation {
                self.inner.timer.lock().replace(timer)
            } else {
                Some(timer)
            }
        };
        drop(replaced);

        info!(
            trial = index,
            duration_ms = self.inner.trial_duration.as_millis(),
            "trial started"
        );
        Ok(ActiveTrial {
            index,
            sampling_token: token,
        })
    }

    /// Feed one pointer sample. Dropped silently outside an active trial.
    pub fn ingest_pointer(&self, sample: PointerSample) {
        let mut state = self.inner.state.lock();
        if !matches!(state.phase, TrialPhase::TrialActive(_)) {
            trace!("pointer sample outside active trial dropped");
            return;
        }
        state.motion.ingest(sample.point(), sample.timestamp);
    }

    /// Feed one camera frame's eye centers. Dropped silently outside an
    /// active trial; frames with fewer than two centers are counted and
    /// contribute nothing.
    pub fn ingest_gaze(&self, eye_centers: &[Point]) {
        let mut state = self.inner.state.lock();
        if !matches!(state.phase, TrialPhase::TrialActive(_)) {
            trace!("gaze frame outside active trial dropped");
            return;
        }
        state.gaze.ingest(eye_centers);
    }

    /// Current phase, trial index, and elapsed time in the open window.
    pub fn status(&self) -> TrialStatus {
        let state = self.inner.state.lock();
        let (trial_index, elapsed) = match (state.phase, state.trial_started_at) {
            (TrialPhase::TrialActive(index), Some(started)) => {
                (index, Timestamp::now().duration_since(started))
            }
            _ => {
                let completed = state.results.iter().filter(|r| r.is_some()).count() as u8;
                (completed, Duration::ZERO)
            }
        };
        TrialStatus {
            phase: state.phase,
            trial_index,
            elapsed,
        }
    }

    /// The decision, if both trials have completed.
    pub fn decision(&self) -> Option<Decision> {
        self.inner.state.lock().decision
    }

    /// The decision, or an error naming the unmet precondition.
    pub fn final_decision(&self) -> crate::Result<Decision> {
        self.inner.state.lock().decision.ok_or_else(|| {
            crate::Error::Precondition("cannot compare before both trials complete".into())
        })
    }

    /// Result of a completed trial (`index` is 1 or 2), if available.
    pub fn trial_result(&self, index: u8) -> Option<TrialResult> {
        if !(1..=2).contains(&index) {
            return None;
        }
        self.inner.state.lock().results[(index - 1) as usize].clone()
    }

    /// Abort the active trial, discarding its samples.
    ///
    /// Cancelling trial 1 returns to `Idle`; cancelling trial 2 returns to
    /// `AwaitingSecond` with trial 1's result retained. No-op when no trial
    /// is running, including when the timer won the race and the trial
    /// completed normally.
    pub fn cancel(&self) {
        let timer = {
            let mut state = self.inner.state.lock();
            let timer = self.inner.timer.lock().take();
            state.generation += 1;
            match state.phase {
                TrialPhase::TrialActive(index) => {
                    state.sampling_token.cancel();
                    state.motion.reset();
                    state.gaze.reset();
                    state.trial_started_at = None;
                    state.phase = if index == 1 {
                        TrialPhase::Idle
                    } else {
                        TrialPhase::AwaitingSecond
                    };
                    info!(trial = index, "trial cancelled");
                }
                _ => debug!("cancel without an active trial ignored"),
            }
            timer
        };
        // Joined outside the state lock; a concurrently firing callback
        // needs that lock to observe its now-stale generation.
        drop(timer);
    }

    /// Discard the whole session and return to `Idle`.
    pub fn reset(&self) {
        let timer = {
            let mut state = self.inner.state.lock();
            let timer = self.inner.timer.lock().take();
            state.sampling_token.cancel();
            let generation = state.generation + 1;
            *state = ControllerState::fresh(generation);
            info!("session reset");
            timer
        };
        drop(timer);
    }
}

impl ControllerInner {
    /// Timer callback: close the trial window that `generation` belongs to.
    fn complete_active_trial(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(generation, "stale trial timer fire ignored");
            return;
        }
        let TrialPhase::TrialActive(index) = state.phase else {
            return;
        };

        // Stop the capture loops feeding this trial, then extract under the
        // same lock hold so nothing slips in between.
        state.sampling_token.cancel();
        let features = FeatureVector::from_traces(state.motion.trace(), state.gaze.trace());
        let result = TrialResult {
            trial_index: index,
            features,
            velocity_samples: state.motion.trace().velocities.len(),
            gaze_frames: state.gaze.trace().len(),
            discarded_pointer_events: state.motion.discarded(),
            rejected_gaze_frames: state.gaze.rejected_frames(),
            completed_at: Utc::now(),
        };
        info!(
            trial = index,
            velocity_samples = result.velocity_samples,
            gaze_frames = result.gaze_frames,
            discarded = result.discarded_pointer_events,
            "trial completed"
        );
        state.results[(index - 1) as usize] = Some(result);
        state.trial_started_at = None;
        state.generation += 1;

        if index == 1 {
            state.phase = TrialPhase::AwaitingSecond;
            return;
        }

        let pair = match (&state.results[0], &state.results[1]) {
            (Some(first), Some(second)) => Some((first.features, second.features)),
            _ => None,
        };
        match pair {
            Some((first, second)) => {
                let decision = self.engine.compare(&first, &second);
                info!(
                    accepted = decision.accepted,
                    overall = decision.overall_similarity,
                    "session decided"
                );
                state.decision = Some(decision);
                state.phase = TrialPhase::Decided;
            }
            None => {
                error!("trial 2 completed without a stored trial 1 result");
                state.phase = TrialPhase::AwaitingSecond;
            }
        }
    }
}
