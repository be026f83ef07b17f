//! Synthetic Pointer Source
//!
//! Drives the sampling pipeline without a windowing system: a dedicated
//! thread emits pointer samples along a deterministic trajectory at a fixed
//! cadence, pushing them into the lock-free transport. Two runs with the same
//! seed trace the same path; different seeds give visibly different motion
//! rhythm, which is what the similarity engine keys on.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{debug, info, trace};

use super::ring_buffer::SampleProducer;
use super::types::{CancelToken, Point, PointerSample};
use crate::time::{MonotonicClock, Timestamp};

/// Position along the seeded trajectory at time `t` seconds.
///
/// Lissajous-style sweep kept inside a 1280x800 frame. The seed perturbs
/// frequency, phase, and amplitude, so distinct seeds produce distinct
/// velocity and turning profiles.
pub fn trajectory_point(seed: u64, t: f64) -> Point {
    let fx = 0.4 + (seed % 5) as f64 * 0.13;
    let fy = 0.7 + (seed % 3) as f64 * 0.21;
    let phase = (seed % 11) as f64 * 0.5;
    let ax = 320.0 + (seed % 4) as f64 * 40.0;
    let ay = 220.0 + (seed % 6) as f64 * 20.0;
    Point::new(
        640.0 + ax * (TAU * fx * t + phase).sin(),
        400.0 + ay * (TAU * fy * t).sin(),
    )
}

/// Seeded pointer-sample generator running on its own thread.
pub struct SyntheticPointerSource {
    /// Thread handle for the emit loop
    thread_handle: Option<JoinHandle<()>>,
    /// Flag to signal stop
    running: Arc<AtomicBool>,
}

impl SyntheticPointerSource {
    pub fn new() -> Self {
        MonotonicClock::init();
        Self {
            thread_handle: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start emitting samples at `rate_hz` until stopped or `token` cancels.
    ///
    /// # Errors
    /// Returns an error if the source is already running or the rate is zero.
    pub fn start(
        &mut self,
        mut producer: SampleProducer,
        token: CancelToken,
        rate_hz: u32,
        seed: u64,
    ) -> Result<(), crate::Error> {
        if rate_hz == 0 {
            return Err(crate::Error::Capture("pointer rate must be positive".into()));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(crate::Error::Capture("Pointer source already running".into()));
        }

        let running = Arc::clone(&self.running);
        let period = StdDuration::from_secs_f64(1.0 / rate_hz as f64);

        let handle = thread::Builder::new()
            .name("pointer-source".into())
            .spawn(move || {
                let mut tick: u64 = 0;
                while running.load(Ordering::Relaxed) && !token.is_cancelled() {
                    let t = tick as f64 / rate_hz as f64;
                    let point = trajectory_point(seed, t);
                    let sample = PointerSample::new(point.x, point.y, Timestamp::now());
                    if !producer.push(sample) {
                        trace!("Sample ring full, dropping pointer sample");
                    }
                    tick += 1;
                    thread::sleep(period);
                }
                debug!(ticks = tick, "pointer source loop exited");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                crate::Error::Capture(format!("Failed to spawn pointer source thread: {}", e))
            })?;

        self.thread_handle = Some(handle);
        info!(rate_hz, seed, "pointer source started");
        Ok(())
    }

    /// Stop emitting and wait for the thread to exit.
    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("pointer source stopping");
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the source has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticPointerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SyntheticPointerSource {
    fn drop(&mut self) {
        self.stop();
    }
}
