//! Gaze Pump
//!
//! Camera-side sampling loop. Each iteration pulls one frame, runs face then
//! eye detection, and forwards the detected eye centers to the controller.
//! The trial's cancellation token is polled on every frame, so the loop exits
//! within one frame period of the window closing.
//!
//! Detection is behind traits so the pipeline runs against a scripted scene
//! in tests and simulation; a real camera backend plugs in the same way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{debug, info};

use super::types::{CancelToken, Point, Region};
use crate::session::TrialController;
use crate::time::{MonotonicClock, Timestamp};

/// One camera frame. Detection runs on the frame's identity; pixel data stays
/// inside the backend.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub index: u64,
    pub captured_at: Timestamp,
}

/// Produces camera frames in capture order.
pub trait FrameSource: Send {
    /// Next frame, or `None` once the stream ends.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Locates faces in a frame, in detector order.
pub trait FaceDetector: Send {
    fn detect_faces(&mut self, frame: &Frame) -> Vec<Region>;
}

/// Locates eyes within one face. Regions are relative to the face region's
/// origin.
pub trait EyeDetector: Send {
    fn detect_eyes(&mut self, frame: &Frame, face: &Region) -> Vec<Region>;
}

/// Eye centers for one frame: the first face carrying at least two eyes
/// contributes its first two eye centers, every other frame contributes
/// nothing.
pub fn extract_eye_centers<F, E>(frame: &Frame, faces: &mut F, eyes: &mut E) -> Vec<Point>
where
    F: FaceDetector + ?Sized,
    E: EyeDetector + ?Sized,
{
    for face in faces.detect_faces(frame) {
        let eye_regions = eyes.detect_eyes(frame, &face);
        if eye_regions.len() >= 2 {
            return vec![eye_regions[0].center(), eye_regions[1].center()];
        }
    }
    Vec::new()
}

/// Frame loop feeding gaze samples into a [`TrialController`].
pub struct GazePump {
    /// Thread handle for the frame loop
    thread_handle: Option<JoinHandle<()>>,
    /// Flag to signal stop
    running: Arc<AtomicBool>,
}

impl GazePump {
    pub fn new() -> Self {
        MonotonicClock::init();
        Self {
            thread_handle: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start pumping frames at `frame_rate_hz` until stopped, the token
    /// cancels, or the source runs dry.
    ///
    /// # Errors
    /// Returns an error if the pump is already running or the rate is zero.
    pub fn start<S, F, E>(
        &mut self,
        mut source: S,
        mut faces: F,
        mut eyes: E,
        controller: TrialController,
        token: CancelToken,
        frame_rate_hz: u32,
    ) -> Result<(), crate::Error>
    where
        S: FrameSource + 'static,
        F: FaceDetector + 'static,
        E: EyeDetector + 'static,
    {
        if frame_rate_hz == 0 {
            return Err(crate::Error::Capture("frame rate must be positive".into()));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(crate::Error::Capture("Gaze pump already running".into()));
        }

        let running = Arc::clone(&self.running);
        let period = StdDuration::from_secs_f64(1.0 / frame_rate_hz as f64);

        let handle = thread::Builder::new()
            .name("gaze-pump".into())
            .spawn(move || {
                let mut frames: u64 = 0;
                while running.load(Ordering::Relaxed) && !token.is_cancelled() {
                    let Some(frame) = source.next_frame() else {
                        debug!("frame source exhausted");
                        break;
                    };
                    let centers = extract_eye_centers(&frame, &mut faces, &mut eyes);
                    controller.ingest_gaze(&centers);
                    frames += 1;
                    thread::sleep(period);
                }
                debug!(frames, "gaze pump loop exited");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                crate::Error::Capture(format!("Failed to spawn gaze pump thread: {}", e))
            })?;

        self.thread_handle = Some(handle);
        info!(frame_rate_hz, "gaze pump started");
        Ok(())
    }

    /// Stop pumping and wait for the thread to exit.
    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("gaze pump stopping");
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the pump has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for GazePump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GazePump {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deterministic camera stand-in for simulation and tests.
///
/// Every frame carries one face with two eyes whose centers drift with a
/// seed-dependent rhythm. When `blink_every` is nonzero, every Nth frame
/// loses an eye and is rejected downstream, approximating blinks.
#[derive(Debug, Clone)]
pub struct ScriptedScene {
    seed: u64,
    blink_every: u64,
    frame_index: u64,
}

impl ScriptedScene {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            blink_every: 0,
            frame_index: 0,
        }
    }

    /// Reject every Nth frame by reporting a single eye.
    pub fn with_blink_every(mut self, blink_every: u64) -> Self {
        self.blink_every = blink_every;
        self
    }

    fn is_blink(&self, frame: &Frame) -> bool {
        self.blink_every != 0 && frame.index % self.blink_every == 0
    }

    fn drift(&self, frame: &Frame) -> f64 {
        let rate = 0.05 + (self.seed % 7) as f64 * 0.03;
        (frame.index as f64 * rate).sin() * 6.0
    }
}

impl FrameSource for ScriptedScene {
    fn next_frame(&mut self) -> Option<Frame> {
        self.frame_index += 1;
        Some(Frame {
            index: self.frame_index,
            captured_at: Timestamp::now(),
        })
    }
}

impl FaceDetector for ScriptedScene {
    fn detect_faces(&mut self, _frame: &Frame) -> Vec<Region> {
        vec![Region::new(160.0, 120.0, 320.0, 240.0)]
    }
}

impl EyeDetector for ScriptedScene {
    fn detect_eyes(&mut self, frame: &Frame, _face: &Region) -> Vec<Region> {
        let drift = self.drift(frame);
        let left = Region::new(60.0 + drift, 70.0, 40.0, 24.0);
        if self.is_blink(frame) {
            return vec![left];
        }
        let right = Region::new(180.0 + drift, 70.0, 40.0, 24.0);
        vec![left, right]
    }
}
