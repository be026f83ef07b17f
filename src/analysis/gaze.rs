//! Eye-Gaze Accumulation
//!
//! Accumulates one averaged eye-center position per qualifying camera frame.
//! Detection itself is an external collaborator; this sampler only applies
//! the two-eyes rule and averages what the detector reported.

use crate::capture::types::Point;
use serde::{Deserialize, Serialize};

/// Accumulated gaze positions for one trial, one per qualifying frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeTrace {
    pub points: Vec<Point>,
}

impl GazeTrace {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Per-frame gaze accumulator.
#[derive(Debug, Default)]
pub struct GazeSampler {
    trace: GazeTrace,
    rejected_frames: u64,
}

impl GazeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest the eye centers detected in one camera frame.
    ///
    /// A frame with at least two eye centers contributes their average
    /// position; anything less contributes nothing at all (an absence, not a
    /// zero entry).
    pub fn ingest(&mut self, eye_centers: &[Point]) {
        if eye_centers.len() < 2 {
            self.rejected_frames += 1;
            return;
        }

        let n = eye_centers.len() as f64;
        let avg_x = eye_centers.iter().map(|c| c.x).sum::<f64>() / n;
        let avg_y = eye_centers.iter().map(|c| c.y).sum::<f64>() / n;
        self.trace.points.push(Point::new(avg_x, avg_y));
    }

    /// The accumulated trace.
    pub fn trace(&self) -> &GazeTrace {
        &self.trace
    }

    /// Frames that yielded fewer than two eye centers since the last reset.
    pub fn rejected_frames(&self) -> u64 {
        self.rejected_frames
    }

    /// Clear the accumulated sequence.
    pub fn reset(&mut self) {
        self.trace = GazeTrace::default();
        self.rejected_frames = 0;
    }
}
