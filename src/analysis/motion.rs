//! Cursor Motion Kinematics
//!
//! Derives velocity, acceleration, and direction sequences incrementally from
//! raw pointer samples. One sampler instance owns one trial's trace; a new
//! trial starts from a reset sampler, never a reused trace.

use crate::capture::types::Point;
use crate::time::clock::Timestamp;
use serde::{Deserialize, Serialize};

/// Derived kinematic sequences for one trial.
///
/// Invariant: `accelerations.len() == velocities.len().saturating_sub(1)`.
/// Angles are in degrees as given by `atan2(dy, dx)` and are appended only
/// for events with a positive time delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionTrace {
    /// Instantaneous speeds (pixels/second)
    pub velocities: Vec<f64>,
    /// Speed deltas over time (pixels/second²)
    pub accelerations: Vec<f64>,
    /// Movement directions (degrees)
    pub angles: Vec<f64>,
}

impl MotionTrace {
    /// True when no derived quantity has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty() && self.accelerations.is_empty() && self.angles.is_empty()
    }
}

/// Incremental kinematics over a stream of pointer events.
#[derive(Debug, Default)]
pub struct MotionSampler {
    trace: MotionTrace,
    last: Option<(Point, Timestamp)>,
    discarded: u64,
}

impl MotionSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one pointer-move event.
    ///
    /// The first event only establishes the reference point. Every later
    /// event with a positive time delta appends a velocity, an angle, and
    /// (from the second velocity on) an acceleration. Events with a
    /// non-positive delta are discarded and do not move the reference point,
    /// so out-of-order or duplicate timestamps cannot corrupt later deltas.
    pub fn ingest(&mut self, point: Point, at: Timestamp) {
        let Some((last_point, last_time)) = self.last else {
            self.last = Some((point, at));
            return;
        };

        if !at.is_after(last_time) {
            self.discarded += 1;
            tracing::debug!(
                at = at.as_nanos(),
                last = last_time.as_nanos(),
                "discarding pointer event with non-positive time delta"
            );
            return;
        }

        let dt = at.duration_since(last_time).as_secs_f64();
        let dx = point.x - last_point.x;
        let dy = point.y - last_point.y;
        let distance = (dx * dx + dy * dy).sqrt();

        let velocity = distance / dt;
        self.trace.velocities.push(velocity);

        if self.trace.velocities.len() > 1 {
            let previous = self.trace.velocities[self.trace.velocities.len() - 2];
            self.trace.accelerations.push((velocity - previous) / dt);
        }

        self.trace.angles.push(dy.atan2(dx).to_degrees());

        self.last = Some((point, at));
    }

    /// The accumulated trace.
    pub fn trace(&self) -> &MotionTrace {
        &self.trace
    }

    /// Events dropped for non-positive time deltas since the last reset.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Clear all sequences and the reference point. Called once at the start
    /// of every trial.
    pub fn reset(&mut self) {
        self.trace = MotionTrace::default();
        self.last = None;
        self.discarded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_first_event_produces_nothing() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(50.0, 50.0), ts(0.0));

        assert!(sampler.trace().is_empty());
        assert_eq!(sampler.discarded(), 0);
    }

    #[test]
    fn test_right_angle_path() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(1.0));
        sampler.ingest(Point::new(10.0, 10.0), ts(2.0));

        let trace = sampler.trace();
        assert_eq!(trace.velocities.len(), 2);
        assert_close(trace.velocities[0], 10.0);
        assert_close(trace.velocities[1], 10.0);

        assert_eq!(trace.accelerations.len(), 1);
        assert_close(trace.accelerations[0], 0.0);

        assert_eq!(trace.angles.len(), 2);
        assert_close(trace.angles[0], 0.0);
        assert_close(trace.angles[1], 90.0);
    }

    #[test]
    fn test_diagonal_velocity() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(3.0, 4.0), ts(1.0));

        let trace = sampler.trace();
        assert_close(trace.velocities[0], 5.0);
    }

    #[test]
    fn test_acceleration_from_velocity_change() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(1.0));
        sampler.ingest(Point::new(30.0, 0.0), ts(2.0));

        let trace = sampler.trace();
        assert_close(trace.velocities[0], 10.0);
        assert_close(trace.velocities[1], 20.0);
        assert_eq!(trace.accelerations.len(), 1);
        assert_close(trace.accelerations[0], 10.0);
    }

    #[test]
    fn test_angle_quadrants() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(1.0, 1.0), ts(1.0));
        sampler.ingest(Point::new(0.0, 1.0), ts(2.0));
        sampler.ingest(Point::new(0.0, 0.0), ts(3.0));

        let trace = sampler.trace();
        assert_close(trace.angles[0], 45.0);
        assert_close(trace.angles[1], 180.0);
        assert_close(trace.angles[2], -90.0);
    }

    #[test]
    fn test_acceleration_length_invariant() {
        let mut sampler = MotionSampler::new();
        for i in 0..50 {
            let x = (i as f64 * 0.3).sin() * 100.0;
            let y = (i as f64 * 0.2).cos() * 80.0;
            sampler.ingest(Point::new(x, y), ts(i as f64 * 0.016));

            let trace = sampler.trace();
            assert_eq!(
                trace.accelerations.len(),
                trace.velocities.len().saturating_sub(1)
            );
            assert_eq!(trace.angles.len(), trace.velocities.len());
        }
    }

    #[test]
    fn test_duplicate_timestamp_discarded() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(1.0));
        sampler.ingest(Point::new(100.0, 0.0), ts(1.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(2.0));

        let trace = sampler.trace();
        // The duplicate was dropped without moving the reference point, so
        // the delta runs from (0,0) at t=1 to (10,0) at t=2.
        assert_eq!(trace.velocities.len(), 1);
        assert_close(trace.velocities[0], 10.0);
        assert_eq!(sampler.discarded(), 1);
    }

    #[test]
    fn test_out_of_order_timestamp_discarded() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(2.0));
        sampler.ingest(Point::new(50.0, 0.0), ts(1.0));

        assert!(sampler.trace().velocities.is_empty());
        assert_eq!(sampler.discarded(), 1);

        sampler.ingest(Point::new(20.0, 0.0), ts(4.0));
        let trace = sampler.trace();
        assert_eq!(trace.velocities.len(), 1);
        assert_close(trace.velocities[0], 10.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(1.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(1.0));
        assert!(!sampler.trace().is_empty());
        assert_eq!(sampler.discarded(), 1);

        sampler.reset();
        assert!(sampler.trace().is_empty());
        assert_eq!(sampler.discarded(), 0);

        // The reference point is gone too: the next event starts over
        sampler.ingest(Point::new(500.0, 500.0), ts(2.0));
        assert!(sampler.trace().velocities.is_empty());
    }

    #[test]
    fn test_trace_serialization() {
        let mut sampler = MotionSampler::new();
        sampler.ingest(Point::new(0.0, 0.0), ts(0.0));
        sampler.ingest(Point::new(10.0, 0.0), ts(1.0));

        let json = serde_json::to_string(sampler.trace()).unwrap();
        let back: MotionTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(*sampler.trace(), back);
    }
}
