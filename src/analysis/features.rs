//! Feature Extraction
//!
//! Reduces one trial's motion and gaze traces into a fixed-arity numeric
//! summary. Extraction is pure and stateless: the same traces always produce
//! bit-identical vectors, and empty sequences contribute a defined zero
//! rather than an error or a missing slot.

use super::gaze::GazeTrace;
use super::motion::MotionTrace;
use serde::{Deserialize, Serialize};

/// Number of elements in a feature vector.
pub const FEATURE_ARITY: usize = 5;

/// Fixed-arity summary of one completed trial:
/// `[mean velocity, mean acceleration, angle stddev, mean gaze x, mean gaze y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub mean_velocity: f64,
    pub mean_acceleration: f64,
    /// Population standard deviation of the movement angles
    pub angle_stddev: f64,
    pub mean_gaze_x: f64,
    pub mean_gaze_y: f64,
}

impl FeatureVector {
    /// The vector of an empty trial.
    pub const ZERO: FeatureVector = FeatureVector {
        mean_velocity: 0.0,
        mean_acceleration: 0.0,
        angle_stddev: 0.0,
        mean_gaze_x: 0.0,
        mean_gaze_y: 0.0,
    };

    /// Extract the feature vector from a trial's traces.
    pub fn from_traces(motion: &MotionTrace, gaze: &GazeTrace) -> Self {
        let (mean_gaze_x, mean_gaze_y) = if gaze.points.is_empty() {
            (0.0, 0.0)
        } else {
            let n = gaze.points.len() as f64;
            (
                gaze.points.iter().map(|p| p.x).sum::<f64>() / n,
                gaze.points.iter().map(|p| p.y).sum::<f64>() / n,
            )
        };

        Self {
            mean_velocity: mean(&motion.velocities),
            mean_acceleration: mean(&motion.accelerations),
            angle_stddev: population_stddev(&motion.angles),
            mean_gaze_x,
            mean_gaze_y,
        }
    }

    /// All five elements in order.
    pub fn as_array(&self) -> [f64; FEATURE_ARITY] {
        [
            self.mean_velocity,
            self.mean_acceleration,
            self.angle_stddev,
            self.mean_gaze_x,
            self.mean_gaze_y,
        ]
    }

    /// The 3-element motion sub-vector.
    pub fn motion(&self) -> [f64; 3] {
        [self.mean_velocity, self.mean_acceleration, self.angle_stddev]
    }

    /// The 2-element gaze sub-vector.
    pub fn gaze(&self) -> [f64; 2] {
        [self.mean_gaze_x, self.mean_gaze_y]
    }
}

/// Arithmetic mean, zero for an empty slice.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation, zero for an empty slice.
fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::Point;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[4.0]), 4.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_population_stddev() {
        assert_eq!(population_stddev(&[]), 0.0);
        assert_eq!(population_stddev(&[7.0]), 0.0);
        assert_eq!(population_stddev(&[5.0, 5.0, 5.0]), 0.0);
        // Angles 0 and 90: deviations of 45 each
        assert!((population_stddev(&[0.0, 90.0]) - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_traces_extract_to_zero() {
        let vector = FeatureVector::from_traces(&MotionTrace::default(), &GazeTrace::default());
        assert_eq!(vector, FeatureVector::ZERO);
        assert_eq!(vector.as_array(), [0.0; FEATURE_ARITY]);
    }

    #[test]
    fn test_extraction_values() {
        let motion = MotionTrace {
            velocities: vec![10.0, 10.0],
            accelerations: vec![0.0],
            angles: vec![0.0, 90.0],
        };
        let gaze = GazeTrace {
            points: vec![Point::new(1.0, 1.0), Point::new(3.0, 3.0)],
        };

        let vector = FeatureVector::from_traces(&motion, &gaze);
        assert_eq!(vector.mean_velocity, 10.0);
        assert_eq!(vector.mean_acceleration, 0.0);
        assert!((vector.angle_stddev - 45.0).abs() < 1e-12);
        assert_eq!(vector.mean_gaze_x, 2.0);
        assert_eq!(vector.mean_gaze_y, 2.0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let motion = MotionTrace {
            velocities: vec![3.7, 12.1, 9.9],
            accelerations: vec![8.4, -2.2],
            angles: vec![14.0, -170.5, 98.0],
        };
        let gaze = GazeTrace {
            points: vec![Point::new(311.2, 242.8)],
        };

        let first = FeatureVector::from_traces(&motion, &gaze);
        let second = FeatureVector::from_traces(&motion, &gaze);
        assert_eq!(first.as_array(), second.as_array());
    }

    #[test]
    fn test_partial_emptiness() {
        // Motion data but no gaze frames: gaze slots are zero, not absent
        let motion = MotionTrace {
            velocities: vec![5.0],
            accelerations: vec![],
            angles: vec![30.0],
        };
        let vector = FeatureVector::from_traces(&motion, &GazeTrace::default());

        assert_eq!(vector.mean_velocity, 5.0);
        assert_eq!(vector.mean_acceleration, 0.0);
        assert_eq!(vector.angle_stddev, 0.0);
        assert_eq!(vector.gaze(), [0.0, 0.0]);
    }

    #[test]
    fn test_sub_vectors() {
        let vector = FeatureVector {
            mean_velocity: 1.0,
            mean_acceleration: 2.0,
            angle_stddev: 3.0,
            mean_gaze_x: 4.0,
            mean_gaze_y: 5.0,
        };
        assert_eq!(vector.motion(), [1.0, 2.0, 3.0]);
        assert_eq!(vector.gaze(), [4.0, 5.0]);
        assert_eq!(vector.as_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_serialization_round_trip() {
        let vector = FeatureVector {
            mean_velocity: 12.5,
            mean_acceleration: -3.25,
            angle_stddev: 44.0,
            mean_gaze_x: 120.0,
            mean_gaze_y: 90.0,
        };
        let json = serde_json::to_string(&vector).unwrap();
        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(vector, back);
    }
}
