//! Trace accumulation and feature extraction
//!
//! This module turns raw sample streams into comparable trial summaries:
//! - Incremental cursor kinematics (velocity, acceleration, direction)
//! - Per-frame gaze position accumulation
//! - Reduction of both traces into a fixed-arity feature vector

pub mod features;
pub mod gaze;
pub mod motion;

pub use features::{FeatureVector, FEATURE_ARITY};
pub use gaze::{GazeSampler, GazeTrace};
pub use motion::{MotionSampler, MotionTrace};
