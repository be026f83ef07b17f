//! # Behavior Gate
//!
//! A two-trial behavioral verification engine that compares cursor kinematics
//! and gaze placement across timed trials and renders an accept/reject
//! decision.
//!
//! ## Overview
//!
//! This library captures pointer movement and per-frame eye centers during two
//! fixed-length trials. Each trial is condensed into a feature vector (mean
//! velocity, mean acceleration, direction spread, mean gaze position), and the
//! two vectors are compared by a configurable similarity engine. Matching
//! behavior across the trials accepts the session; divergent behavior rejects
//! it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use behavior_gate::app::Config;
//! use behavior_gate::capture::{Point, PointerSample};
//! use behavior_gate::session::TrialController;
//! use behavior_gate::time::{MonotonicClock, Timestamp};
//!
//! // Initialize the monotonic clock (required once)
//! MonotonicClock::init();
//!
//! // Build a controller from configuration
//! let config = Config::default();
//! let controller = TrialController::new(&config).expect("invalid config");
//!
//! // Open the first trial window and feed it captured samples
//! let _trial = controller.start_trial().expect("failed to start trial");
//! controller.ingest_pointer(PointerSample::new(640.0, 400.0, Timestamp::now()));
//! controller.ingest_gaze(&[Point::new(80.0, 82.0), Point::new(200.0, 82.0)]);
//!
//! // ... the trial timer closes the window; run the second trial the same way ...
//!
//! if let Some(decision) = controller.decision() {
//!     println!("accepted: {}", decision.accepted);
//! }
//! ```
//!
//! ## Architecture
//!
//! The system is organized into the following modules:
//!
//! - [`time`]: Monotonic timestamps and trial durations
//! - [`capture`]: Pointer and gaze sources with lock-free sample transport
//! - [`analysis`]: Kinematic and gaze sampling, feature vector extraction
//! - [`similarity`]: Vector comparison metrics and the accept decision
//! - [`session`]: Two-trial state machine, trial timers, and session reports
//! - [`app`]: CLI and configuration management
//!
//! ## Trial Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Pointer/Gaze│───▶│ Ring Buffer │───▶│  Samplers   │───▶│   Feature   │
//! │   Sources   │    │ (lock-free) │    │(motion+gaze)│    │   Vectors   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │◀───│  Decision   │◀───│ Similarity  │◀───│ Trial Pair  │
//! │   Report    │    │(accept/rej.)│    │   Engine    │    │ (features)  │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod time;
pub mod capture;
pub mod analysis;
pub mod similarity;
pub mod session;
pub mod app;

// Re-export commonly used types
pub use analysis::features::FeatureVector;
pub use app::config::Config;
pub use capture::types::{CancelToken, Point, PointerSample};
pub use session::{SessionReport, TrialController, TrialPhase};
pub use similarity::{Decision, SimilarityEngine, SimilarityMode};
pub use time::clock::MonotonicClock;

/// Result type alias for the behavior gate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the behavior gate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Session already decided; reset before starting another trial")]
    AlreadyDecided,

    #[error("Precondition not met: {0}")]
    Precondition(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
