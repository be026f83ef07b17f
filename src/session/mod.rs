//! Session Module
//!
//! Orchestrates the two-trial authentication session from trial start to the
//! final decision, and the report format it is persisted as.

pub mod controller;
pub mod report;
pub mod timer;

pub use controller::{ActiveTrial, TrialController, TrialPhase, TrialResult, TrialStatus};
pub use report::{SessionMetadata, SessionReport};
pub use timer::TrialTimer;
