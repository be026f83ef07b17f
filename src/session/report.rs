//! Session Report
//!
//! Serialization format for an authentication session: metadata, the
//! per-trial results, and the decision if one was reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::app::config::Config;
use crate::session::controller::{TrialController, TrialResult};
use crate::similarity::{Decision, SimilarityMode};

/// Current report format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMetadata {
    /// Unique session ID
    pub id: Uuid,
    /// Free-form session label
    pub label: String,
    /// When the report was created
    pub created_at: DateTime<Utc>,
    /// Trial window length the session ran with (seconds)
    pub trial_duration_secs: f64,
    /// Scoring strategy the session ran with
    pub similarity_mode: SimilarityMode,
    /// Version of the report format
    pub format_version: String,
}

impl SessionMetadata {
    /// Create metadata for a session running under `config`.
    pub fn new(label: String, config: &Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            created_at: Utc::now(),
            trial_duration_secs: config.trial.trial_duration_secs,
            similarity_mode: config.similarity.mode,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: String::new(),
            created_at: Utc::now(),
            trial_duration_secs: 0.0,
            similarity_mode: SimilarityMode::default(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

/// A complete record of one authentication session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: SessionMetadata,
    /// Completed trial results, in order
    pub trials: Vec<TrialResult>,
    /// Final decision, present once both trials completed
    pub decision: Option<Decision>,
}

impl SessionReport {
    /// Create a new empty report
    pub fn new(label: String, config: &Config) -> Self {
        Self {
            metadata: SessionMetadata::new(label, config),
            trials: Vec::new(),
            decision: None,
        }
    }

    /// Snapshot a controller's session into a report.
    pub fn from_controller(label: String, config: &Config, controller: &TrialController) -> Self {
        let mut report = Self::new(label, config);
        for index in 1..=2 {
            if let Some(result) = controller.trial_result(index) {
                report.trials.push(result);
            }
        }
        report.decision = controller.decision();
        report
    }

    /// Record a completed trial
    pub fn add_trial(&mut self, result: TrialResult) {
        self.trials.push(result);
    }

    /// Whether the session reached a decision
    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    /// Save report to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from a file.
    ///
    /// Logs a warning if the report was saved with an unknown format version,
    /// but still attempts to deserialize it (forward-compatible via `#[serde(default)]`).
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let report: SessionReport = serde_json::from_str(&content)?;
        if report.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                label = %report.metadata.label,
                found = %report.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "Report has different format version; some fields may use default values"
            );
        }
        Ok(report)
    }
}
