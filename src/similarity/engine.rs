//! Similarity Engine
//!
//! Scores a pair of trial feature vectors and renders the accept/reject
//! decision. Three scoring strategies are supported:
//! - `mse`: MSE similarity on the motion and gaze sub-vectors, fused by weight
//! - `cosine_motion_plus_mse_eye`: cosine on motion, MSE similarity on gaze,
//!   fused by weight
//! - `motion_only_mse`: raw MSE over the motion sub-vector against a fixed
//!   threshold, gaze ignored

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::FeatureVector;
use crate::app::config::SimilarityConfig;
use crate::similarity::metrics::{cosine_similarity, mean_squared_error, mse_similarity};

/// Scoring strategy for comparing the two trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// MSE similarity on motion and gaze sub-vectors, fused by weight.
    #[default]
    Mse,
    /// Cosine similarity on motion, MSE similarity on gaze, fused by weight.
    CosineMotionPlusMseEye,
    /// Raw motion MSE against a fixed threshold. Gaze plays no part and the
    /// decision carries the error itself, so lower is better.
    MotionOnlyMse,
}

impl SimilarityMode {
    /// Canonical config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMode::Mse => "mse",
            SimilarityMode::CosineMotionPlusMseEye => "cosine_motion_plus_mse_eye",
            SimilarityMode::MotionOnlyMse => "motion_only_mse",
        }
    }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mse" => Ok(SimilarityMode::Mse),
            "cosine_motion_plus_mse_eye" => Ok(SimilarityMode::CosineMotionPlusMseEye),
            "motion_only_mse" => Ok(SimilarityMode::MotionOnlyMse),
            other => Err(crate::Error::Config(format!(
                "unknown similarity mode '{other}', expected one of: mse, \
                 cosine_motion_plus_mse_eye, motion_only_mse"
            ))),
        }
    }
}

/// Outcome of comparing the two trial feature vectors.
///
/// For the fused modes the scores are percent-like (identical trials score
/// 100). Under `motion_only_mse` the mouse and overall fields carry the raw
/// MSE instead, and `eye_similarity` is always zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Decision {
    /// Motion score.
    pub mouse_similarity: f64,
    /// Gaze score.
    pub eye_similarity: f64,
    /// Fused score that was compared against the accept threshold.
    pub overall_similarity: f64,
    /// Whether both trials are attributed to the same person.
    pub accepted: bool,
    /// Strategy that produced this decision.
    pub mode: SimilarityMode,
}

/// Compares feature vectors under a configured scoring strategy.
///
/// Construction validates the configuration, so a built engine can score
/// without further checks.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    mode: SimilarityMode,
    mse_scale: f64,
    mouse_weight: f64,
    eye_weight: f64,
    accept_threshold: f64,
    motion_mse_threshold: f64,
}

impl SimilarityEngine {
    /// Build an engine from configuration, rejecting invalid values up front.
    pub fn from_config(config: &SimilarityConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            mode: config.mode,
            mse_scale: config.mse_scale,
            mouse_weight: config.mouse_weight,
            eye_weight: config.eye_weight,
            accept_threshold: config.accept_threshold,
            motion_mse_threshold: config.motion_mse_threshold,
        })
    }

    pub fn mode(&self) -> SimilarityMode {
        self.mode
    }

    /// Score `second` against `first`. Symmetric for every mode.
    pub fn compare(&self, first: &FeatureVector, second: &FeatureVector) -> Decision {
        let decision = match self.mode {
            SimilarityMode::Mse => {
                let mouse = mse_similarity(&first.motion(), &second.motion(), self.mse_scale);
                let eye = mse_similarity(&first.gaze(), &second.gaze(), self.mse_scale);
                self.fuse(mouse, eye)
            }
            SimilarityMode::CosineMotionPlusMseEye => {
                let mouse = cosine_similarity(&first.motion(), &second.motion());
                let eye = mse_similarity(&first.gaze(), &second.gaze(), self.mse_scale);
                self.fuse(mouse, eye)
            }
            SimilarityMode::MotionOnlyMse => {
                let mse = mean_squared_error(&first.motion(), &second.motion());
                Decision {
                    mouse_similarity: mse,
                    eye_similarity: 0.0,
                    overall_similarity: mse,
                    accepted: mse < self.motion_mse_threshold,
                    mode: self.mode,
                }
            }
        };
        tracing::debug!(
            mode = %self.mode,
            mouse = decision.mouse_similarity,
            eye = decision.eye_similarity,
            overall = decision.overall_similarity,
            accepted = decision.accepted,
            "compared trial feature vectors"
        );
        decision
    }

    fn fuse(&self, mouse: f64, eye: f64) -> Decision {
        let overall = self.mouse_weight * mouse + self.eye_weight * eye;
        Decision {
            mouse_similarity: mouse,
            eye_similarity: eye,
            overall_similarity: overall,
            accepted: overall >= self.accept_threshold,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: [f64; 5]) -> FeatureVector {
        FeatureVector {
            mean_velocity: values[0],
            mean_acceleration: values[1],
            angle_stddev: values[2],
            mean_gaze_x: values[3],
            mean_gaze_y: values[4],
        }
    }

    fn engine(mode: SimilarityMode) -> SimilarityEngine {
        let config = SimilarityConfig {
            mode,
            ..SimilarityConfig::default()
        };
        SimilarityEngine::from_config(&config).unwrap()
    }

    #[test]
    fn test_mse_identical_vectors_accepted_at_100() {
        let engine = engine(SimilarityMode::Mse);
        let v = vector([5.0, 0.0, 10.0, 0.0, 0.0]);

        let decision = engine.compare(&v, &v);

        assert_eq!(decision.mouse_similarity, 100.0);
        assert_eq!(decision.eye_similarity, 100.0);
        assert_eq!(decision.overall_similarity, 100.0);
        assert!(decision.accepted);
        assert_eq!(decision.mode, SimilarityMode::Mse);
    }

    #[test]
    fn test_mse_close_vectors_accepted() {
        let engine = engine(SimilarityMode::Mse);
        let first = vector([10.0, 0.0, 0.0, 50.0, 50.0]);
        let second = vector([20.0, 0.0, 0.0, 50.0, 50.0]);

        let decision = engine.compare(&first, &second);

        // Motion MSE is 100/3, so 100 - (100/3)/5 for mouse; gaze matches.
        let expected_mouse = 100.0 - (100.0 / 3.0) / 5.0;
        assert!((decision.mouse_similarity - expected_mouse).abs() < 1e-9);
        assert_eq!(decision.eye_similarity, 100.0);
        let expected_overall = 0.7 * expected_mouse + 0.3 * 100.0;
        assert!((decision.overall_similarity - expected_overall).abs() < 1e-9);
        assert!(decision.accepted);
    }

    #[test]
    fn test_mse_distant_vectors_rejected_at_zero() {
        let engine = engine(SimilarityMode::Mse);
        let first = vector([0.0, 0.0, 0.0, 0.0, 0.0]);
        let second = vector([100.0, 100.0, 100.0, 100.0, 100.0]);

        let decision = engine.compare(&first, &second);

        assert_eq!(decision.mouse_similarity, 0.0);
        assert_eq!(decision.eye_similarity, 0.0);
        assert_eq!(decision.overall_similarity, 0.0);
        assert!(!decision.accepted);
    }

    #[test]
    fn test_mse_is_symmetric() {
        let engine = engine(SimilarityMode::Mse);
        let first = vector([12.5, 3.0, 40.0, 320.0, 240.0]);
        let second = vector([9.0, -1.0, 55.0, 300.0, 260.0]);

        let forward = engine.compare(&first, &second);
        let backward = engine.compare(&second, &first);

        assert_eq!(forward.mouse_similarity, backward.mouse_similarity);
        assert_eq!(forward.eye_similarity, backward.eye_similarity);
        assert_eq!(forward.overall_similarity, backward.overall_similarity);
        assert_eq!(forward.accepted, backward.accepted);
    }

    #[test]
    fn test_cosine_proportional_motion_scores_100() {
        let engine = engine(SimilarityMode::CosineMotionPlusMseEye);
        let first = vector([1.0, 2.0, 3.0, 100.0, 100.0]);
        let second = vector([2.0, 4.0, 6.0, 100.0, 100.0]);

        let decision = engine.compare(&first, &second);

        assert!((decision.mouse_similarity - 100.0).abs() < 1e-9);
        assert_eq!(decision.eye_similarity, 100.0);
        assert!((decision.overall_similarity - 100.0).abs() < 1e-9);
        assert!(decision.accepted);
    }

    #[test]
    fn test_cosine_opposed_motion_drags_fused_score_negative() {
        let engine = engine(SimilarityMode::CosineMotionPlusMseEye);
        let first = vector([1.0, 0.0, 0.0, 10.0, 10.0]);
        let second = vector([-1.0, 0.0, 0.0, 10.0, 10.0]);

        let decision = engine.compare(&first, &second);

        assert_eq!(decision.mouse_similarity, -100.0);
        assert_eq!(decision.eye_similarity, 100.0);
        // 0.7 * -100 + 0.3 * 100
        assert!((decision.overall_similarity - (-40.0)).abs() < 1e-9);
        assert!(!decision.accepted);
    }

    #[test]
    fn test_cosine_zero_motion_scores_zero_not_nan() {
        let engine = engine(SimilarityMode::CosineMotionPlusMseEye);
        let first = vector([0.0, 0.0, 0.0, 10.0, 10.0]);
        let second = vector([1.0, 2.0, 3.0, 10.0, 10.0]);

        let decision = engine.compare(&first, &second);

        assert_eq!(decision.mouse_similarity, 0.0);
        assert!(decision.overall_similarity.is_finite());
    }

    #[test]
    fn test_motion_only_ignores_gaze() {
        let engine = engine(SimilarityMode::MotionOnlyMse);
        let first = vector([5.0, 1.0, 20.0, 0.0, 0.0]);
        let second = vector([5.0, 1.0, 20.0, 900.0, 900.0]);

        let decision = engine.compare(&first, &second);

        assert_eq!(decision.mouse_similarity, 0.0);
        assert_eq!(decision.eye_similarity, 0.0);
        assert_eq!(decision.overall_similarity, 0.0);
        assert!(decision.accepted);
        assert_eq!(decision.mode, SimilarityMode::MotionOnlyMse);
    }

    #[test]
    fn test_motion_only_rejects_above_threshold() {
        let engine = engine(SimilarityMode::MotionOnlyMse);
        let first = vector([0.0, 0.0, 0.0, 0.0, 0.0]);
        let second = vector([100.0, 0.0, 0.0, 0.0, 0.0]);

        let decision = engine.compare(&first, &second);

        // Raw MSE of 10000/3 exceeds the default threshold of 1000.
        assert!((decision.mouse_similarity - 10_000.0 / 3.0).abs() < 1e-9);
        assert_eq!(decision.overall_similarity, decision.mouse_similarity);
        assert!(!decision.accepted);
    }

    #[test]
    fn test_accept_threshold_boundary_is_inclusive() {
        let config = SimilarityConfig {
            mode: SimilarityMode::Mse,
            mse_scale: 10.0,
            mouse_weight: 1.0,
            eye_weight: 0.0,
            ..SimilarityConfig::default()
        };
        let engine = SimilarityEngine::from_config(&config).unwrap();
        // Motion MSE of 300 at scale 10 lands exactly on the threshold of 70.
        let first = vector([0.0, 0.0, 0.0, 0.0, 0.0]);
        let second = vector([30.0, 0.0, 0.0, 0.0, 0.0]);

        let decision = engine.compare(&first, &second);

        assert_eq!(decision.overall_similarity, 70.0);
        assert!(decision.accepted);
    }

    #[test]
    fn test_eye_heavy_weights_shift_fusion() {
        let config = SimilarityConfig {
            mode: SimilarityMode::CosineMotionPlusMseEye,
            mouse_weight: 0.3,
            eye_weight: 0.7,
            ..SimilarityConfig::default()
        };
        let engine = SimilarityEngine::from_config(&config).unwrap();
        // Proportional motion scores 100; gaze far apart scores 0.
        let first = vector([1.0, 2.0, 3.0, 0.0, 0.0]);
        let second = vector([2.0, 4.0, 6.0, 200.0, 200.0]);

        let decision = engine.compare(&first, &second);

        assert!((decision.mouse_similarity - 100.0).abs() < 1e-9);
        assert_eq!(decision.eye_similarity, 0.0);
        assert!((decision.overall_similarity - 30.0).abs() < 1e-9);
        assert!(!decision.accepted);
    }

    #[test]
    fn test_from_config_rejects_bad_weights() {
        let config = SimilarityConfig {
            mouse_weight: 0.5,
            eye_weight: 0.6,
            ..SimilarityConfig::default()
        };
        assert!(SimilarityEngine::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_rejects_zero_scale() {
        let config = SimilarityConfig {
            mse_scale: 0.0,
            ..SimilarityConfig::default()
        };
        assert!(SimilarityEngine::from_config(&config).is_err());
    }

    #[test]
    fn test_mode_parse_and_display_round_trip() {
        for mode in [
            SimilarityMode::Mse,
            SimilarityMode::CosineMotionPlusMseEye,
            SimilarityMode::MotionOnlyMse,
        ] {
            let parsed: SimilarityMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
        assert!("euclidean".parse::<SimilarityMode>().is_err());
    }

    #[test]
    fn test_mode_serde_spelling() {
        let json = serde_json::to_string(&SimilarityMode::CosineMotionPlusMseEye).unwrap();
        assert_eq!(json, "\"cosine_motion_plus_mse_eye\"");
        let back: SimilarityMode = serde_json::from_str("\"motion_only_mse\"").unwrap();
        assert_eq!(back, SimilarityMode::MotionOnlyMse);
    }

    #[test]
    fn test_default_mode_is_mse() {
        assert_eq!(SimilarityMode::default(), SimilarityMode::Mse);
    }
}
