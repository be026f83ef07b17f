//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::similarity::SimilarityMode;
use crate::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Trial timing settings
    #[serde(default)]
    pub trial: TrialConfig,
    /// Similarity scoring settings
    #[serde(default)]
    pub similarity: SimilarityConfig,
    /// Capture settings
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Trial timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// How long each trial samples input (seconds)
    pub trial_duration_secs: f64,
}

/// Similarity scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Scoring strategy
    pub mode: SimilarityMode,
    /// Divisor applied to MSE before subtracting from 100
    pub mse_scale: f64,
    /// Fusion weight for the motion score
    pub mouse_weight: f64,
    /// Fusion weight for the gaze score
    pub eye_weight: f64,
    /// Fused score at or above which the trials are accepted
    pub accept_threshold: f64,
    /// Raw-MSE ceiling for the `motion_only_mse` mode
    pub motion_mse_threshold: f64,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Ring buffer size
    pub ring_buffer_size: usize,
    /// Synthetic pointer cadence (Hz)
    pub pointer_rate_hz: u32,
    /// Gaze frame cadence (Hz)
    pub frame_rate_hz: u32,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trial_duration_secs: 10.0,
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            mode: SimilarityMode::Mse,
            mse_scale: 5.0,
            mouse_weight: 0.7,
            eye_weight: 0.3,
            accept_threshold: 70.0,
            motion_mse_threshold: 1000.0,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ring_buffer_size: 4096,
            pointer_rate_hz: 125,
            frame_rate_hz: 30,
        }
    }
}

impl TrialConfig {
    /// Trial length as a monotonic duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.trial_duration_secs)
    }

    /// Validate trial timing values.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.trial_duration_secs.is_finite() || self.trial_duration_secs <= 0.0 {
            return Err(crate::Error::Config(format!(
                "trial_duration_secs must be > 0, got {}",
                self.trial_duration_secs
            )));
        }
        if self.trial_duration_secs > 120.0 {
            return Err(crate::Error::Config(format!(
                "trial_duration_secs must be <= 120, got {}",
                self.trial_duration_secs
            )));
        }
        Ok(())
    }
}

impl SimilarityConfig {
    /// Validate scoring values.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.mse_scale.is_finite() || self.mse_scale <= 0.0 {
            return Err(crate::Error::Config(format!(
                "mse_scale must be > 0, got {}",
                self.mse_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.mouse_weight) {
            return Err(crate::Error::Config(format!(
                "mouse_weight must be in [0, 1], got {}",
                self.mouse_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.eye_weight) {
            return Err(crate::Error::Config(format!(
                "eye_weight must be in [0, 1], got {}",
                self.eye_weight
            )));
        }
        let weight_sum = self.mouse_weight + self.eye_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(crate::Error::Config(format!(
                "mouse_weight + eye_weight must sum to 1, got {weight_sum}"
            )));
        }
        if !(0.0..=100.0).contains(&self.accept_threshold) {
            return Err(crate::Error::Config(format!(
                "accept_threshold must be in [0, 100], got {}",
                self.accept_threshold
            )));
        }
        if !self.motion_mse_threshold.is_finite() || self.motion_mse_threshold <= 0.0 {
            return Err(crate::Error::Config(format!(
                "motion_mse_threshold must be > 0, got {}",
                self.motion_mse_threshold
            )));
        }
        Ok(())
    }
}

impl CaptureConfig {
    /// Validate capture values.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ring_buffer_size == 0
            || (self.ring_buffer_size & (self.ring_buffer_size - 1)) != 0
        {
            return Err(crate::Error::Config(format!(
                "ring_buffer_size must be a power of 2, got {}",
                self.ring_buffer_size
            )));
        }
        if self.pointer_rate_hz == 0 || self.pointer_rate_hz > 1000 {
            return Err(crate::Error::Config(format!(
                "pointer_rate_hz must be in [1, 1000], got {}",
                self.pointer_rate_hz
            )));
        }
        if self.frame_rate_hz == 0 || self.frame_rate_hz > 240 {
            return Err(crate::Error::Config(format!(
                "frame_rate_hz must be in [1, 240], got {}",
                self.frame_rate_hz
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.trial.validate()?;
        self.similarity.validate()?;
        self.capture.validate()?;
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".behavior_gate").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
