//! # Engine Configuration
//!
//! Tuning constants for sampling, playback pacing and transitions.
//!
//! The period and fading formulas are empirical: a drawable with `n` samples
//! loops every `n / period_divisor` seconds, and its trail may decay no
//! faster than `1 / (fading_coefficient * period)` per second. Both are kept
//! configurable rather than derived.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpicycleConfig {
    /// Half-extent of the normalized coordinate frame samples live in.
    pub half_extent: f64,
    /// Samples per unit of normalized arc length used for a fresh store.
    pub sampling_rate: f64,
    pub min_sampling_rate: f64,
    pub max_sampling_rate: f64,
    pub period_divisor: f64,
    pub fading_coefficient: f64,
    /// Duration of the lock-to-path and zoom-reset transitions.
    pub transition_millis: f64,
    /// Playback speeds accepted by `change_period_speed`.
    pub speed_ladder: Vec<f64>,
    /// Accuracy handed to kurbo's arc-length solvers.
    pub arc_accuracy: f64,
}

impl Default for EpicycleConfig {
    fn default() -> Self {
        Self {
            half_extent: 1.0,
            sampling_rate: 125.0,
            min_sampling_rate: 25.0,
            max_sampling_rate: 225.0,
            period_divisor: 1.5,
            fading_coefficient: 0.05,
            transition_millis: 500.0,
            speed_ladder: vec![0.25, 0.5, 1.0, 2.0],
            arc_accuracy: 1e-6,
        }
    }
}

impl EpicycleConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Loop duration in seconds at speed 1 for a path of `sample_count` points.
    pub fn period_duration(&self, sample_count: usize) -> f64 {
        sample_count as f64 / self.period_divisor
    }

    /// Slowest trail decay rate (alpha per second) a period permits.
    pub fn natural_fading_duration(&self, period_duration: f64) -> f64 {
        if period_duration <= 0.0 {
            return 0.0;
        }
        1.0 / (self.fading_coefficient * period_duration)
    }

    pub fn accepts_sampling_rate(&self, rate: f64) -> bool {
        rate.is_finite() && rate >= self.min_sampling_rate && rate <= self.max_sampling_rate
    }

    pub fn accepts_speed(&self, speed: f64) -> bool {
        self.speed_ladder
            .iter()
            .any(|step| (step - speed).abs() < 1e-9)
    }
}
