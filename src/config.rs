//! Numeric tunables consumed by the fitting core.
//!
//! A [`FitConfig`] is handed to the engine once and treated as read-only for
//! its lifetime. It can be built in code or deserialized from JSON; missing
//! fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FitLabError, Result};
use crate::lm::LmConfig;

/// Tunables for display, estimation and optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Significant figures used when substituting fitted values into templates. Default: 4
    pub significant_figures: usize,

    /// Fraction of the largest detrended excursion a lobe must reach to count as a peak. Default: 0.5
    pub peak_sensitivity: f64,

    /// Number of candidate phases tried over one period. Default: 36
    pub phase_grid_points: usize,

    /// Angular frequency used when no periodicity is detected. Default: 1.0
    pub default_frequency: f64,

    /// Confidence level of the reported parameter intervals. Default: 0.95
    pub confidence_level: f64,

    /// Collect sweeps on the rayon pool. Default: false
    pub parallel_sweeps: bool,

    /// Levenberg-Marquardt settings.
    pub optimizer: LmConfig,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            significant_figures: 4,
            peak_sensitivity: 0.5,
            phase_grid_points: 36,
            default_frequency: 1.0,
            confidence_level: 0.95,
            parallel_sweeps: false,
            optimizer: LmConfig::default(),
        }
    }
}

impl FitConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file and validate it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FitLabError::Configuration(format!(
                "cannot read configuration '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Check every tunable, failing with a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.significant_figures == 0 || self.significant_figures > 17 {
            return Err(FitLabError::Configuration(format!(
                "significant_figures must be between 1 and 17, got {}",
                self.significant_figures
            )));
        }
        if !(self.peak_sensitivity > 0.0 && self.peak_sensitivity <= 1.0) {
            return Err(FitLabError::Configuration(format!(
                "peak_sensitivity must be in (0, 1], got {}",
                self.peak_sensitivity
            )));
        }
        if self.phase_grid_points == 0 {
            return Err(FitLabError::Configuration(
                "phase_grid_points must be at least 1".to_string(),
            ));
        }
        if !(self.default_frequency.is_finite() && self.default_frequency > 0.0) {
            return Err(FitLabError::Configuration(format!(
                "default_frequency must be finite and positive, got {}",
                self.default_frequency
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(FitLabError::Configuration(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        self.optimizer.check().map_err(FitLabError::Configuration)
    }

    /// Set the number of significant figures used for display.
    pub fn with_significant_figures(mut self, figures: usize) -> Self {
        self.significant_figures = figures;
        self
    }

    /// Set the peak detection sensitivity.
    pub fn with_peak_sensitivity(mut self, sensitivity: f64) -> Self {
        self.peak_sensitivity = sensitivity;
        self
    }

    /// Set the phase grid resolution.
    pub fn with_phase_grid_points(mut self, points: usize) -> Self {
        self.phase_grid_points = points;
        self
    }

    /// Set the optimizer iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.optimizer.max_iterations = max_iterations;
        self
    }

    /// Collect sweeps in parallel.
    pub fn with_parallel_sweeps(mut self, parallel: bool) -> Self {
        self.parallel_sweeps = parallel;
        self
    }
}
