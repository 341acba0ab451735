//! Detector configuration.

use ctsim_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current-time product (mAs) at which the photon quantum equals
/// [`DetectorConfig::rate_quantum`].
pub const REFERENCE_DOSE: f64 = 10_000.0;

/// Configuration for the photon detection model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Current-time product in mAs (default: 10000).
    pub dose_factor: f64,
    /// Mean of the background radiation counts per sample (default: 5e5).
    pub background_mean: f64,
    /// Scatter counts per sample as a fraction of total source flux (default: 1e-6).
    pub scatter_fraction: f64,
    /// Photon quantum of the signal draw at [`REFERENCE_DOSE`] (default: 1e6).
    pub rate_quantum: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dose_factor: REFERENCE_DOSE,
            background_mean: 5.0e5,
            scatter_fraction: 1.0e-6,
            rate_quantum: 1.0e6,
        }
    }
}

impl DetectorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current-time product.
    #[must_use]
    pub fn with_dose_factor(mut self, dose_factor: f64) -> Self {
        self.dose_factor = dose_factor;
        self
    }

    /// Set the background radiation mean.
    #[must_use]
    pub fn with_background_mean(mut self, mean: f64) -> Self {
        self.background_mean = mean;
        self
    }

    /// Set the scatter fraction.
    #[must_use]
    pub fn with_scatter_fraction(mut self, fraction: f64) -> Self {
        self.scatter_fraction = fraction;
        self
    }

    /// Set the photon quantum at the reference dose.
    #[must_use]
    pub fn with_rate_quantum(mut self, quantum: f64) -> Self {
        self.rate_quantum = quantum;
        self
    }

    /// Photons represented by one Poisson event in the signal draw.
    ///
    /// Scales inversely with dose, so the expected count is unchanged while
    /// relative noise falls as dose rises.
    #[must_use]
    pub fn photon_quantum(&self) -> f64 {
        self.rate_quantum * REFERENCE_DOSE / self.dose_factor
    }

    /// Checks every parameter.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("dose_factor", self.dose_factor),
            ("rate_quantum", self.rate_quantum),
        ];
        let non_negative = [
            ("background_mean", self.background_mean),
            ("scatter_fraction", self.scatter_fraction),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::ConfigError(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
