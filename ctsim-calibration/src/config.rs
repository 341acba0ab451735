//! Calibration configuration.

use ctsim_core::{Error, Result};
use ctsim_detector::DetectorConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How raw readings that cannot be log-linearised are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NonFinitePolicy {
    /// Floor raw readings at one photon; non-finite readings become one photon.
    #[default]
    Clamp,
    /// Fail on the first non-finite or non-positive reading.
    Reject,
    /// Let NaN and infinities flow through unchanged.
    Propagate,
}

/// Configuration for sinogram calibration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationConfig {
    /// Detector model used for the air and water reference scans.
    pub detector: DetectorConfig,
    /// Apply the water beam-hardening correction (default: true).
    pub beam_hardening: bool,
    /// Handling of readings that would give non-finite attenuation.
    pub non_finite: NonFinitePolicy,
    /// Reference slab depth in units of `samples * pixel_scale` (default: 2.0).
    ///
    /// Must match the field of view used to produce the raw sinogram.
    pub fov_factor: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            beam_hardening: true,
            non_finite: NonFinitePolicy::default(),
            fov_factor: 2.0,
        }
    }
}

impl CalibrationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reference scan detector model.
    #[must_use]
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Enable or disable beam-hardening correction.
    #[must_use]
    pub fn with_beam_hardening(mut self, enabled: bool) -> Self {
        self.beam_hardening = enabled;
        self
    }

    /// Set the non-finite reading policy.
    #[must_use]
    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    /// Set the field-of-view factor.
    #[must_use]
    pub fn with_fov_factor(mut self, factor: f64) -> Self {
        self.fov_factor = factor;
        self
    }

    /// Depth of the reference slab for a sinogram row of `samples`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reference_depth(&self, samples: usize, pixel_scale: f64) -> f64 {
        self.fov_factor * samples as f64 * pixel_scale
    }

    /// Checks every parameter.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for an invalid detector model or a
    /// non-positive field-of-view factor.
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        if !(self.fov_factor.is_finite() && self.fov_factor > 0.0) {
            return Err(Error::ConfigError(format!(
                "fov_factor must be finite and positive, got {}",
                self.fov_factor
            )));
        }
        Ok(())
    }
}
