//! Row-wise ramp filtering.
#![allow(clippy::cast_precision_loss)]

use crate::kernel::{filter_kernel, padded_length};
use ctsim_core::{sinogram_dims, validate_pixel_scale, Result, Sinogram};
use log::{debug, info};
use ndarray::Zip;
use rustfft::{num_complex::Complex64, FftPlanner};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the ramp filter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RampFilterConfig {
    /// Raised-cosine apodisation exponent; 0 is the bare Ram-Lak ramp
    /// (default: 0.001).
    pub alpha: f64,
}

impl Default for RampFilterConfig {
    fn default() -> Self {
        Self { alpha: 0.001 }
    }
}

impl RampFilterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the apodisation exponent.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Ram-Lak filter with raised-cosine apodisation.
#[derive(Clone, Debug, Default)]
pub struct RampFilter {
    config: RampFilterConfig,
}

impl RampFilter {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: RampFilterConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &RampFilterConfig {
        &self.config
    }

    /// Filters every angle row of an `[angles, samples]` sinogram.
    ///
    /// The output has the same shape. Non-finite input values spread
    /// through their row.
    ///
    /// # Errors
    /// Returns [`ctsim_core::Error::ConfigError`] for an empty sinogram, a
    /// non-positive pixel scale or a non-finite `alpha`.
    pub fn apply(&self, sinogram: &Sinogram, pixel_scale: f64) -> Result<Sinogram> {
        let (angles, samples) = sinogram_dims(sinogram)?;
        let pixel_scale = validate_pixel_scale(pixel_scale)?;
        if !self.config.alpha.is_finite() || self.config.alpha < 0.0 {
            return Err(ctsim_core::Error::ConfigError(format!(
                "alpha must be finite and non-negative, got {}",
                self.config.alpha
            )));
        }

        info!("Ramp filtering {angles} x {samples} sinogram");
        let m = padded_length(samples);
        debug!("Padded transform length {m}, alpha {}", self.config.alpha);

        let kernel = filter_kernel(m, pixel_scale, self.config.alpha);
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(m);
        let inverse = planner.plan_fft_inverse(m);
        let norm = 1.0 / m as f64;

        let mut filtered = Sinogram::zeros((angles, samples));
        Zip::from(filtered.rows_mut())
            .and(sinogram.rows())
            .par_for_each(|mut out, row| {
                let mut buffer = vec![Complex64::new(0.0, 0.0); m];
                for (slot, &value) in buffer.iter_mut().zip(row.iter()) {
                    slot.re = value;
                }

                forward.process(&mut buffer);
                for (bin, &weight) in buffer.iter_mut().zip(kernel.iter()) {
                    *bin *= weight;
                }
                inverse.process(&mut buffer);

                for (dst, bin) in out.iter_mut().zip(buffer.iter()) {
                    *dst = bin.re * norm;
                }
            });

        Ok(filtered)
    }
}

/// Ramp-filters a sinogram with the given apodisation exponent.
///
/// # Errors
/// Same conditions as [`RampFilter::apply`].
pub fn ramp_filter(sinogram: &Sinogram, pixel_scale: f64, alpha: f64) -> Result<Sinogram> {
    RampFilter::with_config(RampFilterConfig::new().with_alpha(alpha)).apply(sinogram, pixel_scale)
}
