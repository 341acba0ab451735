//! Detector noise model.
//!
//! Every sample receives three independent Poisson contributions:
//! - **Signal**: the expected count divided into photon quanta, sampled,
//!   and scaled back
//! - **Background**: fixed-mean radiation counts
//! - **Scatter**: counts proportional to total source flux
//!
//! The sum is floored at one photon.

use crate::DetectorConfig;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Minimum count a detector sample can report.
pub(crate) const DETECTOR_FLOOR: f64 = 1.0;

/// Per-sample noise model derived from a [`DetectorConfig`] and a spectrum.
#[derive(Clone, Debug)]
pub struct NoiseModel {
    quantum: f64,
    background_mean: f64,
    scatter_mean: f64,
    background: Option<Poisson<f64>>,
    scatter: Option<Poisson<f64>>,
}

impl NoiseModel {
    /// Builds the model for a spectrum with the given total flux.
    ///
    /// The configuration is assumed to be validated.
    #[must_use]
    pub fn new(config: &DetectorConfig, total_flux: f64) -> Self {
        let scatter_mean = config.scatter_fraction * total_flux;
        Self {
            quantum: config.photon_quantum(),
            background_mean: config.background_mean,
            scatter_mean,
            background: poisson(config.background_mean),
            scatter: poisson(scatter_mean),
        }
    }

    /// Draws one noisy reading for an expected count.
    ///
    /// Draw order is signal, background, scatter.
    pub fn sample<R: Rng + ?Sized>(&self, expected: f64, rng: &mut R) -> f64 {
        let signal = poisson(expected / self.quantum).map_or(0.0, |d| d.sample(rng)) * self.quantum;
        let background = self.background.as_ref().map_or(0.0, |d| d.sample(rng));
        let scatter = self.scatter.as_ref().map_or(0.0, |d| d.sample(rng));
        (signal + background + scatter).max(DETECTOR_FLOOR)
    }

    /// Mean reading for an expected count, ignoring the floor.
    #[must_use]
    pub fn mean(&self, expected: f64) -> f64 {
        expected + self.background_mean + self.scatter_mean
    }
}

/// Poisson distribution for a positive rate; zero rates draw nothing.
fn poisson(rate: f64) -> Option<Poisson<f64>> {
    if rate > 0.0 {
        Poisson::new(rate).ok()
    } else {
        None
    }
}
