//! Photon detection: transport plus noise.

use crate::noise::NoiseModel;
use crate::transport::expected_counts;
use crate::DetectorConfig;
use ctsim_core::{CoefficientTable, DepthProfile, EnergySpectrum, Result};
use log::debug;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Samples handled by one seeded generator in [`PhotonDetector::detect_seeded`].
const SEEDED_CHUNK: usize = 64;

/// Simulates detector readings for a stack of material depths.
#[derive(Clone, Debug, Default)]
pub struct PhotonDetector {
    config: DetectorConfig,
}

impl PhotonDetector {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detector counts per sample, drawing noise from `rng`.
    ///
    /// Samples are visited in increasing index; each draws signal,
    /// background and scatter in that order, so a seeded `rng` gives
    /// reproducible output.
    ///
    /// # Errors
    /// - [`ctsim_core::Error::ShapeMismatch`] for inconsistent energy or
    ///   material counts
    /// - [`ctsim_core::Error::ConfigError`] for an invalid configuration
    pub fn detect<R: Rng + ?Sized>(
        &self,
        spectrum: &EnergySpectrum,
        coeffs: &CoefficientTable,
        depths: &DepthProfile,
        rng: &mut R,
    ) -> Result<Array1<f64>> {
        let (expected, noise) = self.prepare(spectrum, coeffs, depths)?;
        Ok(expected.mapv(|e| noise.sample(e, rng)))
    }

    /// Detector counts per sample, generated in parallel from a seed.
    ///
    /// Samples are split into fixed chunks; chunk `i` draws from
    /// `StdRng::seed_from_u64(seed + i)`, so the output does not depend on
    /// thread scheduling.
    ///
    /// # Errors
    /// Same conditions as [`PhotonDetector::detect`].
    pub fn detect_seeded(
        &self,
        spectrum: &EnergySpectrum,
        coeffs: &CoefficientTable,
        depths: &DepthProfile,
        seed: u64,
    ) -> Result<Array1<f64>> {
        let (expected, noise) = self.prepare(spectrum, coeffs, depths)?;
        let expected = expected.to_vec();
        let mut counts = vec![0.0; expected.len()];

        counts
            .par_chunks_mut(SEEDED_CHUNK)
            .zip(expected.par_chunks(SEEDED_CHUNK))
            .enumerate()
            .for_each(|(chunk_idx, (out, rates))| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk_idx as u64));
                for (count, &rate) in out.iter_mut().zip(rates) {
                    *count = noise.sample(rate, &mut rng);
                }
            });

        Ok(Array1::from_vec(counts))
    }

    fn prepare(
        &self,
        spectrum: &EnergySpectrum,
        coeffs: &CoefficientTable,
        depths: &DepthProfile,
    ) -> Result<(Array1<f64>, NoiseModel)> {
        self.config.validate()?;
        let expected = expected_counts(spectrum, coeffs, depths)?;
        debug!(
            "Detecting {} samples through {} materials over {} energies (quantum {})",
            depths.samples(),
            coeffs.materials(),
            spectrum.len(),
            self.config.photon_quantum()
        );
        let noise = NoiseModel::new(&self.config, spectrum.total_flux());
        Ok((expected, noise))
    }
}

/// Detector counts for the default noise model at a given dose.
///
/// Shorthand for a [`PhotonDetector`] whose configuration differs from the
/// default only in `dose_factor`.
///
/// # Errors
/// Same conditions as [`PhotonDetector::detect`].
pub fn detect<R: Rng + ?Sized>(
    spectrum: &EnergySpectrum,
    coeffs: &CoefficientTable,
    depths: &DepthProfile,
    dose_factor: f64,
    rng: &mut R,
) -> Result<Array1<f64>> {
    PhotonDetector::with_config(DetectorConfig::new().with_dose_factor(dose_factor))
        .detect(spectrum, coeffs, depths, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctsim_core::Error;
    use ndarray::array;

    fn slab() -> (EnergySpectrum, CoefficientTable, DepthProfile) {
        (
            EnergySpectrum::new(array![4.0e8, 6.0e8]).unwrap(),
            CoefficientTable::single(array![0.3, 0.2]).unwrap(),
            DepthProfile::uniform(2.0, 100).unwrap(),
        )
    }

    #[test]
    fn test_output_length_and_floor() {
        let (spectrum, coeffs, depths) = slab();
        let mut rng = StdRng::seed_from_u64(1);
        let counts = detect(&spectrum, &coeffs, &depths, 1.0e4, &mut rng).unwrap();
        assert_eq!(counts.len(), 100);
        assert!(counts.iter().all(|&c| c >= 1.0));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let (spectrum, coeffs, depths) = slab();
        let detector = PhotonDetector::new();
        let a = detector
            .detect(&spectrum, &coeffs, &depths, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = detector
            .detect(&spectrum, &coeffs, &depths, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_detect_seeded_is_reproducible() {
        let (spectrum, coeffs, depths) = slab();
        let detector = PhotonDetector::new();
        let a = detector.detect_seeded(&spectrum, &coeffs, &depths, 9).unwrap();
        let b = detector.detect_seeded(&spectrum, &coeffs, &depths, 9).unwrap();
        let c = detector.detect_seeded(&spectrum, &coeffs, &depths, 10).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&v| v >= 1.0));
    }

    #[test]
    fn test_invalid_dose() {
        let (spectrum, coeffs, depths) = slab();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            detect(&spectrum, &coeffs, &depths, 0.0, &mut rng),
            Err(Error::ConfigError(_))
        ));
    }
}
