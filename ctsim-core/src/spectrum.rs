//! Source energy spectra.

use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Photon flux per energy bin.
///
/// Flux values are finite and non-negative. The bin order must match the
/// energy axis of any [`CoefficientTable`](crate::CoefficientTable) it is
/// used with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnergySpectrum {
    flux: Array1<f64>,
}

impl EnergySpectrum {
    /// Creates a spectrum from per-bin flux.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for an empty spectrum or any negative
    /// or non-finite flux value.
    pub fn new(flux: Array1<f64>) -> Result<Self> {
        if flux.is_empty() {
            return Err(Error::ConfigError(
                "energy spectrum needs at least one bin".to_string(),
            ));
        }
        if let Some((bin, value)) = flux
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(Error::ConfigError(format!(
                "invalid flux {value} in energy bin {bin}"
            )));
        }
        Ok(Self { flux })
    }

    /// Creates a single-bin spectrum.
    ///
    /// # Errors
    /// Same conditions as [`EnergySpectrum::new`].
    pub fn monoenergetic(flux: f64) -> Result<Self> {
        Self::new(Array1::from_elem(1, flux))
    }

    /// Number of energy bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flux.len()
    }

    /// Always false for a constructed spectrum.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// Per-bin flux.
    #[must_use]
    pub fn flux(&self) -> ArrayView1<'_, f64> {
        self.flux.view()
    }

    /// Total photon flux over all bins.
    #[must_use]
    pub fn total_flux(&self) -> f64 {
        self.flux.sum()
    }

    /// Returns a copy with every bin multiplied by `factor`.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if the result would be invalid.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        Self::new(&self.flux * factor)
    }
}

/// Anything that can hand out an energy spectrum.
///
/// Presets loaded from tables live outside this crate; they only need to
/// implement this trait.
pub trait SourceSpectrum {
    /// Produces the spectrum.
    ///
    /// # Errors
    /// Implementations report invalid parameters as [`Error::ConfigError`].
    fn spectrum(&self) -> Result<EnergySpectrum>;
}

impl SourceSpectrum for EnergySpectrum {
    fn spectrum(&self) -> Result<EnergySpectrum> {
        Ok(self.clone())
    }
}

/// Ideal (monoenergetic) source on a given energy grid.
///
/// All photons go into the bin nearest `energy_mev`, optionally attenuated
/// by a beam filter of one material.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdealSource {
    mev: Array1<f64>,
    energy_mev: f64,
    photons: f64,
    filter: Option<(Array1<f64>, f64)>,
}

impl IdealSource {
    /// Creates an ideal source emitting `photons` at `energy_mev`.
    #[must_use]
    pub fn new(mev: Array1<f64>, energy_mev: f64, photons: f64) -> Self {
        Self {
            mev,
            energy_mev,
            photons,
            filter: None,
        }
    }

    /// Adds a beam filter: per-energy coefficients (cm⁻¹) and thickness (cm).
    #[must_use]
    pub fn with_filter(mut self, coeffs: Array1<f64>, thickness: f64) -> Self {
        self.filter = Some((coeffs, thickness));
        self
    }

    fn nearest_bin(&self) -> Option<usize> {
        self.mev
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (*a - self.energy_mev).abs();
                let db = (*b - self.energy_mev).abs();
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }
}

impl SourceSpectrum for IdealSource {
    fn spectrum(&self) -> Result<EnergySpectrum> {
        let bin = self.nearest_bin().ok_or_else(|| {
            Error::ConfigError("ideal source needs a non-empty energy grid".to_string())
        })?;

        let mut flux = Array1::zeros(self.mev.len());
        flux[bin] = self.photons;

        if let Some((coeffs, thickness)) = &self.filter {
            if coeffs.len() != self.mev.len() {
                return Err(Error::ShapeMismatch {
                    what: "filter energies",
                    expected: self.mev.len(),
                    found: coeffs.len(),
                });
            }
            flux[bin] *= (-coeffs[bin] * thickness).exp();
        }

        EnergySpectrum::new(flux)
    }
}
