//! Hounsfield unit scaling of reconstructions.
#![allow(clippy::cast_precision_loss)]

use ctsim_core::{
    validate_pixel_scale, DepthProfile, EnergySpectrum, Error, MaterialTable, Result, AIR, WATER,
};
use ctsim_detector::{DetectorConfig, PhotonDetector};
use log::{debug, info};
use ndarray::Array2;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest value on the Hounsfield scale.
pub const HOUNSFIELD_FLOOR: f64 = -1024.0;

/// Source of the water value the scale is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HounsfieldReference {
    /// Simulated water coefficient at the field-of-view radius.
    #[default]
    Water,
    /// Fixed water value of 1, for reconstructions already in water units.
    Unit,
}

/// Configuration for Hounsfield conversion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HounsfieldConfig {
    /// Water reference mode.
    pub reference: HounsfieldReference,
    /// Values below this are clamped (default: -1024).
    pub floor: f64,
    /// Detector model for the reference scans.
    pub detector: DetectorConfig,
    /// Air slab depth in units of `size * pixel_scale` (default: 2.0).
    pub fov_factor: f64,
}

impl Default for HounsfieldConfig {
    fn default() -> Self {
        Self {
            reference: HounsfieldReference::default(),
            floor: HOUNSFIELD_FLOOR,
            detector: DetectorConfig::default(),
            fov_factor: 2.0,
        }
    }
}

impl HounsfieldConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the water reference mode.
    #[must_use]
    pub fn with_reference(mut self, reference: HounsfieldReference) -> Self {
        self.reference = reference;
        self
    }

    /// Set the reference scan detector model.
    #[must_use]
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the field-of-view factor for the air slab.
    #[must_use]
    pub fn with_fov_factor(mut self, factor: f64) -> Self {
        self.fov_factor = factor;
        self
    }

    /// Set the lowest output value.
    #[must_use]
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Checks every parameter.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for an invalid detector model, a
    /// non-positive field-of-view factor or a non-finite floor.
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        if !(self.fov_factor.is_finite() && self.fov_factor > 0.0) {
            return Err(Error::ConfigError(format!(
                "fov_factor must be finite and positive, got {}",
                self.fov_factor
            )));
        }
        if !self.floor.is_finite() {
            return Err(Error::ConfigError(format!(
                "Hounsfield floor must be finite, got {}",
                self.floor
            )));
        }
        Ok(())
    }
}

/// Rescales reconstructed attenuation maps to Hounsfield units.
#[derive(Clone, Debug, Default)]
pub struct HounsfieldConverter {
    config: HounsfieldConfig,
}

impl HounsfieldConverter {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: HounsfieldConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &HounsfieldConfig {
        &self.config
    }

    /// Linear attenuation coefficient of water (cm⁻¹) for this source.
    ///
    /// Water at the field-of-view radius `size * pixel_scale / 2` is scanned
    /// against the air slab over `size` samples; the mean log ratio is
    /// divided by the radius. Air is drawn from `rng` before water.
    ///
    /// # Errors
    /// - [`Error::ConfigError`] for an empty image, invalid scale or
    ///   a non-positive water value
    /// - lookup and shape errors from the reference scans
    pub fn water_coefficient<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        size: usize,
        pixel_scale: f64,
        rng: &mut R,
    ) -> Result<f64>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let pixel_scale = validate_pixel_scale(pixel_scale)?;
        if size == 0 {
            return Err(Error::ConfigError(
                "reconstruction must be non-empty".to_string(),
            ));
        }

        let detector = PhotonDetector::with_config(self.config.detector.clone());
        let radius = size as f64 * pixel_scale / 2.0;
        let air_depth = self.config.fov_factor * size as f64 * pixel_scale;

        let air = detector.detect(
            spectrum,
            &materials.coefficient_table(AIR)?,
            &DepthProfile::uniform(air_depth, size)?,
            rng,
        )?;
        let water = detector.detect(
            spectrum,
            &materials.coefficient_table(WATER)?,
            &DepthProfile::uniform(radius, size)?,
            rng,
        )?;

        let attenuation = (&water / &air).mapv(|ratio| -ratio.ln()).sum() / size as f64;
        let mu = attenuation / radius;
        debug!("Water reference: {mu:.5} /cm at depth {radius:.3} cm");

        if mu.is_finite() && mu > 0.0 {
            Ok(mu)
        } else {
            Err(Error::ConfigError(format!(
                "water reference attenuation {mu} is not positive"
            )))
        }
    }

    /// Converts a reconstruction with an explicit water value.
    ///
    /// `hu = (value - water) * 1000 / water`, clamped at the floor. NaN
    /// values stay NaN.
    #[must_use]
    pub fn scale(&self, reconstruction: &Array2<f64>, water: f64) -> Array2<f64> {
        let floor = self.config.floor;
        reconstruction.mapv(|v| {
            let hu = (v - water) * 1000.0 / water;
            if hu < floor {
                floor
            } else {
                hu
            }
        })
    }

    /// Converts a square reconstruction to Hounsfield units.
    ///
    /// # Errors
    /// [`Error::ConfigError`] from [`HounsfieldConfig::validate`], and errors
    /// from [`HounsfieldConverter::water_coefficient`] in
    /// [`HounsfieldReference::Water`] mode.
    pub fn convert<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        reconstruction: &Array2<f64>,
        pixel_scale: f64,
        rng: &mut R,
    ) -> Result<Array2<f64>>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let size = reconstruction.nrows();
        info!(
            "Converting {} x {} reconstruction to Hounsfield units",
            size,
            reconstruction.ncols()
        );

        let water = match self.config.reference {
            HounsfieldReference::Water => {
                self.water_coefficient(spectrum, materials, size, pixel_scale, rng)?
            }
            HounsfieldReference::Unit => 1.0,
        };
        Ok(self.scale(reconstruction, water))
    }
}

/// Converts a reconstruction to Hounsfield units with the default
/// water-referenced configuration.
///
/// # Errors
/// Same conditions as [`HounsfieldConverter::convert`].
pub fn to_hounsfield<M, R>(
    spectrum: &EnergySpectrum,
    materials: &M,
    reconstruction: &Array2<f64>,
    pixel_scale: f64,
    rng: &mut R,
) -> Result<Array2<f64>>
where
    M: MaterialTable + ?Sized,
    R: Rng + ?Sized,
{
    HounsfieldConverter::new().convert(spectrum, materials, reconstruction, pixel_scale, rng)
}
