//! Sinogram calibration against simulated air and water scans.

use crate::config::{CalibrationConfig, NonFinitePolicy};
use crate::curve::CalibrationCurve;
use ctsim_core::{
    sinogram_dims, validate_pixel_scale, DepthProfile, EnergySpectrum, Error, MaterialTable, Result,
    Sinogram, AIR, WATER,
};
use ctsim_detector::PhotonDetector;
use log::{debug, info, warn};
use ndarray::{Array1, ArrayView1, Axis};
use rand::Rng;

/// Minimum raw reading accepted by [`NonFinitePolicy::Clamp`].
const RAW_FLOOR: f64 = 1.0;

/// Converts raw detector sinograms into attenuation or water thickness.
#[derive(Clone, Debug, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    fn detector(&self) -> PhotonDetector {
        PhotonDetector::with_config(self.config.detector.clone())
    }

    /// Simulated detector curve through the air slab, one value per sample.
    ///
    /// # Errors
    /// - [`Error::UnknownMaterial`] if the table has no air entry
    /// - [`Error::ShapeMismatch`] if air coefficients disagree with the spectrum
    /// - [`Error::ConfigError`] for invalid configuration or pixel scale
    pub fn air_reference<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        samples: usize,
        pixel_scale: f64,
        rng: &mut R,
    ) -> Result<Array1<f64>>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let pixel_scale = validate_pixel_scale(pixel_scale)?;
        let depth = self.config.reference_depth(samples, pixel_scale);
        self.air_scan(spectrum, materials, depth, samples, rng)
    }

    /// Air slab of a fixed `depth`, read out at `points` samples.
    fn air_scan<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        depth: f64,
        points: usize,
        rng: &mut R,
    ) -> Result<Array1<f64>>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        let air = materials.coefficient_table(AIR)?;
        let profile = DepthProfile::uniform(depth, points)?;
        self.detector().detect(spectrum, &air, &profile, rng)
    }

    /// `-ln(raw / air)` per element, with the air curve shared by every angle.
    ///
    /// Readings that cannot be log-linearised are handled by the configured
    /// [`NonFinitePolicy`].
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if `air` does not match the sample count
    /// - [`Error::NumericDegeneracy`] under [`NonFinitePolicy::Reject`]
    pub fn linearise(&self, raw: &Sinogram, air: ArrayView1<'_, f64>) -> Result<Sinogram> {
        let (_, samples) = sinogram_dims(raw)?;
        if air.len() != samples {
            return Err(Error::ShapeMismatch {
                what: "air reference samples",
                expected: samples,
                found: air.len(),
            });
        }

        let raw = match self.config.non_finite {
            NonFinitePolicy::Propagate => raw.clone(),
            NonFinitePolicy::Reject => {
                if let Some(((angle, sample), &value)) =
                    raw.indexed_iter().find(|(_, v)| !v.is_finite() || **v <= 0.0)
                {
                    return Err(Error::NumericDegeneracy {
                        angle,
                        sample,
                        value,
                    });
                }
                raw.clone()
            }
            NonFinitePolicy::Clamp => {
                let clamped = raw.iter().filter(|v| !(v.is_finite() && **v >= RAW_FLOOR)).count();
                if clamped > 0 {
                    warn!("Clamped {clamped} raw readings to the one-photon floor");
                }
                raw.mapv(|v| if v.is_finite() && v >= RAW_FLOOR { v } else { RAW_FLOOR })
            }
        };

        let air = air.insert_axis(Axis(0));
        Ok((raw / &air).mapv(|ratio| -ratio.ln()))
    }

    /// Simulated water attenuation against depth, swept from zero to the
    /// reference slab depth.
    ///
    /// The air and water scans are drawn from `rng` in that order.
    ///
    /// # Errors
    /// - [`Error::ConfigError`] for a spectrum with no flux or a curve that
    ///   cannot be inverted
    /// - lookup and shape errors from the reference scans
    pub fn water_curve<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        samples: usize,
        pixel_scale: f64,
        rng: &mut R,
    ) -> Result<CalibrationCurve>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let pixel_scale = validate_pixel_scale(pixel_scale)?;
        if spectrum.total_flux() <= 0.0 {
            return Err(Error::ConfigError(
                "source spectrum has no flux; water calibration is undefined".to_string(),
            ));
        }

        // The slab depth follows the real row width even when a one-sample
        // row is padded to two knots.
        let points = samples.max(2);
        let max_depth = self.config.reference_depth(samples, pixel_scale);
        let water_depth = Array1::linspace(0.0, max_depth, points);

        let air = self.air_scan(spectrum, materials, max_depth, points, rng)?;
        let water = materials.coefficient_table(WATER)?;
        let water_scan = self.detector().detect(
            spectrum,
            &water,
            &DepthProfile::single(water_depth.clone())?,
            rng,
        )?;

        let attenuation = (&water_scan / &air).mapv(|ratio| -ratio.ln());
        let curve = CalibrationCurve::new(attenuation.view(), water_depth.view())?;

        let (lo, hi) = curve.span();
        debug!(
            "Water curve: {} knots, attenuation {lo:.4}..{hi:.4}, depth 0..{max_depth:.3} cm",
            curve.len()
        );
        if !curve.is_monotonic() {
            warn!("Water calibration curve is not monotonic; noise exceeds depth resolution");
        }
        Ok(curve)
    }

    /// Calibrates a raw `[angles, samples]` sinogram.
    ///
    /// With beam-hardening correction enabled the output is equivalent water
    /// thickness in the units of `pixel_scale`; otherwise it is the
    /// log-linearised attenuation.
    ///
    /// Random draws happen in a fixed order: the air reference first, then
    /// the water curve scans.
    ///
    /// # Errors
    /// Any error from [`Calibrator::air_reference`],
    /// [`Calibrator::linearise`] or [`Calibrator::water_curve`]. Nothing is
    /// returned on failure.
    pub fn calibrate<M, R>(
        &self,
        spectrum: &EnergySpectrum,
        materials: &M,
        raw: &Sinogram,
        pixel_scale: f64,
        rng: &mut R,
    ) -> Result<Sinogram>
    where
        M: MaterialTable + ?Sized,
        R: Rng + ?Sized,
    {
        let (angles, samples) = sinogram_dims(raw)?;
        info!("Calibrating {angles} x {samples} sinogram");

        let air = self.air_reference(spectrum, materials, samples, pixel_scale, rng)?;
        let mut sinogram = self.linearise(raw, air.view())?;

        if self.config.beam_hardening {
            let curve = self.water_curve(spectrum, materials, samples, pixel_scale, rng)?;
            curve.apply(&mut sinogram);
        }
        Ok(sinogram)
    }
}

/// Calibrates a raw sinogram with the default configuration.
///
/// # Errors
/// Same conditions as [`Calibrator::calibrate`].
pub fn calibrate<M, R>(
    spectrum: &EnergySpectrum,
    materials: &M,
    raw: &Sinogram,
    pixel_scale: f64,
    rng: &mut R,
) -> Result<Sinogram>
where
    M: MaterialTable + ?Sized,
    R: Rng + ?Sized,
{
    Calibrator::new().calibrate(spectrum, materials, raw, pixel_scale, rng)
}
