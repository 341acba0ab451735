//! ctsim-core: Core types for X-ray CT acquisition simulation.
//!
//! This crate provides the array types shared by the detection,
//! calibration and filtering stages, the material and source
//! capabilities they consume, and the common error type.
//!

pub mod depth;
pub mod error;
pub mod material;
pub mod spectrum;

pub use depth::DepthProfile;
pub use error::{Error, Result};
pub use material::{CoefficientTable, MaterialLibrary, MaterialTable, AIR, WATER};
pub use spectrum::{EnergySpectrum, IdealSource, SourceSpectrum};

use ndarray::Array2;

/// Detector measurements indexed by (angle, sample).
///
/// Holds raw counts before calibration and attenuation (or water
/// equivalent thickness) afterwards. Rows follow acquisition order.
pub type Sinogram = Array2<f64>;

/// Validates that a sinogram has at least one angle and one sample.
///
/// Returns `(angles, samples)`.
///
/// # Errors
/// Returns [`Error::ConfigError`] if either axis is empty.
pub fn sinogram_dims(sinogram: &Sinogram) -> Result<(usize, usize)> {
    let (angles, samples) = sinogram.dim();
    if angles == 0 || samples == 0 {
        return Err(Error::ConfigError(format!(
            "sinogram must be non-empty, got {angles} x {samples}"
        )));
    }
    Ok((angles, samples))
}

/// Checks that a pixel scale is a usable length in cm.
///
/// # Errors
/// Returns [`Error::ConfigError`] unless `scale` is finite and positive.
pub fn validate_pixel_scale(scale: f64) -> Result<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(Error::ConfigError(format!(
            "pixel scale must be finite and positive, got {scale}"
        )))
    }
}
