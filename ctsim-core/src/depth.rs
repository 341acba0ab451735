//! Material path lengths per detector sample.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Path length (cm) through each material at each sample, shaped
/// `[materials, samples]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthProfile {
    depths: Array2<f64>,
}

impl DepthProfile {
    /// Wraps a `[materials, samples]` array.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for an empty profile or negative or
    /// non-finite depths.
    pub fn new(depths: Array2<f64>) -> Result<Self> {
        if depths.is_empty() {
            return Err(Error::ConfigError(
                "depth profile must be non-empty".to_string(),
            ));
        }
        if let Some(depth) = depths.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(Error::ConfigError(format!("invalid material depth {depth}")));
        }
        Ok(Self { depths })
    }

    /// A single depth for a single material at a single sample.
    ///
    /// # Errors
    /// Same conditions as [`DepthProfile::new`].
    pub fn scalar(depth: f64) -> Result<Self> {
        Self::new(Array2::from_elem((1, 1), depth))
    }

    /// Interprets a 1-D depth vector against a material count.
    ///
    /// With one material the vector runs along samples, giving `[1, S]`.
    /// Otherwise it is one depth per material at a single sample, `[M, 1]`.
    ///
    /// # Errors
    /// Same conditions as [`DepthProfile::new`].
    pub fn from_vector(depths: Array1<f64>, materials: usize) -> Result<Self> {
        if materials == 1 {
            Self::new(depths.insert_axis(Axis(0)))
        } else {
            Self::new(depths.insert_axis(Axis(1)))
        }
    }

    /// One material with the same depth at every sample.
    ///
    /// # Errors
    /// Same conditions as [`DepthProfile::new`].
    pub fn uniform(depth: f64, samples: usize) -> Result<Self> {
        Self::new(Array2::from_elem((1, samples), depth))
    }

    /// One material with a per-sample depth.
    ///
    /// # Errors
    /// Same conditions as [`DepthProfile::new`].
    pub fn single(depths: Array1<f64>) -> Result<Self> {
        Self::from_vector(depths, 1)
    }

    /// Number of materials (rows).
    #[must_use]
    pub fn materials(&self) -> usize {
        self.depths.nrows()
    }

    /// Number of detector samples (columns).
    #[must_use]
    pub fn samples(&self) -> usize {
        self.depths.ncols()
    }

    /// Depths of one material across samples.
    #[must_use]
    pub fn material(&self, index: usize) -> ArrayView1<'_, f64> {
        self.depths.row(index)
    }

    /// Checks the material axis against a coefficient table.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] when the counts differ.
    pub fn ensure_materials(&self, materials: usize) -> Result<()> {
        if self.materials() == materials {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                what: "depth materials",
                expected: materials,
                found: self.materials(),
            })
        }
    }
}
