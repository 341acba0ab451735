//! Attenuation to water-thickness lookup.

use ctsim_core::{Error, Result, Sinogram};
use ndarray::ArrayView1;

/// Piecewise-linear map from measured attenuation to equivalent water
/// thickness.
///
/// Knots are sorted by attenuation with duplicates merged. Values outside
/// the sampled range are extrapolated linearly from the end segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCurve {
    attenuation: Vec<f64>,
    depth: Vec<f64>,
}

impl CalibrationCurve {
    /// Builds the curve from paired samples in any order.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] for unequal lengths and
    /// [`Error::ConfigError`] when the samples contain non-finite values or
    /// do not span a positive attenuation range.
    pub fn new(attenuation: ArrayView1<'_, f64>, depth: ArrayView1<'_, f64>) -> Result<Self> {
        if attenuation.len() != depth.len() {
            return Err(Error::ShapeMismatch {
                what: "calibration depths",
                expected: attenuation.len(),
                found: depth.len(),
            });
        }
        if attenuation.iter().chain(depth.iter()).any(|v| !v.is_finite()) {
            return Err(Error::ConfigError(
                "calibration curve contains non-finite samples".to_string(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = attenuation
            .iter()
            .copied()
            .zip(depth.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut knots_x: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut knots_y: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut merged = 1.0;
        for (x, y) in pairs {
            match knots_x.last() {
                Some(&last) if last == x => {
                    // Running mean of depths sharing one attenuation.
                    merged += 1.0;
                    if let Some(prev) = knots_y.last_mut() {
                        *prev += (y - *prev) / merged;
                    }
                }
                _ => {
                    merged = 1.0;
                    knots_x.push(x);
                    knots_y.push(y);
                }
            }
        }

        if knots_x.len() < 2 {
            return Err(Error::ConfigError(
                "calibration curve has no attenuation range to invert".to_string(),
            ));
        }

        Ok(Self {
            attenuation: knots_x,
            depth: knots_y,
        })
    }

    /// Attenuation knots, strictly increasing.
    #[must_use]
    pub fn attenuation(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.attenuation[..])
    }

    /// Water thickness at each knot.
    #[must_use]
    pub fn depths(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.depth[..])
    }

    /// Number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attenuation.len()
    }

    /// Always false for a constructed curve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attenuation.is_empty()
    }

    /// Attenuation span covered by the knots.
    #[must_use]
    pub fn span(&self) -> (f64, f64) {
        (self.attenuation[0], self.attenuation[self.len() - 1])
    }

    /// True when thickness rises strictly with attenuation.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.depth.windows(2).all(|w| w[1] > w[0])
    }

    /// Equivalent water thickness for one attenuation value.
    ///
    /// NaN maps to NaN.
    #[must_use]
    pub fn depth_at(&self, attenuation: f64) -> f64 {
        if attenuation.is_nan() {
            return f64::NAN;
        }
        let xp = &self.attenuation;
        let fp = &self.depth;
        let last = xp.len() - 1;

        // Bracketing segment, clamped to the end segments for extrapolation.
        let idx = xp.partition_point(|&v| v < attenuation).clamp(1, last);

        let lo = idx - 1;
        let t = (attenuation - xp[lo]) / (xp[idx] - xp[lo]);
        fp[lo] + t * (fp[idx] - fp[lo])
    }

    /// Replaces every sinogram value with its equivalent water thickness.
    pub fn apply(&self, sinogram: &mut Sinogram) {
        sinogram.par_mapv_inplace(|a| self.depth_at(a));
    }
}
