//! Ramp filter frequency response.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use ndarray::Array1;
use std::f64::consts::FRAC_PI_2;

/// Transform length for `samples` per row: the smallest power of two that
/// is at least `2 * samples - 1`, so circular convolution does not wrap
/// into the kept samples.
#[must_use]
pub fn padded_length(samples: usize) -> usize {
    (2 * samples).saturating_sub(1).max(1).next_power_of_two()
}

/// Standard FFT bin frequencies in cycles per sample.
///
/// Bins `0..ceil(m/2)` are non-negative, the rest wrap to negative values,
/// giving the range `[-0.5, 0.5)`.
#[must_use]
pub fn fft_frequencies(m: usize) -> Array1<f64> {
    let positive = m.div_ceil(2);
    Array1::from_shape_fn(m, |i| {
        let k = if i < positive { i as i64 } else { i as i64 - m as i64 };
        k as f64 / m as f64
    })
}

/// Apodised Ram-Lak response of length `m`.
///
/// `f_max * |f| * cos(pi/2 * f / f_max)^alpha` with `f_max = 1 / (2 *
/// pixel_scale)`. The zero-frequency bin uses `1 / (6m)`, a sixth of the
/// first non-zero bin. The cosine is floored at zero before the exponent,
/// for any `alpha`, so frequencies past `f_max` are cut.
#[must_use]
pub fn filter_kernel(m: usize, pixel_scale: f64, alpha: f64) -> Array1<f64> {
    let f_max = 1.0 / (2.0 * pixel_scale);
    let mut freqs = fft_frequencies(m);
    if let Some(dc) = freqs.first_mut() {
        *dc = 1.0 / (6.0 * m as f64);
    }

    freqs.mapv_into(|f| {
        let window = (FRAC_PI_2 * f / f_max).cos().max(0.0).powf(alpha);
        f_max * f.abs() * window
    })
}
