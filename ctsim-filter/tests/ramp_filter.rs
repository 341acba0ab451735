#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
use approx::assert_abs_diff_eq;
use ctsim_core::{Error, Sinogram};
use ctsim_filter::{filter_kernel, padded_length, ramp_filter, RampFilter, RampFilterConfig};
use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const SCALE: f64 = 0.1;
const ALPHA: f64 = 0.001;

fn random_sinogram(angles: usize, samples: usize, seed: u64) -> Sinogram {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((angles, samples), |_| rng.gen_range(-5.0..5.0))
}

#[test]
fn test_shape_is_preserved() {
    for &(angles, samples) in &[(1, 1), (3, 2), (5, 17), (8, 64), (2, 100)] {
        let out = ramp_filter(&Sinogram::zeros((angles, samples)), SCALE, ALPHA).unwrap();
        assert_eq!(out.dim(), (angles, samples));
    }
}

#[test]
fn test_filter_is_linear() {
    let x = random_sinogram(6, 40, 1);
    let y = random_sinogram(6, 40, 2);
    let (a, b) = (2.5, -0.75);

    let combined = ramp_filter(&(&x * a + &y * b), SCALE, ALPHA).unwrap();
    let separate =
        ramp_filter(&x, SCALE, ALPHA).unwrap() * a + ramp_filter(&y, SCALE, ALPHA).unwrap() * b;

    for (lhs, rhs) in combined.iter().zip(separate.iter()) {
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-9);
    }
}

#[test]
fn test_rows_are_independent() {
    let sinogram = random_sinogram(4, 33, 7);
    let full = ramp_filter(&sinogram, SCALE, ALPHA).unwrap();

    let mut changed = sinogram.clone();
    changed.row_mut(2).fill(100.0);
    let partial = ramp_filter(&changed, SCALE, ALPHA).unwrap();

    for row in [0, 1, 3] {
        for (lhs, rhs) in full.row(row).iter().zip(partial.row(row).iter()) {
            assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-12);
        }
    }

    let single = ramp_filter(&sinogram.slice(ndarray::s![1..2, ..]).to_owned(), SCALE, ALPHA)
        .unwrap();
    for (lhs, rhs) in full.row(1).iter().zip(single.row(0).iter()) {
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-12);
    }
}

#[test]
fn test_impulse_response_shape() {
    let samples = 31;
    let mut impulse = Sinogram::zeros((1, samples));
    impulse[[0, samples / 2]] = 1.0;

    let out = ramp_filter(&impulse, SCALE, 0.0).unwrap();
    let centre = samples / 2;
    assert!(out[[0, centre]] > 0.0);
    assert!(out[[0, centre - 1]] < 0.0);
    assert!(out[[0, centre + 1]] < 0.0);
    assert!(out.row(0).iter().all(|&v| v <= out[[0, centre]]));
}

#[test]
fn test_single_sample_uses_dc_weight() {
    let out = ramp_filter(&array![[3.0], [-1.5]], SCALE, ALPHA).unwrap();
    let dc = filter_kernel(padded_length(1), SCALE, ALPHA)[0];
    assert_abs_diff_eq!(out[[0, 0]], 3.0 * dc, epsilon = 1e-12);
    assert_abs_diff_eq!(out[[1, 0]], -1.5 * dc, epsilon = 1e-12);
}

#[test]
fn test_zero_alpha_is_bare_ramp() {
    let sinogram = random_sinogram(2, 16, 11);
    let bare = ramp_filter(&sinogram, SCALE, 0.0).unwrap();
    let config = RampFilterConfig::new().with_alpha(0.0);
    let via_struct = RampFilter::with_config(config).apply(&sinogram, SCALE).unwrap();
    assert_eq!(bare, via_struct);

    let apodised = ramp_filter(&sinogram, SCALE, 2.0).unwrap();
    let diff: f64 = (&bare - &apodised).iter().map(|d| d.abs()).sum();
    assert!(diff > 0.0);
}

#[test]
fn test_zeros_map_to_zeros() {
    let out = RampFilter::new().apply(&Sinogram::zeros((3, 9)), SCALE).unwrap();
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_invalid_pixel_scale() {
    let sinogram = Sinogram::zeros((2, 4));
    for scale in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            ramp_filter(&sinogram, scale, ALPHA),
            Err(Error::ConfigError(_))
        ));
    }
}

/// Spatial response of the kernel, from a direct inverse DFT.
///
/// The kernel is real and symmetric, so only the cosine terms survive.
fn spatial_kernel(m: usize, pixel_scale: f64, alpha: f64) -> Array1<f64> {
    let kernel = filter_kernel(m, pixel_scale, alpha);
    Array1::from_shape_fn(m, |n| {
        kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| w * (2.0 * PI * (k * n) as f64 / m as f64).cos())
            .sum::<f64>()
            / m as f64
    })
}

#[test]
fn test_two_sample_reference_values() {
    // S = 2 pads to m = 4. With f_max = 1 and no apodisation the kernel is
    // [1/24, 1/4, 1/2, 1/4], so h[0] = 25/96 and h[+-1] = -11/96.
    let out = ramp_filter(&array![[1.0, 0.0], [0.0, 1.0]], 0.5, 0.0).unwrap();
    assert_abs_diff_eq!(out[[0, 0]], 25.0 / 96.0, epsilon = 1e-12);
    assert_abs_diff_eq!(out[[0, 1]], -11.0 / 96.0, epsilon = 1e-12);
    assert_abs_diff_eq!(out[[1, 0]], -11.0 / 96.0, epsilon = 1e-12);
    assert_abs_diff_eq!(out[[1, 1]], 25.0 / 96.0, epsilon = 1e-12);
}

#[test]
fn test_matches_direct_linear_convolution() {
    let samples = 13;
    let alpha = 0.5;
    let m = padded_length(samples);
    assert!(m >= 2 * samples - 1);

    let h = spatial_kernel(m, SCALE, alpha);
    let sinogram = random_sinogram(2, samples, 31);
    let out = ramp_filter(&sinogram, SCALE, alpha).unwrap();

    // Every lag in -(S-1)..=(S-1) has its own kernel tap, so no output
    // sample picks up a wrapped contribution.
    for (row, filtered) in sinogram.rows().into_iter().zip(out.rows()) {
        for s in 0..samples {
            let direct: f64 = (0..samples)
                .map(|j| {
                    let lag = s as i64 - j as i64;
                    row[j] * h[lag.rem_euclid(m as i64) as usize]
                })
                .sum();
            assert_abs_diff_eq!(filtered[s], direct, epsilon = 1e-9);
        }
    }
}
