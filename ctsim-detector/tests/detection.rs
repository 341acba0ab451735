#![allow(clippy::cast_precision_loss, clippy::unreadable_literal)]
use approx::assert_relative_eq;
use ctsim_core::{CoefficientTable, DepthProfile, EnergySpectrum, Error};
use ctsim_detector::{detect, DetectorConfig, NoiseModel, PhotonDetector};
use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn mean(values: &Array1<f64>) -> f64 {
    values.sum() / values.len() as f64
}

fn std_dev(values: &Array1<f64>) -> f64 {
    let m = mean(values);
    (values.mapv(|v| (v - m).powi(2)).sum() / (values.len() - 1) as f64).sqrt()
}

#[test]
fn test_shape_mismatch_energies() {
    let spectrum = EnergySpectrum::new(array![1.0e8, 1.0e8, 1.0e8]).unwrap();
    let coeffs = CoefficientTable::single(array![0.2, 0.1]).unwrap();
    let depths = DepthProfile::uniform(1.0, 8).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let result = detect(&spectrum, &coeffs, &depths, 1.0e4, &mut rng);
    assert!(matches!(
        result,
        Err(Error::ShapeMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
}

#[test]
fn test_shape_mismatch_materials() {
    let spectrum = EnergySpectrum::new(array![1.0e8, 1.0e8]).unwrap();
    let coeffs = CoefficientTable::new(array![[0.2, 0.1], [0.5, 0.4], [0.0, 0.0]]).unwrap();
    let depths = DepthProfile::new(Array2::from_elem((2, 8), 1.0)).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let result = detect(&spectrum, &coeffs, &depths, 1.0e4, &mut rng);
    assert!(matches!(
        result,
        Err(Error::ShapeMismatch {
            expected: 3,
            found: 2,
            ..
        })
    ));
}

#[test]
fn test_floor_property() {
    // Zero flux and no noise sources leaves nothing but the floor.
    let spectrum = EnergySpectrum::new(array![0.0, 0.0]).unwrap();
    let coeffs = CoefficientTable::single(array![0.2, 0.1]).unwrap();
    let depths = DepthProfile::uniform(50.0, 16).unwrap();
    let detector = PhotonDetector::with_config(
        DetectorConfig::new()
            .with_background_mean(0.0)
            .with_scatter_fraction(0.0),
    );

    let counts = detector
        .detect(&spectrum, &coeffs, &depths, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert!(counts.iter().all(|&c| (c - 1.0).abs() < f64::EPSILON));

    // Heavy attenuation with the default noise never drops below one.
    let spectrum = EnergySpectrum::new(array![1.0e6, 1.0e6]).unwrap();
    let counts = PhotonDetector::new()
        .detect(&spectrum, &coeffs, &depths, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert!(counts.iter().all(|&c| c >= 1.0));
}

#[test]
fn test_zero_depth_sanity() {
    let flux = 1.0e9;
    let spectrum = EnergySpectrum::monoenergetic(flux).unwrap();
    let coeffs = CoefficientTable::scalar(0.2).unwrap();
    let depths = DepthProfile::uniform(0.0, 64).unwrap();

    let runs = 10;
    let total: f64 = (0..runs)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            mean(&detect(&spectrum, &coeffs, &depths, 1.0e4, &mut rng).unwrap())
        })
        .sum();
    let average = total / runs as f64;

    let model = NoiseModel::new(&DetectorConfig::new(), spectrum.total_flux());
    let expected = model.mean(flux);
    assert_relative_eq!(expected, flux + 5.0e5 + 1.0e-6 * flux, max_relative = 1e-12);
    assert_relative_eq!(average, expected, max_relative = 0.01);
}

#[test]
fn test_uniform_slab_round_trip() {
    let spectrum = EnergySpectrum::monoenergetic(1.0e10).unwrap();
    let coeffs = CoefficientTable::scalar(0.2).unwrap();
    let slab = DepthProfile::uniform(5.0, 64).unwrap();
    let air = DepthProfile::uniform(0.0, 64).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    let counts = detect(&spectrum, &coeffs, &slab, 1.0e4, &mut rng).unwrap();
    let reference = detect(&spectrum, &coeffs, &air, 1.0e4, &mut rng).unwrap();
    let attenuation = (&counts / &reference).mapv(|r| -r.ln());

    assert!(attenuation.iter().all(|&a| (a - 1.0).abs() < 0.15));
    assert!((mean(&attenuation) - 1.0).abs() < 0.05);
}

#[test]
fn test_higher_dose_reduces_relative_noise() {
    let spectrum = EnergySpectrum::monoenergetic(1.0e9).unwrap();
    let coeffs = CoefficientTable::scalar(0.2).unwrap();
    let depths = DepthProfile::uniform(0.0, 256).unwrap();

    let low = detect(&spectrum, &coeffs, &depths, 1.0e4, &mut StdRng::seed_from_u64(8)).unwrap();
    let high = detect(&spectrum, &coeffs, &depths, 1.0e6, &mut StdRng::seed_from_u64(8)).unwrap();

    assert!(std_dev(&high) * 3.0 < std_dev(&low));
    assert_relative_eq!(mean(&high), mean(&low), max_relative = 0.02);
}

#[test]
fn test_multi_material_stack() {
    let spectrum = EnergySpectrum::new(array![5.0e9, 5.0e9]).unwrap();
    let coeffs = CoefficientTable::new(array![[0.2, 0.1], [0.0, 0.0]]).unwrap();
    let depths = DepthProfile::from_vector(array![1.0, 3.0], 2).unwrap();
    assert_eq!(depths.samples(), 1);

    let counts = PhotonDetector::with_config(DetectorConfig::new().with_dose_factor(1.0e6))
        .detect(&spectrum, &coeffs, &depths, &mut StdRng::seed_from_u64(13))
        .unwrap();
    let expected = 5.0e9 * (-0.2_f64).exp() + 5.0e9 * (-0.1_f64).exp() + 5.0e5 + 1.0e4;
    assert_eq!(counts.len(), 1);
    assert_relative_eq!(counts[0], expected, max_relative = 0.01);
}
