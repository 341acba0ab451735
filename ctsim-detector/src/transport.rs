//! Beer-Lambert photon transport through stacked materials.

use ctsim_core::{CoefficientTable, DepthProfile, EnergySpectrum, Error, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};

/// Attenuates an `[energies, samples]` photon grid by one material.
///
/// `photons[e, s] *= exp(-coeffs[e] * depths[s])`
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if `coeffs` does not match the energy
/// axis or `depths` does not match the sample axis.
pub fn attenuate(
    mut photons: Array2<f64>,
    coeffs: ArrayView1<'_, f64>,
    depths: ArrayView1<'_, f64>,
) -> Result<Array2<f64>> {
    let (energies, samples) = photons.dim();
    if coeffs.len() != energies {
        return Err(Error::ShapeMismatch {
            what: "attenuation energies",
            expected: energies,
            found: coeffs.len(),
        });
    }
    if depths.len() != samples {
        return Err(Error::ShapeMismatch {
            what: "attenuation samples",
            expected: samples,
            found: depths.len(),
        });
    }

    Zip::from(&mut photons)
        .and_broadcast(coeffs.insert_axis(Axis(1)))
        .and_broadcast(depths.insert_axis(Axis(0)))
        .for_each(|p, &mu, &depth| *p *= (-mu * depth).exp());
    Ok(photons)
}

/// Expected (noise-free) photons reaching each detector sample.
///
/// The spectrum is spread over every sample, attenuated material by
/// material, then summed over energy.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if the coefficient energies
/// differ from the spectrum length or the depth materials differ from the
/// coefficient materials.
pub fn expected_counts(
    spectrum: &EnergySpectrum,
    coeffs: &CoefficientTable,
    depths: &DepthProfile,
) -> Result<Array1<f64>> {
    coeffs.ensure_energies(spectrum.len())?;
    depths.ensure_materials(coeffs.materials())?;

    let flux = spectrum.flux();
    let grid = Array2::from_shape_fn((spectrum.len(), depths.samples()), |(e, _)| flux[e]);

    let grid = (0..coeffs.materials()).try_fold(grid, |grid, m| {
        attenuate(grid, coeffs.material(m), depths.material(m))
    })?;

    Ok(grid.sum_axis(Axis(0)))
}
