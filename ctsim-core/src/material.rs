//! Material attenuation coefficients.
#![allow(clippy::doc_markdown)]

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the air reference material.
pub const AIR: &str = "Air";

/// Name of the water reference material.
pub const WATER: &str = "Water";

/// Linear attenuation coefficients (cm⁻¹), shaped `[materials, energies]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoefficientTable {
    coeffs: Array2<f64>,
}

impl CoefficientTable {
    /// Wraps a `[materials, energies]` array.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if the table is empty or holds
    /// non-finite values.
    pub fn new(coeffs: Array2<f64>) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(Error::ConfigError(
                "coefficient table must be non-empty".to_string(),
            ));
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(Error::ConfigError(
                "coefficient table contains non-finite values".to_string(),
            ));
        }
        Ok(Self { coeffs })
    }

    /// A single material given as a 1-D energy vector becomes one row.
    ///
    /// # Errors
    /// Same conditions as [`CoefficientTable::new`].
    pub fn single(coeffs: Array1<f64>) -> Result<Self> {
        Self::new(coeffs.insert_axis(Axis(0)))
    }

    /// A single material at a single energy.
    ///
    /// # Errors
    /// Same conditions as [`CoefficientTable::new`].
    pub fn scalar(coeff: f64) -> Result<Self> {
        Self::new(Array2::from_elem((1, 1), coeff))
    }

    /// Number of materials (rows).
    #[must_use]
    pub fn materials(&self) -> usize {
        self.coeffs.nrows()
    }

    /// Number of energy bins (columns).
    #[must_use]
    pub fn energies(&self) -> usize {
        self.coeffs.ncols()
    }

    /// Coefficients of one material across energies.
    #[must_use]
    pub fn material(&self, index: usize) -> ArrayView1<'_, f64> {
        self.coeffs.row(index)
    }

    /// The whole table.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.coeffs.view()
    }

    /// Checks the energy axis against a spectrum length.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] when the counts differ.
    pub fn ensure_energies(&self, energies: usize) -> Result<()> {
        if self.energies() == energies {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                what: "coefficient energies",
                expected: energies,
                found: self.energies(),
            })
        }
    }
}

/// Capability for looking up material coefficients.
///
/// Spectral table loading lives with the caller; the simulation only
/// needs the energy grid and per-material coefficients.
pub trait MaterialTable: Send + Sync {
    /// Energy grid in MeV.
    fn mev(&self) -> ArrayView1<'_, f64>;

    /// All coefficients, shaped `[materials, energies]`.
    fn coeffs(&self) -> ArrayView2<'_, f64>;

    /// Coefficients of a named material across energies.
    ///
    /// # Errors
    /// Returns [`Error::UnknownMaterial`] if the name is not present.
    fn coeff(&self, name: &str) -> Result<Array1<f64>>;

    /// Coefficients of a named material as a one-row table.
    ///
    /// # Errors
    /// Propagates lookup failures from [`MaterialTable::coeff`].
    fn coefficient_table(&self, name: &str) -> Result<CoefficientTable> {
        CoefficientTable::single(self.coeff(name)?)
    }
}

/// In-memory material table keyed by name.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterialLibrary {
    names: Vec<String>,
    mev: Array1<f64>,
    coeffs: Array2<f64>,
}

impl MaterialLibrary {
    /// Creates an empty library on the given energy grid.
    #[must_use]
    pub fn new(mev: Array1<f64>) -> Self {
        let energies = mev.len();
        Self {
            names: Vec::new(),
            mev,
            coeffs: Array2::zeros((0, energies)),
        }
    }

    /// Adds a material; replaces the coefficients if the name exists.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `coeffs` does not match the
    /// energy grid, or [`Error::ConfigError`] for non-finite values.
    pub fn with_material(mut self, name: impl Into<String>, coeffs: Array1<f64>) -> Result<Self> {
        let name = name.into();
        if coeffs.len() != self.mev.len() {
            return Err(Error::ShapeMismatch {
                what: "material energies",
                expected: self.mev.len(),
                found: coeffs.len(),
            });
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(Error::ConfigError(format!(
                "material '{name}' has non-finite coefficients"
            )));
        }

        if let Some(index) = self.index_of(&name) {
            self.coeffs.row_mut(index).assign(&coeffs);
        } else {
            self.coeffs
                .push_row(coeffs.view())
                .map_err(|e| Error::ConfigError(format!("cannot add material: {e}")))?;
            self.names.push(name);
        }
        Ok(self)
    }

    /// Row index of a material.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Material names in row order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no material has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl MaterialTable for MaterialLibrary {
    fn mev(&self) -> ArrayView1<'_, f64> {
        self.mev.view()
    }

    fn coeffs(&self) -> ArrayView2<'_, f64> {
        self.coeffs.view()
    }

    fn coeff(&self, name: &str) -> Result<Array1<f64>> {
        self.index_of(name)
            .map(|index| self.coeffs.row(index).to_owned())
            .ok_or_else(|| Error::UnknownMaterial(name.to_string()))
    }
}
