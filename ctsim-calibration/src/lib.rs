//! ctsim-calibration: Turning detector counts into attenuation.
//!
//! - **Linearisation** - `-ln(raw / air)` against a simulated air scan
//! - **Beam hardening** - inversion of a simulated water curve into
//!   equivalent water thickness
//! - **Hounsfield** - rescaling reconstructions against a water reference
//!
#![warn(missing_docs)]

mod calibrate;
mod config;
mod curve;
mod hounsfield;

pub use calibrate::{calibrate, Calibrator};
pub use config::{CalibrationConfig, NonFinitePolicy};
pub use curve::CalibrationCurve;
pub use hounsfield::{
    to_hounsfield, HounsfieldConfig, HounsfieldConverter, HounsfieldReference, HOUNSFIELD_FLOOR,
};
