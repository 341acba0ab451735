//! ctsim-detector: Photon detection model for CT acquisition simulation.
//!
//! Turns material depths and a source spectrum into detector counts:
//! - **Transport** - sequential Beer-Lambert attenuation per material
//! - **Response** - polyenergetic sum over the energy axis
//! - **Noise** - quantum, background and scatter Poisson terms
//!
#![warn(missing_docs)]

mod config;
mod detector;
mod noise;
mod transport;

pub use config::{DetectorConfig, REFERENCE_DOSE};
pub use detector::{detect, PhotonDetector};
pub use noise::NoiseModel;
pub use transport::{attenuate, expected_counts};
