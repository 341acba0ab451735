//! ctsim-filter: Frequency-domain ramp filtering of sinograms.
//!
//! Each angle row is zero-padded past twice its length, transformed,
//! weighted by an apodised Ram-Lak kernel and transformed back. Rows are
//! independent and filtered in parallel.
//!
#![warn(missing_docs)]

mod kernel;
mod ramp;

pub use kernel::{fft_frequencies, filter_kernel, padded_length};
pub use ramp::{ramp_filter, RampFilter, RampFilterConfig};
