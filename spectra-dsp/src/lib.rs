//! Sample-domain DSP for the spectral visualizer: the magnitude-spectrum
//! analysis front end that produces renderer frames, and a heterodyne
//! frequency shifter for live audio blocks.
#![no_std]

pub mod analysis;
pub mod heterodyne;

pub use analysis::{
    magnitude_spectrum, normalize_sample, normalize_samples, peak_bin, process_frame, BIN_COUNT,
    FRAME_SIZE,
};
pub use heterodyne::FrequencyShifter;
