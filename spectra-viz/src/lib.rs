//! Frequency-domain visualization engine: coordinate mapping between
//! frequency/decibel and pixel space, palette-driven scrolling waterfalls,
//! and a grid-and-bands spectrum view, drawn through any
//! `embedded-graphics` target.
//!
//! The crate is pure rendering logic: an external scheduler feeds magnitude
//! frames into `update`, calls `render` once per display frame, and forwards
//! surface resizes to `on_resize`.
#![no_std]
extern crate alloc;

pub mod bands;
pub mod levels;
pub mod mapping;
pub mod palette;
pub mod spectrum;
pub mod style;
pub mod waterfall;

pub use bands::{Band, BandSet};
pub use levels::{LevelBuffer, LevelSource};
pub use mapping::{
    decibels_to_value, frequency_to_x, optimal_freq_step, remap, value_to_decibels,
    x_to_frequency, AmplitudeRange, FrequencyScale,
};
pub use palette::{ColorStop, Palette};
pub use spectrum::{quantize_db, Spectrum};
pub use style::SpectrumStyle;
pub use waterfall::{Waterfall, WaterfallLayout};
