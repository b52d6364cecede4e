use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

/// A highlighted frequency sub-range, keyed by its exact bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub start_hz: f32,
    pub end_hz: f32,
    pub color: Rgb888,
    pub label: Option<String>,
}

/// Band annotations in insertion order, with linear lookup on the
/// `(start_hz, end_hz)` key. Adding with an existing key overwrites.
#[derive(Default)]
pub struct BandSet {
    bands: Vec<Band>,
}

impl BandSet {
    pub const fn new() -> Self {
        Self { bands: Vec::new() }
    }

    pub fn add(&mut self, band: Band) {
        if let Some(existing) = self
            .bands
            .iter_mut()
            .find(|b| b.start_hz == band.start_hz && b.end_hz == band.end_hz)
        {
            *existing = band;
        } else {
            self.bands.push(band);
        }
    }

    pub fn remove(&mut self, start_hz: f32, end_hz: f32) {
        self.bands
            .retain(|b| !(b.start_hz == start_hz && b.end_hz == end_hz));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
