use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
};

#[cfg(feature = "logging")]
use defmt::info;
#[cfg(feature = "logging")]
use defmt_rtt as _;

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::levels::{LevelBuffer, LevelSource};
use crate::mapping::{x_to_frequency, FrequencyScale};
use crate::palette::{ColorStop, Palette};

const BYTES_PER_PIXEL: usize = 4;

/// How pixel columns map onto frequency bins.
#[derive(Clone, Copy, Debug)]
pub enum WaterfallLayout {
    /// One column per bin; image width is pinned to the bin count.
    Bins,
    /// Columns span the surface width, each looked up through the
    /// frequency scale.
    Frequency(FrequencyScale),
}

/// Scrolling spectrogram over a persistent RGBA image.
///
/// Every render step shifts all rows down one and paints the newest frame
/// into row 0 through the palette. Resizing reallocates the image, so
/// scrolled history is lost by design.
pub struct Waterfall {
    sample_rate: f32,
    layout: WaterfallLayout,
    levels: LevelBuffer,
    palette: Palette,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Waterfall {
    pub fn new(
        bin_count: usize,
        sample_rate: f32,
        layout: WaterfallLayout,
        source: LevelSource,
        width: u32,
        height: u32,
    ) -> Self {
        let width = match layout {
            WaterfallLayout::Bins => bin_count as u32,
            WaterfallLayout::Frequency(_) => width,
        };
        Self {
            sample_rate,
            layout,
            levels: LevelBuffer::new(bin_count, source),
            palette: Palette::default(),
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The owned RGBA image, row 0 first.
    pub fn image(&self) -> &[u8] {
        &self.pixels
    }

    /// Replace the color map. Rows already scrolled keep their old colors.
    pub fn set_palette(&mut self, stops: &[ColorStop]) {
        self.palette = Palette::from_stops(stops);
        #[cfg(feature = "logging")]
        info!("waterfall palette rebuilt from {} stops", stops.len());
    }

    /// Store a new raw frame and flag the next render.
    pub fn update(&mut self, frame: Option<&[f32]>) {
        self.levels.update(frame);
    }

    /// Reallocate the image for new surface dimensions. History is
    /// discarded; unchanged dimensions are a no-op. A zero dimension is
    /// legal and simply produces an empty image until the next resize.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let width = match self.layout {
            WaterfallLayout::Bins => self.levels.len() as u32,
            WaterfallLayout::Frequency(_) => width,
        };
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * BYTES_PER_PIXEL];
        self.levels.mark_dirty();
        #[cfg(feature = "logging")]
        info!("waterfall resized to {}x{}", width, height);
    }

    /// Scroll one row and paint the newest frame into row 0. Returns
    /// whether anything was drawn; a clean buffer or empty image skips the
    /// whole pass.
    pub fn render(&mut self) -> bool {
        if !self.levels.is_dirty() || self.pixels.is_empty() || self.levels.is_empty() {
            return false;
        }

        let row_bytes = self.width as usize * BYTES_PER_PIXEL;
        let len = self.pixels.len();
        if len > row_bytes {
            self.pixels.copy_within(0..len - row_bytes, row_bytes);
        }

        match self.layout {
            WaterfallLayout::Bins => {
                let levels = self.levels.levels();
                for (x, &level) in levels.iter().enumerate().take(self.width as usize) {
                    let rgba = self.palette.rgba(level);
                    self.pixels[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL]
                        .copy_from_slice(&rgba);
                }
            }
            WaterfallLayout::Frequency(scale) => {
                let n = self.levels.len();
                let max_freq = self.sample_rate / 2.0;
                for x in 0..self.width as usize {
                    let freq =
                        x_to_frequency(x as f32, scale, self.sample_rate, self.width as f32);
                    let bin = if max_freq > 0.0 {
                        ((freq / max_freq) * n as f32) as usize
                    } else {
                        0
                    };
                    let level = self.levels.levels()[bin.min(n - 1)];
                    let rgba = self.palette.rgba(level);
                    self.pixels[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL]
                        .copy_from_slice(&rgba);
                }
            }
        }

        self.levels.clear_dirty();
        true
    }

    /// Blit the image onto a draw target at the origin.
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let area = Rectangle::new(Point::zero(), Size::new(self.width, self.height));
        target.fill_contiguous(
            &area,
            self.pixels
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|px| Rgb888::new(px[0], px[1], px[2])),
        )
    }
}
