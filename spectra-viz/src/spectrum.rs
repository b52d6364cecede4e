use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

#[cfg(feature = "logging")]
use defmt::info;
#[cfg(feature = "logging")]
use defmt_rtt as _;

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::bands::{Band, BandSet};
use crate::levels::{LevelBuffer, LevelSource};
use crate::mapping::{
    decibels_to_value, frequency_to_x, optimal_freq_step, remap, value_to_decibels,
    AmplitudeRange, FrequencyScale, LOG_FLOOR_HZ,
};
use crate::style::{blend, SpectrumStyle};

/// Bands narrower than this many pixels draw no label.
const BAND_LABEL_MIN_PX: f32 = 40.0;
const BAND_FILL_ALPHA: f32 = 0.25;
const BAND_LABEL_STRIP_PX: u32 = 15;

/// Draw-on-demand spectrum curve with decibel/frequency grid and band
/// overlays. Holds the most recent quantized frame; `render` is a no-op
/// until `update` (or a resize) marks it dirty.
pub struct Spectrum {
    scale: FrequencyScale,
    sample_rate: f32,
    amplitude: AmplitudeRange,
    width: u32,
    height: u32,
    levels: LevelBuffer,
    bands: BandSet,
    style: SpectrumStyle,
    // Height-indexed under-curve fill colors, rebuilt on resize.
    fill_gradient: Vec<Rgb888>,
}

impl Spectrum {
    pub fn new(
        bin_count: usize,
        sample_rate: f32,
        scale: FrequencyScale,
        amplitude: AmplitudeRange,
        width: u32,
        height: u32,
    ) -> Self {
        let mut spectrum = Self {
            scale,
            sample_rate,
            amplitude,
            width,
            height,
            levels: LevelBuffer::new(bin_count, LevelSource::Quantized),
            bands: BandSet::new(),
            style: SpectrumStyle::default(),
            fill_gradient: Vec::new(),
        };
        spectrum.rebuild_gradient();
        spectrum
    }

    pub fn with_style(mut self, style: SpectrumStyle) -> Self {
        self.style = style;
        self.rebuild_gradient();
        self
    }

    pub fn style(&self) -> &SpectrumStyle {
        &self.style
    }

    pub fn bands(&self) -> &BandSet {
        &self.bands
    }

    /// Store a new magnitude frame (0..255 dB-quantized) and flag a redraw.
    pub fn update(&mut self, frame: Option<&[f32]>) {
        self.levels.update(frame);
    }

    pub fn add_band(
        &mut self,
        start_hz: f32,
        end_hz: f32,
        color: Option<Rgb888>,
        label: Option<&str>,
    ) {
        self.bands.add(Band {
            start_hz,
            end_hz,
            color: color.unwrap_or(self.style.band_default),
            label: label.map(|l| l.to_string()),
        });
        self.levels.mark_dirty();
    }

    pub fn remove_band(&mut self, start_hz: f32, end_hz: f32) {
        self.bands.remove(start_hz, end_hz);
        self.levels.mark_dirty();
    }

    /// The scheduler calls this with the surface's new pixel dimensions.
    /// Unchanged dimensions are a no-op.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_gradient();
        self.levels.mark_dirty();
        #[cfg(feature = "logging")]
        info!("spectrum resized to {}x{}", width, height);
    }

    fn rebuild_gradient(&mut self) {
        self.fill_gradient.clear();
        if self.height == 0 {
            return;
        }
        self.fill_gradient.reserve(self.height as usize);
        let denom = (self.height - 1).max(1) as f32;
        for y in 0..self.height {
            let t = y as f32 / denom;
            let color = blend(self.style.fill_bottom, self.style.fill_top, t);
            // Fades from 0.3 alpha at the top to 0.1 at the bottom.
            let alpha = 0.3 + (0.1 - 0.3) * t;
            self.fill_gradient
                .push(blend(color, self.style.background, alpha));
        }
    }

    /// Draw the current frame. Skipped entirely while no new data (or
    /// resize/band change) has arrived; clears the dirty flag after drawing.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if !self.levels.is_dirty() {
            return Ok(());
        }
        if self.width == 0 || self.height == 0 {
            // Zero-size surface: nothing to draw, stay re-enterable.
            self.levels.clear_dirty();
            return Ok(());
        }

        let area = Rectangle::new(Point::zero(), Size::new(self.width, self.height));
        target.fill_solid(&area, self.style.background)?;

        self.draw_decibel_scale(target)?;
        self.draw_frequency_grid(target)?;
        self.draw_bands(target)?;
        self.draw_curve(target)?;

        self.levels.clear_dirty();
        Ok(())
    }

    fn draw_decibel_scale<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let line_style = PrimitiveStyle::with_stroke(self.style.grid, 1);
        let char_style = MonoTextStyle::new(&FONT_6X10, self.style.scale_text);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Middle)
            .build();

        let h = self.height as f32;
        let mut db = self.amplitude.min_db;
        while db <= self.amplitude.max_db {
            let y = (h - remap(db, self.amplitude.min_db, self.amplitude.max_db, 0.0, h)) as i32;
            let y = y.min(self.height as i32 - 1);

            Line::new(Point::new(0, y), Point::new(self.width as i32 - 1, y))
                .into_styled(line_style)
                .draw(target)?;

            let label = format!("{} dB", db as i32);
            Text::with_text_style(&label, Point::new(40, y - 5), char_style, text_style)
                .draw(target)?;

            db += 10.0;
        }
        Ok(())
    }

    fn draw_frequency_grid<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let max_freq = self.sample_rate / 2.0;
        let step = optimal_freq_step(max_freq, self.scale);

        let line_style = PrimitiveStyle::with_stroke(self.style.grid, 1);
        let char_style = MonoTextStyle::new(&FONT_6X10, self.style.scale_text);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();

        let mut freq = 0.0;
        while freq <= max_freq {
            let x = self.clamp_x(frequency_to_x(freq, self.scale, self.sample_rate, self.width as f32));

            Line::new(Point::new(x, 0), Point::new(x, self.height as i32 - 1))
                .into_styled(line_style)
                .draw(target)?;

            // Label only frequencies the log floor can represent.
            if freq >= LOG_FLOOR_HZ {
                let label = format_frequency(freq);
                Text::with_text_style(
                    &label,
                    Point::new(x, self.height as i32 - 20),
                    char_style,
                    text_style,
                )
                .draw(target)?;
            }
            freq += step;
        }
        Ok(())
    }

    fn draw_bands<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let char_style_of = |color| MonoTextStyle::new(&FONT_6X10, color);
        let centered = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();

        for band in self.bands.iter() {
            let w = self.width as f32;
            let start_x = frequency_to_x(band.start_hz, self.scale, self.sample_rate, w);
            let end_x = frequency_to_x(band.end_hz, self.scale, self.sample_rate, w);
            let band_px = end_x - start_x;

            // Labelled bands mark a strip along the bottom edge; unlabelled
            // ones tint the full height.
            let top_y = if band.label.is_some() {
                self.height.saturating_sub(BAND_LABEL_STRIP_PX)
            } else {
                0
            };

            let fill = blend(band.color, self.style.background, BAND_FILL_ALPHA);
            let rect = Rectangle::new(
                Point::new(start_x as i32, top_y as i32),
                Size::new(band_px.max(0.0) as u32, self.height - top_y),
            );
            target.fill_solid(&rect, fill)?;

            let border = PrimitiveStyle::with_stroke(band.color, 1);
            for x in [self.clamp_x(start_x), self.clamp_x(end_x)] {
                Line::new(Point::new(x, top_y as i32), Point::new(x, self.height as i32 - 1))
                    .into_styled(border)
                    .draw(target)?;
            }

            if band_px > BAND_LABEL_MIN_PX {
                let mut center_x = start_x + band_px / 2.0;
                if center_x > w {
                    center_x = start_x + (w - start_x) / 2.0;
                }
                let anchor = match &band.label {
                    Some(_) => Point::new(center_x as i32, self.height as i32 - 12),
                    None => Point::new(center_x as i32, 5),
                };
                let text = match &band.label {
                    Some(label) => label.clone(),
                    None => format_frequency_range(band.start_hz, band.end_hz),
                };
                Text::with_text_style(&text, anchor, char_style_of(band.color), centered)
                    .draw(target)?;
            }
        }
        Ok(())
    }

    fn draw_curve<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let levels = self.levels.levels();
        let n = levels.len();
        if n == 0 {
            return Ok(());
        }

        let w = self.width as f32;
        let max_freq = self.sample_rate / 2.0;
        // Bound per-pixel work when the frame has far more bins than columns.
        let stride = (n / (2 * self.width as usize)).max(1);

        let first_freq = match self.scale {
            // Bins below 20 Hz would collapse into one column and distort
            // the fill, so the log curve starts at the floor.
            FrequencyScale::Logarithmic => LOG_FLOOR_HZ,
            FrequencyScale::Linear => 0.0,
        };

        let mut points: Vec<Point> = Vec::with_capacity(n / stride + 1);
        points.push(Point::new(
            self.clamp_x(frequency_to_x(first_freq, self.scale, self.sample_rate, w)),
            self.level_to_y(levels[0]),
        ));

        let mut i = stride;
        while i < n {
            let freq = (i as f32 / n as f32) * max_freq;
            if !(self.scale == FrequencyScale::Logarithmic && freq < LOG_FLOOR_HZ) {
                points.push(Point::new(
                    self.clamp_x(frequency_to_x(freq, self.scale, self.sample_rate, w)),
                    self.level_to_y(levels[i]),
                ));
            }
            i += stride;
        }

        // Fill under the curve column by column from the gradient cache,
        // then stroke the curve on top.
        for pair in points.windows(2) {
            self.fill_span(target, pair[0], pair[1])?;
        }

        let stroke = PrimitiveStyle::with_stroke(self.style.curve, 2);
        for pair in points.windows(2) {
            Line::new(pair[0], pair[1]).into_styled(stroke).draw(target)?;
        }
        Ok(())
    }

    fn fill_span<D>(&self, target: &mut D, p0: Point, p1: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if p1.x < p0.x {
            return Ok(());
        }
        for x in p0.x..=p1.x {
            let t = if p1.x == p0.x {
                0.0
            } else {
                (x - p0.x) as f32 / (p1.x - p0.x) as f32
            };
            let y = (p0.y as f32 + (p1.y - p0.y) as f32 * t) as i32;
            let y = y.max(0).min(self.height as i32 - 1) as u32;

            let column = Rectangle::new(Point::new(x, y as i32), Size::new(1, self.height - y));
            target.fill_contiguous(
                &column,
                self.fill_gradient[y as usize..self.height as usize]
                    .iter()
                    .copied(),
            )?;
        }
        Ok(())
    }

    fn level_to_y(&self, level: u8) -> i32 {
        let h = self.height as f32;
        let db = value_to_decibels(level, self.amplitude);
        let y = h - remap(db, self.amplitude.min_db, self.amplitude.max_db, 0.0, h);
        (y as i32).max(0).min(self.height as i32 - 1)
    }

    fn clamp_x(&self, x: f32) -> i32 {
        (x as i32).max(0).min(self.width as i32 - 1)
    }
}

fn format_frequency(freq: f32) -> String {
    if freq >= 1000.0 {
        if freq % 1000.0 == 0.0 {
            format!("{}k", (freq / 1000.0) as i32)
        } else {
            format!("{:.1}k", freq / 1000.0)
        }
    } else {
        format!("{}", freq as i32)
    }
}

fn format_frequency_range(start_hz: f32, end_hz: f32) -> String {
    if end_hz >= 1000.0 {
        format!("{:.1}k-{:.1}k", start_hz / 1000.0, end_hz / 1000.0)
    } else {
        format!("{}-{} Hz", start_hz as i32, end_hz as i32)
    }
}

// Quantize a decibel reading the way an analyser front end would before
// feeding `update`.
pub fn quantize_db(db: f32, amplitude: AmplitudeRange) -> u8 {
    decibels_to_value(db, amplitude) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::convert::Infallible;
    use embedded_graphics::Pixel;

    struct TestCanvas {
        size: Size,
        pixels: Vec<Rgb888>,
    }

    impl TestCanvas {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size::new(width, height),
                pixels: vec![Rgb888::new(0, 0, 0); (width * height) as usize],
            }
        }

        fn pixel(&self, x: u32, y: u32) -> Rgb888 {
            self.pixels[(y * self.size.width + x) as usize]
        }

        fn is_all_black(&self) -> bool {
            self.pixels.iter().all(|&p| p == Rgb888::new(0, 0, 0))
        }
    }

    impl OriginDimensions for TestCanvas {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for TestCanvas {
        type Color = Rgb888;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if point.x >= 0
                    && point.y >= 0
                    && (point.x as u32) < self.size.width
                    && (point.y as u32) < self.size.height
                {
                    self.pixels[(point.y as u32 * self.size.width + point.x as u32) as usize] =
                        color;
                }
            }
            Ok(())
        }
    }

    fn test_spectrum() -> Spectrum {
        Spectrum::new(
            128,
            44100.0,
            FrequencyScale::Logarithmic,
            AmplitudeRange::new(-100.0, -30.0),
            64,
            48,
        )
    }

    #[test]
    fn test_render_noop_until_update() {
        let mut spectrum = test_spectrum();
        let mut canvas = TestCanvas::new(64, 48);
        spectrum.render(&mut canvas).unwrap();
        assert!(canvas.is_all_black());
    }

    #[test]
    fn test_render_paints_and_clears_dirty() {
        let mut spectrum = test_spectrum();
        let frame = vec![128.0; 128];
        spectrum.update(Some(&frame));

        let mut canvas = TestCanvas::new(64, 48);
        spectrum.render(&mut canvas).unwrap();
        assert!(!canvas.is_all_black());

        // Dirty flag was consumed: a fresh canvas stays untouched.
        let mut second = TestCanvas::new(64, 48);
        spectrum.render(&mut second).unwrap();
        assert!(second.is_all_black());
    }

    #[test]
    fn test_background_covers_surface() {
        let mut spectrum = test_spectrum();
        spectrum.update(Some(&vec![0.0; 128]));
        let mut canvas = TestCanvas::new(64, 48);
        spectrum.render(&mut canvas).unwrap();

        let bg = spectrum.style().background;
        let bg_count = canvas.pixels.iter().filter(|&&p| p == bg).count();
        assert!(bg_count > 0, "expected background pixels to survive");
    }

    #[test]
    fn test_band_api_round_trip() {
        let mut spectrum = test_spectrum();
        spectrum.add_band(100.0, 200.0, None, None);
        spectrum.add_band(100.0, 200.0, Some(Rgb888::new(0, 255, 0)), Some("test"));
        assert_eq!(spectrum.bands().len(), 1);
        spectrum.remove_band(100.0, 200.0);
        assert!(spectrum.bands().is_empty());
    }

    #[test]
    fn test_resize_is_idempotent_and_reenterable() {
        let mut spectrum = test_spectrum();
        spectrum.update(Some(&vec![200.0; 128]));

        // Zero-size surface is legal; render stays a no-op.
        spectrum.on_resize(0, 0);
        let mut empty = TestCanvas::new(1, 1);
        spectrum.render(&mut empty).unwrap();

        // Restoring a real size recovers normal operation.
        spectrum.on_resize(64, 48);
        spectrum.on_resize(64, 48);
        spectrum.update(Some(&vec![200.0; 128]));
        let mut canvas = TestCanvas::new(64, 48);
        spectrum.render(&mut canvas).unwrap();
        assert!(!canvas.is_all_black());
    }

    #[test]
    fn test_resize_alone_triggers_redraw() {
        let mut spectrum = test_spectrum();
        spectrum.update(Some(&vec![128.0; 128]));
        let mut canvas = TestCanvas::new(64, 48);
        spectrum.render(&mut canvas).unwrap();

        spectrum.on_resize(32, 24);
        let mut small = TestCanvas::new(32, 24);
        spectrum.render(&mut small).unwrap();
        assert!(!small.is_all_black());
    }

    #[test]
    fn test_format_frequency_labels() {
        assert_eq!(format_frequency(440.0), "440");
        assert_eq!(format_frequency(1000.0), "1k");
        assert_eq!(format_frequency(1500.0), "1.5k");
        assert_eq!(format_frequency_range(100.0, 200.0), "100-200 Hz");
        assert_eq!(format_frequency_range(500.0, 2000.0), "0.5k-2.0k");
    }

    #[test]
    fn test_quantize_db() {
        let amplitude = AmplitudeRange::new(-100.0, 0.0);
        assert_eq!(quantize_db(-100.0, amplitude), 0);
        assert_eq!(quantize_db(0.0, amplitude), 255);
        assert_eq!(quantize_db(-200.0, amplitude), 0);
    }
}
