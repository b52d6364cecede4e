use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Theme colors for the spectrum view.
#[derive(Clone, Copy, Debug)]
pub struct SpectrumStyle {
    pub background: Rgb888,
    pub curve: Rgb888,
    pub grid: Rgb888,
    pub scale_text: Rgb888,
    pub band_default: Rgb888,
    /// Under-curve fill gradient, top and bottom endpoints. Blended against
    /// the background since the raster target has no alpha.
    pub fill_top: Rgb888,
    pub fill_bottom: Rgb888,
}

impl Default for SpectrumStyle {
    fn default() -> Self {
        Self {
            background: Rgb888::new(0x12, 0x12, 0x12),
            curve: Rgb888::new(0x4F, 0xC3, 0xF7),
            grid: Rgb888::new(0x2A, 0x2A, 0x2A),
            scale_text: Rgb888::new(0x80, 0x80, 0x80),
            band_default: Rgb888::new(0xFF, 0x40, 0x81),
            fill_top: Rgb888::new(0x21, 0x96, 0xF3),
            fill_bottom: Rgb888::new(0x0D, 0x47, 0xA1),
        }
    }
}

/// Per-channel blend of `color` over `base`, `alpha` in [0, 1].
pub fn blend(color: Rgb888, base: Rgb888, alpha: f32) -> Rgb888 {
    let alpha = alpha.max(0.0).min(1.0);
    let mix = |c: u8, b: u8| (b as f32 + (c as f32 - b as f32) * alpha + 0.5) as u8;
    Rgb888::new(
        mix(color.r(), base.r()),
        mix(color.g(), base.g()),
        mix(color.b(), base.b()),
    )
}
