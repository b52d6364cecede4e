use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// A color pinned at a normalized position in [0, 1].
pub type ColorStop = (f32, Rgb888);

/// Default waterfall map: black through blue and cyan up to white.
pub const DEFAULT_STOPS: [ColorStop; 5] = [
    (0.0, Rgb888::new(0x00, 0x00, 0x00)),
    (0.25, Rgb888::new(0x00, 0x00, 0xFF)),
    (0.5, Rgb888::new(0x00, 0xFF, 0xFF)),
    (0.75, Rgb888::new(0xFF, 0xFF, 0x00)),
    (1.0, Rgb888::new(0xFF, 0xFF, 0xFF)),
];

/// 256-entry RGB lookup table indexed by quantized level.
///
/// Expanded once from ordered color stops; rebuilding from the same stops
/// always yields the same table.
pub struct Palette {
    table: [Rgb888; 256],
}

impl Palette {
    /// Expand ordered stops into the lookup table by linear interpolation
    /// in RGB space. Positions outside [0, 1] are clamped; a single stop
    /// paints the whole table.
    pub fn from_stops(stops: &[ColorStop]) -> Self {
        let mut table = [Rgb888::new(0, 0, 0); 256];
        if stops.is_empty() {
            return Self { table };
        }

        for (i, entry) in table.iter_mut().enumerate() {
            let pos = i as f32 / 255.0;
            *entry = sample_stops(stops, pos);
        }
        Self { table }
    }

    pub fn color(&self, level: u8) -> Rgb888 {
        self.table[level as usize]
    }

    /// Opaque RGBA bytes for one level, as written into the waterfall image.
    pub fn rgba(&self, level: u8) -> [u8; 4] {
        let c = self.table[level as usize];
        [c.r(), c.g(), c.b(), 255]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_stops(&DEFAULT_STOPS)
    }
}

fn sample_stops(stops: &[ColorStop], pos: f32) -> Rgb888 {
    let pos = pos.max(0.0).min(1.0);

    let (first_pos, first_color) = stops[0];
    if pos <= first_pos {
        return first_color;
    }

    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if pos <= p1 {
            if p1 <= p0 {
                return c1;
            }
            let t = (pos - p0) / (p1 - p0);
            return lerp_rgb(c0, c1, t);
        }
    }
    stops[stops.len() - 1].1
}

fn lerp_rgb(a: Rgb888, b: Rgb888, t: f32) -> Rgb888 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t + 0.5) as u8;
    Rgb888::new(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}
