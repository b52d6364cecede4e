#[allow(unused_imports)]
use micromath::F32Ext;

use libm::{log10f, powf};

/// Lowest frequency the logarithmic scale can represent. Everything below
/// is clamped here before taking the log.
pub const LOG_FLOOR_HZ: f32 = 20.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrequencyScale {
    Logarithmic,
    Linear,
}

/// Decibel window the quantized 0..255 levels span.
#[derive(Clone, Copy, Debug)]
pub struct AmplitudeRange {
    pub min_db: f32,
    pub max_db: f32,
}

impl AmplitudeRange {
    pub const fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db }
    }

    pub fn span(&self) -> f32 {
        self.max_db - self.min_db
    }
}

/// Clamp `x` into `[src_min, src_max]`, then rescale into `[dst_min, dst_max]`.
/// A zero-width source range maps everything to `dst_min`.
pub fn remap(x: f32, src_min: f32, src_max: f32, dst_min: f32, dst_max: f32) -> f32 {
    if src_max == src_min {
        return dst_min;
    }
    let x = x.max(src_min).min(src_max);
    dst_min + ((x - src_min) * (dst_max - dst_min)) / (src_max - src_min)
}

/// Map a frequency in Hz onto a pixel column of a `width`-wide surface.
pub fn frequency_to_x(freq: f32, scale: FrequencyScale, sample_rate: f32, width: f32) -> f32 {
    let max_freq = sample_rate / 2.0;

    match scale {
        FrequencyScale::Logarithmic => {
            let log_min = log10f(LOG_FLOOR_HZ);
            let log_max = log10f(max_freq);
            if !(log_max > log_min) {
                // Degenerate scale (Nyquist at or below the floor, or a
                // nonsense sample rate): collapse onto the clamped edge.
                return width;
            }
            let log_freq = log10f(freq.max(LOG_FLOOR_HZ));
            remap(log_freq, log_min, log_max, 0.0, width)
        }
        FrequencyScale::Linear => remap(freq, 0.0, max_freq, 0.0, width),
    }
}

/// Inverse of [`frequency_to_x`].
pub fn x_to_frequency(x: f32, scale: FrequencyScale, sample_rate: f32, width: f32) -> f32 {
    let max_freq = sample_rate / 2.0;

    match scale {
        FrequencyScale::Logarithmic => {
            let log_min = log10f(LOG_FLOOR_HZ);
            let log_max = log10f(max_freq);
            if !(log_max > log_min) {
                return LOG_FLOOR_HZ;
            }
            powf(10.0, remap(x, 0.0, width, log_min, log_max))
        }
        FrequencyScale::Linear => remap(x, 0.0, width, 0.0, max_freq),
    }
}

/// Decibel value of a quantized 0..255 level.
pub fn value_to_decibels(level: u8, range: AmplitudeRange) -> f32 {
    remap(level as f32, 0.0, 255.0, range.min_db, range.max_db)
}

/// Inverse of [`value_to_decibels`]; out-of-window decibels clamp to the
/// 0/255 boundary levels.
pub fn decibels_to_value(db: f32, range: AmplitudeRange) -> f32 {
    remap(db, range.min_db, range.max_db, 0.0, 255.0)
}

/// Pick a round grid step for frequency axis lines.
///
/// Logarithmic scales switch by range threshold, linear scales derive a
/// power-of-ten step; never finer than 10 Hz.
pub fn optimal_freq_step(max_freq: f32, scale: FrequencyScale) -> f32 {
    match scale {
        FrequencyScale::Logarithmic => {
            if max_freq <= 2000.0 {
                100.0
            } else if max_freq <= 5000.0 {
                500.0
            } else if max_freq <= 20000.0 {
                1000.0
            } else {
                2000.0
            }
        }
        FrequencyScale::Linear => {
            let power = log10f(max_freq).floor();
            let step = powf(10.0, power) / if power > 1.0 { 2.0 } else { 1.0 };
            step.max(10.0)
        }
    }
}
