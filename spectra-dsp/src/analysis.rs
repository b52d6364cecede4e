use microdsp::common::{apply_window_function, real_fft, WindowFunctionType::Hann};
#[allow(unused_imports)]
use micromath::F32Ext;

pub const FRAME_SIZE: usize = 1024;
pub const BIN_COUNT: usize = FRAME_SIZE / 2;

/// Normalize a single sample from i16 to f32.
pub fn normalize_sample(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

/// Normalize a slice of i16 samples to a slice of f32 samples.
pub fn normalize_samples(samples: &[i16], normalized_samples: &mut [f32]) {
    for (i, &sample) in samples.iter().enumerate() {
        normalized_samples[i] = normalize_sample(sample);
    }
}

/// Hann-window a frame in place, run the real FFT and return the magnitude
/// of each of the 512 frequency bins.
pub fn magnitude_spectrum(samples: &mut [f32; FRAME_SIZE]) -> [f32; BIN_COUNT] {
    apply_window_function(Hann, samples);
    let spectrum = real_fft(samples);

    let mut magnitude = [0.0; BIN_COUNT];
    for (out, bin) in magnitude.iter_mut().zip(spectrum.iter()) {
        *out = (bin.re * bin.re + bin.im * bin.im).sqrt();
    }
    magnitude
}

/// Full analysis path for a raw capture frame: normalize, window, FFT,
/// magnitudes. This is the producer of the frames the renderers consume.
pub fn process_frame(samples: &[i16]) -> Result<[f32; BIN_COUNT], &'static str> {
    if samples.len() != FRAME_SIZE {
        return Err("Input must contain exactly 1024 samples");
    }

    let mut normalized = [0.0; FRAME_SIZE];
    normalize_samples(samples, &mut normalized);
    Ok(magnitude_spectrum(&mut normalized))
}

/// Index of the strongest bin above DC.
pub fn peak_bin(magnitude: &[f32]) -> usize {
    if magnitude.len() < 2 {
        return 0;
    }
    let mut peak = 1;
    for (i, &value) in magnitude.iter().enumerate().skip(1) {
        if value > magnitude[peak] {
            peak = i;
        }
    }
    peak
}
