use core::f32::consts::TAU;

use libm::cosf;
#[allow(unused_imports)]
use micromath::F32Ext;

/// Streaming frequency shifter: multiplies the input by a `2·cos(phase)`
/// carrier, moving a component at `f0` to `|f0 − shift|` (plus the image at
/// `f0 + shift`). The factor of two preserves per-sideband amplitude.
///
/// The phase accumulator persists across blocks and is wrapped into
/// [0, 2π), so the shifter can run on fixed-size blocks indefinitely.
/// `process` never allocates.
pub struct FrequencyShifter {
    shift_hz: f32,
    sample_rate: f32,
    phase: f32,
}

impl FrequencyShifter {
    pub fn new(shift_hz: f32, sample_rate: f32) -> Self {
        Self {
            shift_hz,
            sample_rate,
            phase: 0.0,
        }
    }

    pub fn shift_hz(&self) -> f32 {
        self.shift_hz
    }

    /// Per-sample phase advance of the carrier.
    fn phase_increment(&self) -> f32 {
        if self.sample_rate > 0.0 {
            TAU * self.shift_hz / self.sample_rate
        } else {
            0.0
        }
    }

    /// Shift one mono block. Returns the continuation signal: the shifter
    /// is always ready for the next block.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> bool {
        let increment = self.phase_increment();
        let mut phase = self.phase;
        for (out, &sample) in output.iter_mut().zip(input.iter()) {
            *out = sample * 2.0 * cosf(phase);
            phase += increment;
        }
        self.phase = wrap_phase(phase);
        true
    }

    /// Shift a multi-channel block. Every channel runs from the same
    /// block-start phase, so channels stay carrier-coherent; the
    /// accumulator advances by exactly one block.
    pub fn process_channels(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) -> bool {
        let increment = self.phase_increment();
        let start_phase = self.phase;
        let mut block_len = 0;

        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            let mut phase = start_phase;
            for (out, &sample) in output.iter_mut().zip(input.iter()) {
                *out = sample * 2.0 * cosf(phase);
                phase += increment;
            }
            block_len = block_len.max(input.len().min(output.len()));
        }

        self.phase = wrap_phase(start_phase + increment * block_len as f32);
        true
    }
}

fn wrap_phase(phase: f32) -> f32 {
    phase - TAU * (phase / TAU).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_shift_is_a_constant_gain() {
        let mut shifter = FrequencyShifter::new(0.0, 48000.0);
        let input = [0.25f32, -0.5, 1.0, 0.0];
        let mut output = [0.0f32; 4];
        assert!(shifter.process(&input, &mut output));
        for (o, i) in output.iter().zip(input.iter()) {
            assert_abs_diff_eq!(*o, 2.0 * i, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_phase_continues_across_blocks() {
        let sample_rate = 48000.0;
        let input = [1.0f32; 64];

        let mut split = FrequencyShifter::new(1000.0, sample_rate);
        let mut first = [0.0f32; 32];
        let mut second = [0.0f32; 32];
        split.process(&input[..32], &mut first);
        split.process(&input[32..], &mut second);

        let mut whole = FrequencyShifter::new(1000.0, sample_rate);
        let mut all = [0.0f32; 64];
        whole.process(&input, &mut all);

        for (i, &expected) in all.iter().enumerate() {
            let got = if i < 32 { first[i] } else { second[i - 32] };
            assert_abs_diff_eq!(got, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_channels_share_the_carrier() {
        let mut shifter = FrequencyShifter::new(440.0, 44100.0);
        let input = [0.5f32; 16];
        let mut left = [0.0f32; 16];
        let mut right = [0.0f32; 16];
        assert!(shifter.process_channels(&[&input, &input], &mut [&mut left, &mut right]));
        assert_eq!(left, right);
    }

    #[test]
    fn test_multi_channel_block_advances_phase_once() {
        let sample_rate = 48000.0;
        let input = [1.0f32; 8];

        let mut stereo = FrequencyShifter::new(1500.0, sample_rate);
        let mut l = [0.0f32; 8];
        let mut r = [0.0f32; 8];
        stereo.process_channels(&[&input, &input], &mut [&mut l, &mut r]);

        let mut mono = FrequencyShifter::new(1500.0, sample_rate);
        let mut m = [0.0f32; 8];
        mono.process(&input, &mut m);

        // After one block both accumulators sit at the same phase.
        let mut next_stereo = [0.0f32; 1];
        let mut next_mono = [0.0f32; 1];
        stereo.process(&[1.0], &mut next_stereo);
        mono.process(&[1.0], &mut next_mono);
        assert_abs_diff_eq!(next_stereo[0], next_mono[0], epsilon = 1e-5);
    }

    #[test]
    fn test_phase_stays_wrapped_over_long_streams() {
        let mut shifter = FrequencyShifter::new(12345.0, 48000.0);
        let input = [0.0f32; 480];
        let mut output = [0.0f32; 480];
        for _ in 0..1000 {
            shifter.process(&input, &mut output);
        }
        assert!(shifter.phase >= 0.0 && shifter.phase < TAU);
    }

    #[test]
    fn test_negative_shift_is_valid() {
        let mut shifter = FrequencyShifter::new(-500.0, 48000.0);
        let input = [1.0f32; 4];
        let mut output = [0.0f32; 4];
        shifter.process(&input, &mut output);
        assert!(shifter.phase >= 0.0 && shifter.phase < TAU);
        assert_abs_diff_eq!(output[0], 2.0, epsilon = 1e-6);
    }
}
