use alloc::{vec, vec::Vec};

use crate::mapping::remap;

/// How raw input samples map onto the quantized 0..255 levels.
#[derive(Clone, Copy, Debug)]
pub enum LevelSource {
    /// Input is already in the 0..255 dB-quantized domain; copied with a clamp.
    Quantized,
    /// Raw amplitude-domain input, remapped from `[min, max]` onto 0..255.
    Amplitude { min: f32, max: f32 },
}

/// The most recent frame of quantized magnitude samples.
///
/// Bin count is fixed at construction; the frame is replaced wholesale on
/// every update and a dirty flag gates the renderer's draw pass.
pub struct LevelBuffer {
    raw: Vec<f32>,
    levels: Vec<u8>,
    source: LevelSource,
    has_frame: bool,
    dirty: bool,
}

impl LevelBuffer {
    pub fn new(bin_count: usize, source: LevelSource) -> Self {
        Self {
            raw: vec![0.0; bin_count],
            levels: vec![0; bin_count],
            source,
            has_frame: false,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a redraw without new data (resize, palette change).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Store a new raw frame (if any) and re-quantize it. Calling with
    /// `None` before any frame has arrived is a no-op and leaves the dirty
    /// flag unset.
    pub fn update(&mut self, frame: Option<&[f32]>) {
        if let Some(frame) = frame {
            let n = frame.len().min(self.raw.len());
            self.raw[..n].copy_from_slice(&frame[..n]);
            self.has_frame = true;
        }
        if !self.has_frame {
            return;
        }

        match self.source {
            LevelSource::Quantized => {
                for (level, &raw) in self.levels.iter_mut().zip(self.raw.iter()) {
                    *level = raw.max(0.0).min(255.0) as u8;
                }
            }
            LevelSource::Amplitude { min, max } => {
                for (level, &raw) in self.levels.iter_mut().zip(self.raw.iter()) {
                    *level = remap(raw, min, max, 0.0, 255.0) as u8;
                }
            }
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_frame_is_noop() {
        let mut buffer = LevelBuffer::new(4, LevelSource::Quantized);
        buffer.update(None);
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.levels(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_quantized_copy_clamps() {
        let mut buffer = LevelBuffer::new(4, LevelSource::Quantized);
        buffer.update(Some(&[-5.0, 0.0, 128.0, 400.0]));
        assert!(buffer.is_dirty());
        assert_eq!(buffer.levels(), &[0, 0, 128, 255]);
    }

    #[test]
    fn test_amplitude_remap() {
        let mut buffer = LevelBuffer::new(3, LevelSource::Amplitude { min: 0.0, max: 100.0 });
        buffer.update(Some(&[0.0, 50.0, 200.0]));
        assert_eq!(buffer.levels(), &[0, 127, 255]);
    }

    #[test]
    fn test_update_none_requantizes_stored_frame() {
        let mut buffer = LevelBuffer::new(2, LevelSource::Quantized);
        buffer.update(Some(&[10.0, 20.0]));
        buffer.clear_dirty();

        buffer.update(None);
        assert!(buffer.is_dirty());
        assert_eq!(buffer.levels(), &[10, 20]);
    }

    #[test]
    fn test_short_frame_leaves_tail() {
        let mut buffer = LevelBuffer::new(4, LevelSource::Quantized);
        buffer.update(Some(&[9.0, 9.0, 9.0, 9.0]));
        buffer.update(Some(&[1.0, 2.0]));
        assert_eq!(buffer.levels(), &[1, 2, 9, 9]);
    }

    #[test]
    fn test_dirty_cleared_explicitly() {
        let mut buffer = LevelBuffer::new(1, LevelSource::Quantized);
        buffer.update(Some(&[3.0]));
        assert!(buffer.is_dirty());
        buffer.clear_dirty();
        assert!(!buffer.is_dirty());
        buffer.mark_dirty();
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_len_fixed_at_construction() {
        let buffer = LevelBuffer::new(512, LevelSource::Quantized);
        assert_eq!(buffer.len(), 512);
        assert!(!buffer.is_empty());
    }
}
