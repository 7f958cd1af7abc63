//! Reversal of the horizontal differencing predictor.

/// A sample type the predictor can accumulate.
pub trait Sample: Copy + Default {
    fn accumulate(self, previous: Self) -> Self;
}

impl Sample for u8 {
    fn accumulate(self, previous: Self) -> Self {
        self.wrapping_add(previous)
    }
}

impl Sample for u16 {
    fn accumulate(self, previous: Self) -> Self {
        self.wrapping_add(previous)
    }
}

impl Sample for f32 {
    fn accumulate(self, previous: Self) -> Self {
        self + previous
    }
}

/// Undoes differencing on single-channel samples.
///
/// `first_index` is the image index of `samples[0]`; the running value is reset
/// after the last sample of every scanline. `last` carries the running value
/// from one strip to the next.
pub fn undo_scanline<T: Sample>(samples: &mut [T], first_index: usize, width: usize, last: &mut T) {
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample = sample.accumulate(*last);
        *last = if (first_index + i) % width == width - 1 {
            T::default()
        } else {
            *sample
        };
    }
}

/// Undoes differencing on interleaved multi-channel bytes.
///
/// Each byte is added to the byte one pixel back in the same channel. The first
/// pixel of every scanline is stored as-is.
pub fn undo_interleaved(bytes: &mut [u8], bytes_per_pixel: usize, width: usize) {
    for b in bytes_per_pixel..bytes.len() {
        if (b / bytes_per_pixel) % width == 0 {
            continue;
        }
        bytes[b] = bytes[b].wrapping_add(bytes[b - bytes_per_pixel]);
    }
}
