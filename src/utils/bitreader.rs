/// Reads variable-width codes from a byte slice, most significant bit first.
///
/// This is the bit order TIFF uses for LZW strips.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, bit_pos: 0 }
    }

    /// Reads `n` bits (at most 32) and returns them as the low bits of a `u32`.
    ///
    /// # Returns
    /// - `Some(value)` if `n` whole bits were available
    /// - `None` once fewer than `n` bits remain; the cursor is left untouched
    pub fn read_bits(&mut self, n: u8) -> Option<u32> {
        let n = n as usize;
        if self.bits_left() < n {
            return None;
        }

        let mut result = 0u32;
        let mut remaining = n;

        while remaining > 0 {
            let byte = self.data[self.bit_pos / 8];
            let bit_offset = self.bit_pos % 8;
            let available = 8 - bit_offset;
            let take = available.min(remaining);

            let shifted = (byte as u32) >> (available - take);
            let mask = (1u32 << take) - 1;

            result = (result << take) | (shifted & mask);
            self.bit_pos += take;
            remaining -= take;
        }

        Some(result)
    }

    /// Number of unread bits.
    pub fn bits_left(&self) -> usize {
        self.data.len() * 8 - self.bit_pos
    }
}
