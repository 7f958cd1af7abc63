fn scale_to_u8<T: Copy + Into<f64>>(values: &[T]) -> Vec<u8> {
    let (min_val, max_val) = values.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &v| {
        let v: f64 = v.into();
        if v.is_nan() {
            (lo, hi)
        } else {
            (lo.min(v), hi.max(v))
        }
    });

    if values.is_empty() || max_val <= min_val {
        return vec![0; values.len()];
    }

    values
        .iter()
        .map(|&p| {
            let p: f64 = p.into();
            if p.is_nan() {
                0
            } else {
                (255.0 * (p - min_val) / (max_val - min_val)) as u8
            }
        })
        .collect()
}

fn unpack_rgb(values: &[u32]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&p| [(p >> 16) as u8, (p >> 8) as u8, p as u8])
        .collect()
}

/// Decoded samples, typed by the declared sample format.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 1-bit (as 0/255) and 8-bit gray.
    L8(Vec<u8>),
    /// 12-bit and 16-bit gray; signed data is shifted by 32768.
    L16(Vec<u16>),
    /// 24, 32 and 64-bit gray.
    L32F(Vec<f32>),
    /// Packed `0xAARRGGBB`, alpha always 0xFF.
    Argb32(Vec<u32>),
    /// Red, green and blue 16-bit planes.
    Rgb48([Vec<u16>; 3]),
}

impl PixelData {
    /// Number of pixels held.
    pub fn len(&self) -> usize {
        match self {
            PixelData::L8(p) => p.len(),
            PixelData::L16(p) => p.len(),
            PixelData::L32F(p) => p.len(),
            PixelData::Argb32(p) => p.len(),
            PixelData::Rgb48(planes) => planes[0].len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_color(&self) -> bool {
        matches!(self, PixelData::Argb32(_) | PixelData::Rgb48(_))
    }
}

/// One decoded image together with the diagnostics of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: PixelData,
    eof_errors: u32,
    bytes_read: u64,
    range: Option<(u16, u16)>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: PixelData) -> DecodedImage {
        DecodedImage {
            width,
            height,
            pixels,
            eof_errors: 0,
            bytes_read: 0,
            range: None,
        }
    }

    pub(crate) fn with_stats(mut self, eof_errors: u32, bytes_read: u64, range: Option<(u16, u16)>) -> Self {
        self.eof_errors = eof_errors;
        self.bytes_read = bytes_read;
        self.range = range;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &PixelData {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelData {
        self.pixels
    }

    /// Number of times the source ended before a read was satisfied.
    pub fn eof_errors(&self) -> u32 {
        self.eof_errors
    }

    /// Raw bytes consumed from the source.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Smallest and largest sample seen, reported by the interleaved 48-bit path.
    pub fn range(&self) -> Option<(u16, u16)> {
        self.range
    }

    /// Gray images as one byte per pixel, wide samples scaled between their min and max.
    /// Color images are converted to RGB, three bytes per pixel.
    pub fn as_display_bytes(&self) -> Vec<u8> {
        match &self.pixels {
            PixelData::L8(p) => p.clone(),
            PixelData::L16(p) => scale_to_u8(p),
            PixelData::L32F(p) => scale_to_u8(p),
            PixelData::Argb32(p) => unpack_rgb(p),
            PixelData::Rgb48(planes) => {
                let all: Vec<u16> = planes.iter().flatten().copied().collect();
                let scaled = scale_to_u8(&all);
                let n = planes[0].len();
                (0..n)
                    .flat_map(|i| [scaled[i], scaled[n + i], scaled[2 * n + i]])
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_l16() {
        let image = DecodedImage::new(3, 1, PixelData::L16(vec![100, 200, 300]));
        assert_eq!(image.as_display_bytes(), vec![0, 127, 255]);
    }

    #[test]
    fn test_unpack_argb() {
        let image = DecodedImage::new(1, 1, PixelData::Argb32(vec![0xff102030]));
        assert_eq!(image.as_display_bytes(), vec![0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_flat_image_scales_to_zero() {
        let image = DecodedImage::new(2, 1, PixelData::L32F(vec![5.0, 5.0]));
        assert_eq!(image.as_display_bytes(), vec![0, 0]);
    }
}
