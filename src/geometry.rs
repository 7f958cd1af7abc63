use crate::layout::ImageLayout;
use crate::strips::PixelSource;
use log::{debug, warn};

const CHUNK_GRANULE: u64 = 8192;
const MAX_SKIP_ATTEMPTS: u32 = 5;

/// Sizes derived from an image layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub n_pixels: usize,
    /// Bytes of uncompressed pixel data in one image.
    pub byte_count: u64,
    /// Read size for contiguous data, a multiple of 8192 bytes.
    pub chunk_size: usize,
}

impl Geometry {
    /// Computes the geometry of a layout that has passed `ImageLayout::validate`.
    pub fn resolve(layout: &ImageLayout) -> Geometry {
        let width = layout.width as usize;
        let height = layout.height as usize;
        let n_pixels = width * height;

        let byte_count = layout.image_bytes();

        let chunk = byte_count / 25;
        let chunk_size = if chunk < CHUNK_GRANULE {
            CHUNK_GRANULE
        } else {
            (chunk / CHUNK_GRANULE) * CHUNK_GRANULE
        };

        Geometry {
            width,
            height,
            n_pixels,
            byte_count,
            chunk_size: chunk_size as usize,
        }
    }
}

/// Advances the source by `count` bytes, best effort.
///
/// Short skips are retried; after five attempts, or on a failed skip, the source
/// is left wherever it ended up. Returns the number of bytes skipped.
pub fn skip_forward<S: PixelSource + ?Sized>(source: &mut S, count: u64) -> u64 {
    let mut skipped = 0u64;
    let mut attempts = 0;

    while skipped < count {
        attempts += 1;
        if attempts > MAX_SKIP_ATTEMPTS {
            break;
        }

        match source.skip_bytes(count - skipped) {
            Ok(n) => skipped += n,
            Err(e) => {
                warn!("Giving up skip of {} bytes after {}: {}", count, skipped, e);
                break;
            }
        }
    }

    if skipped < count {
        debug!("Skipped {} of {} bytes", skipped, count);
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SampleFormat;
    use crate::strips::Sequential;
    use std::io::Read;

    #[test]
    fn test_chunk_size_floor() {
        let layout = ImageLayout::new(10, 10, SampleFormat::Gray16Unsigned);
        let geometry = Geometry::resolve(&layout);

        assert_eq!(geometry.n_pixels, 100);
        assert_eq!(geometry.byte_count, 200);
        assert_eq!(geometry.chunk_size, 8192);
    }

    #[test]
    fn test_chunk_size_rounds_down() {
        // 4_000_000 bytes / 25 = 160_000 -> 19 * 8192
        let layout = ImageLayout::new(2000, 1000, SampleFormat::Gray16Unsigned);
        let geometry = Geometry::resolve(&layout);

        assert_eq!(geometry.chunk_size, 155_648);
        assert_eq!(geometry.chunk_size % 8192, 0);
    }

    #[test]
    fn test_bitmap_scanline_padding() {
        let layout = ImageLayout::new(10, 3, SampleFormat::Bitmap);
        assert_eq!(Geometry::resolve(&layout).byte_count, 6);
    }

    #[test]
    fn test_skip_past_end_gives_up() -> Result<(), Box<dyn std::error::Error>> {
        let data = vec![1u8, 2, 3, 4];
        let mut source = Sequential::new(&data[..]);

        assert_eq!(skip_forward(&mut source, 2), 2);
        let mut rest = Vec::new();
        source.read_to_end(&mut rest)?;
        assert_eq!(rest, vec![3, 4]);

        let mut source = Sequential::new(&data[..]);
        assert_eq!(skip_forward(&mut source, 100), 4);

        Ok(())
    }
}
