use crate::decoders::{bitmap, gray, rgb, DecodeContext};
use crate::geometry::{skip_forward, Geometry};
use crate::layout::{ImageLayout, SampleFormat};
use crate::strips::PixelSource;
use crate::utils::error::RawResult;
use crate::utils::image::DecodedImage;

/// Decodes images described by one layout from a byte stream.
///
/// The reader remembers how far to skip before the next image: the layout's
/// offset before the first one, the inter-image gap after that. Calling
/// [`ImageReader::read_pixels`] repeatedly on the same stream walks a stack.
#[derive(Debug)]
pub struct ImageReader<'a> {
    layout: &'a ImageLayout,
    skip_count: u64,
}

impl<'a> ImageReader<'a> {
    pub fn new(layout: &'a ImageLayout) -> ImageReader<'a> {
        ImageReader {
            layout,
            skip_count: layout.offset,
        }
    }

    pub fn layout(&self) -> &ImageLayout {
        self.layout
    }

    /// Bytes that will be skipped before the next image.
    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    /// Decodes the next image from `source`.
    ///
    /// The returned image always holds the declared number of pixels; missing data
    /// is left zero and counted in [`DecodedImage::eof_errors`].
    pub fn read_pixels<S: PixelSource + ?Sized>(&mut self, source: &mut S) -> RawResult<DecodedImage> {
        let layout = self.layout;
        layout.validate()?;

        let geometry = Geometry::resolve(layout);
        log::debug!(
            "Decoding {}x{} {:?} ({:?}, {:?}), {} bytes, chunk {}",
            layout.width,
            layout.height,
            layout.format,
            layout.compression,
            layout.byte_order,
            geometry.byte_count,
            geometry.chunk_size
        );

        if self.skip_count > 0 {
            skip_forward(source, self.skip_count);
        }
        self.skip_count = layout.gap_between_images;

        let mut ctx = DecodeContext::new(layout, geometry, source);

        let pixels = match layout.format {
            SampleFormat::Bitmap => bitmap::read_1bit(&mut ctx)?,
            SampleFormat::Gray8 => gray::read_8bit(&mut ctx)?,
            SampleFormat::Gray12Unsigned => gray::read_12bit(&mut ctx)?,
            SampleFormat::Gray16Signed | SampleFormat::Gray16Unsigned => gray::read_16bit(&mut ctx)?,
            SampleFormat::Gray24Unsigned => gray::read_24bit(&mut ctx)?,
            SampleFormat::Gray32Int | SampleFormat::Gray32Unsigned | SampleFormat::Gray32Float => {
                gray::read_32bit(&mut ctx)?
            }
            SampleFormat::Gray64Float => gray::read_64bit(&mut ctx)?,
            SampleFormat::Rgb
            | SampleFormat::Bgr
            | SampleFormat::Argb
            | SampleFormat::Barg
            | SampleFormat::Abgr
            | SampleFormat::Cmyk => rgb::read_chunky(&mut ctx)?,
            SampleFormat::RgbPlanar => rgb::read_planar(&mut ctx)?,
            SampleFormat::Rgb48 => rgb::read_rgb48(&mut ctx)?,
            SampleFormat::Rgb48Planar => rgb::read_rgb48_planar(&mut ctx)?,
        };

        let session = ctx.session;
        if session.stats.eof_errors > 0 {
            log::warn!(
                "Input ended early {} time(s), missing pixels are zero",
                session.stats.eof_errors
            );
        }

        Ok(DecodedImage::new(layout.width, layout.height, pixels).with_stats(
            session.stats.eof_errors,
            session.stats.bytes_read,
            session.range,
        ))
    }

    /// Decodes `count` consecutive images.
    pub fn read_stack<S: PixelSource + ?Sized>(&mut self, source: &mut S, count: usize) -> RawResult<Vec<DecodedImage>> {
        let mut images = Vec::with_capacity(count);

        for index in 0..count {
            let image = self.read_pixels(source)?;
            log::debug!("Image {} of {}: {} bytes read", index + 1, count, image.bytes_read());
            images.push(image);
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::RawError;
    use crate::utils::image::PixelData;
    use std::io::Cursor;

    #[test]
    fn test_offset_then_gap() -> RawResult<()> {
        let layout = ImageLayout::new(2, 1, SampleFormat::Gray8).with_offset(3).with_gap(1);
        let mut reader = ImageReader::new(&layout);
        let mut source = Cursor::new(vec![0, 0, 0, 1, 2, 0, 3, 4]);

        let images = reader.read_stack(&mut source, 2)?;

        assert_eq!(images[0].pixels(), &PixelData::L8(vec![1, 2]));
        assert_eq!(images[1].pixels(), &PixelData::L8(vec![3, 4]));
        assert_eq!(reader.skip_count(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_layout_reads_nothing() {
        let layout = ImageLayout::new(4, 0, SampleFormat::Gray8).with_offset(2);
        let mut reader = ImageReader::new(&layout);
        let mut source = Cursor::new(vec![9u8; 8]);

        let result = reader.read_pixels(&mut source);

        assert!(matches!(result, Err(RawError::InvalidDimensions { .. })));
        assert_eq!(source.position(), 0);
    }
}
