//! Color formats: chunky 24/32-bit, planar 8-bit, and 48-bit RGB.

use super::{gray, DecodeContext, DecodeSession, Region};
use crate::compression::predictor;
use crate::layout::{ByteOrder, Compression, SampleFormat};
use crate::layout::Strip;
use crate::strips::PixelSource;
use crate::utils::error::{RawError, RawResult};
use crate::utils::image::PixelData;

const OPAQUE: u32 = 0xff00_0000;

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Folds the black channel into one ink channel; `k == 0` leaves it untouched.
/// The result stays in ink space, inverting for display is left to the caller.
#[inline]
fn cmyk_channel(value: u8, k: u8) -> u8 {
    if k == 0 {
        return value;
    }
    ((((value as u32) * (256 - k as u32)) >> 8) + k as u32).min(255) as u8
}

/// Picks the byte-to-pixel mapping for one chunky format.
fn pixel_packer(format: SampleFormat) -> fn(&[u8]) -> u32 {
    match format {
        SampleFormat::Bgr => |b| pack(b[2], b[1], b[0]),
        SampleFormat::Barg => |b| pack(b[2], b[3], b[0]),
        SampleFormat::Abgr => |b| pack(b[2], b[1], b[0]),
        SampleFormat::Cmyk => |b| {
            let k = b[3];
            pack(cmyk_channel(b[0], k), cmyk_channel(b[1], k), cmyk_channel(b[2], k))
        },
        _ => |b| pack(b[0], b[1], b[2]),
    }
}

/// Interleaved 24-bit and 32-bit color: RGB, BGR, ARGB, BARG, ABGR and CMYK.
pub fn read_chunky<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let bpp = ctx.layout.bytes_per_pixel();
    let width = ctx.geometry.width;
    let n_pixels = ctx.geometry.n_pixels;
    let packer = pixel_packer(ctx.layout.format);
    let strips = ctx.layout.strips();

    if strips.is_empty() {
        let pixels = ctx.read_contiguous_samples(n_pixels, bpp, packer)?;
        return Ok(PixelData::Argb32(pixels));
    }

    let differencing = ctx.layout.compression == Compression::LzwWithDifferencing;
    let mut pixels = vec![0u32; n_pixels];
    let mut base = 0;

    ctx.for_each_strip(&strips, |mut strip, _| {
        if differencing {
            predictor::undo_interleaved(&mut strip, bpp, width);
        }

        let pixels_read = strip.len() / bpp;
        let pixels_read = pixels_read - pixels_read % width;
        let end = (base + pixels_read).min(n_pixels);

        for (pixel, bytes) in pixels[base..end].iter_mut().zip(strip.chunks_exact(bpp)) {
            *pixel = packer(bytes);
        }

        base += pixels_read;
        base < n_pixels
    })?;

    Ok(PixelData::Argb32(pixels))
}

/// Three consecutive 8-bit planes merged into opaque ARGB.
pub fn read_planar<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let n = ctx.geometry.n_pixels;
    let planes = gray::read_8bit_samples(ctx, n * 3)?;
    let (red, rest) = planes.split_at(n);
    let (green, blue) = rest.split_at(n);

    let pixels = red
        .iter()
        .zip(green)
        .zip(blue)
        .map(|((&r, &g), &b)| pack(r, g, b))
        .collect();

    Ok(PixelData::Argb32(pixels))
}

/// Distributes interleaved 16-bit samples over three channel planes.
struct ChannelSplitter {
    planes: [Vec<u16>; 3],
    convert: fn(&[u8]) -> u16,
    channel: usize,
    pixel: usize,
}

impl ChannelSplitter {
    fn new(n_pixels: usize, byte_order: ByteOrder) -> Self {
        let convert: fn(&[u8]) -> u16 = match byte_order {
            ByteOrder::LittleEndian => |b| u16::from_le_bytes([b[0], b[1]]),
            ByteOrder::BigEndian => |b| u16::from_be_bytes([b[0], b[1]]),
        };

        ChannelSplitter {
            planes: [vec![0; n_pixels], vec![0; n_pixels], vec![0; n_pixels]],
            convert,
            channel: 0,
            pixel: 0,
        }
    }

    fn remaining_bytes(&self) -> u64 {
        ((self.planes[0].len() - self.pixel) * 6) as u64
    }

    fn is_full(&self) -> bool {
        self.pixel >= self.planes[0].len()
    }

    /// Consumes whole sample pairs; an odd trailing byte is dropped.
    ///
    /// Only the first `valid` bytes count towards the sample range, the rest is
    /// zero fill after a short read.
    fn consume(&mut self, bytes: &[u8], valid: usize, session: &mut DecodeSession) {
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            if self.is_full() {
                break;
            }

            let value = (self.convert)(pair);
            if (i + 1) * 2 <= valid {
                session.track(value);
            }
            self.planes[self.channel][self.pixel] = value;

            self.channel += 1;
            if self.channel == 3 {
                self.channel = 0;
                self.pixel += 1;
            }
        }
    }
}

/// Interleaved 16-bit RGB, returned as three planes with the sample range tracked.
pub fn read_rgb48<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    if ctx.layout.compression == Compression::LzwWithDifferencing {
        return Err(RawError::UnsupportedFormat(
            "LZW with differencing is not supported for 48-bit RGB".to_string(),
        ));
    }

    let n_pixels = ctx.geometry.n_pixels;
    let mut splitter = ChannelSplitter::new(n_pixels, ctx.byte_order());
    let strips = ctx.layout.strips();

    if strips.is_empty() {
        let before = ctx.session.stats.bytes_read;
        let bytes = ctx.read_bytes(Region::Contiguous, n_pixels * 6)?;
        let valid = (ctx.session.stats.bytes_read - before) as usize;
        splitter.consume(&bytes, valid, &mut ctx.session);
    } else {
        let compressed = ctx.layout.compression != Compression::None;

        for &strip in &strips {
            let limit = if compressed { None } else { Some(splitter.remaining_bytes()) };
            let before = ctx.session.stats.bytes_read;
            let bytes = ctx.fetch_strip(strip, limit)?;
            let valid = if compressed {
                bytes.len()
            } else {
                (ctx.session.stats.bytes_read - before) as usize
            };
            splitter.consume(&bytes, valid, &mut ctx.session);

            if splitter.is_full() {
                break;
            }
        }
    }

    Ok(PixelData::Rgb48(splitter.planes))
}

/// Three 16-bit planes, red then green then blue.
///
/// Without strips the planes follow each other at the current position. A single
/// uncompressed strip holds all three planes back to back. Otherwise the strip
/// list is split into three equal groups, one per plane, each fetched at its own
/// offsets.
pub fn read_rgb48_planar<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let strips = ctx.layout.strips();

    if strips.is_empty() {
        let red = gray::read_16bit_region(ctx, Region::Contiguous)?;
        let green = gray::read_16bit_region(ctx, Region::Contiguous)?;
        let blue = gray::read_16bit_region(ctx, Region::Contiguous)?;
        return Ok(PixelData::Rgb48([red, green, blue]));
    }

    let strips = if strips.len() == 1 && ctx.layout.compression == Compression::None {
        let plane_bytes = ctx.geometry.byte_count;
        (0..3)
            .map(|i| Strip {
                offset: strips[0].offset + i * plane_bytes,
                length: plane_bytes,
            })
            .collect()
    } else {
        strips
    };

    if strips.len() % 3 != 0 {
        return Err(RawError::InvalidLayout(format!(
            "{} strips cannot be split into three planes",
            strips.len()
        )));
    }

    let per_plane = strips.len() / 3;
    let red = gray::read_16bit_region(ctx, Region::Strips(&strips[..per_plane]))?;
    let green = gray::read_16bit_region(ctx, Region::Strips(&strips[per_plane..2 * per_plane]))?;
    let blue = gray::read_16bit_region(ctx, Region::Strips(&strips[2 * per_plane..]))?;

    Ok(PixelData::Rgb48([red, green, blue]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmyk_without_black() {
        let packer = pixel_packer(SampleFormat::Cmyk);
        assert_eq!(packer(&[0, 0, 0, 0]), 0xff00_0000);
        assert_eq!(packer(&[255, 16, 200, 0]), 0xffff_10c8);
    }

    #[test]
    fn test_cmyk_full_black() {
        let packer = pixel_packer(SampleFormat::Cmyk);
        assert_eq!(packer(&[0, 0, 0, 255]), 0xffff_ffff);
        assert_eq!(packer(&[200, 10, 90, 255]), 0xffff_ffff);
        // (100 * 128) >> 8 + 128
        assert_eq!(packer(&[100, 0, 0, 128]), 0xffb2_8080);
    }

    #[test]
    fn test_channel_orders() {
        let bytes = [0x11, 0x22, 0x33, 0x44];
        assert_eq!(pixel_packer(SampleFormat::Rgb)(&bytes), 0xff11_2233);
        assert_eq!(pixel_packer(SampleFormat::Argb)(&bytes), 0xff11_2233);
        assert_eq!(pixel_packer(SampleFormat::Bgr)(&bytes), 0xff33_2211);
        assert_eq!(pixel_packer(SampleFormat::Abgr)(&bytes), 0xff33_2211);
        assert_eq!(pixel_packer(SampleFormat::Barg)(&bytes), 0xff33_4411);
    }

    #[test]
    fn test_splitter_drops_odd_byte() {
        let mut session = DecodeSession::default();
        let mut splitter = ChannelSplitter::new(1, ByteOrder::BigEndian);
        splitter.consume(&[0, 1, 0, 2, 0, 3, 9], 7, &mut session);

        assert!(splitter.is_full());
        assert_eq!(splitter.planes, [vec![1], vec![2], vec![3]]);
        assert_eq!(session.range, Some((1, 3)));
    }

    #[test]
    fn test_zero_fill_is_not_tracked() {
        let mut session = DecodeSession::default();
        let mut splitter = ChannelSplitter::new(1, ByteOrder::BigEndian);
        splitter.consume(&[0, 5, 0, 0, 0, 0], 2, &mut session);

        assert!(splitter.is_full());
        assert_eq!(session.range, Some((5, 5)));
    }
}
