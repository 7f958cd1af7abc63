//! Single-channel formats from 8 to 64 bits per sample.

use super::{DecodeContext, Region};
use crate::layout::{ByteOrder, SampleFormat};
use crate::strips::PixelSource;
use crate::utils::error::RawResult;
use crate::utils::image::PixelData;

const SIGNED_16_BIAS: u16 = 32768;

pub fn read_8bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let n_pixels = ctx.geometry.n_pixels;
    read_8bit_samples(ctx, n_pixels).map(PixelData::L8)
}

/// 8-bit samples, `count` of them. Planar RGB reads its three planes through here.
pub(crate) fn read_8bit_samples<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>, count: usize) -> RawResult<Vec<u8>> {
    let strips = ctx.layout.strips();
    ctx.read_samples(Region::of(&strips), count, 1, |b| b[0])
}

/// Two samples in three bytes: `s0 = b0 << 4 | b1 >> 4`, `s1 = (b1 & 0xF) << 8 | b2`.
/// Each scanline starts on a byte boundary.
pub fn read_12bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let width = ctx.geometry.width;
    let height = ctx.geometry.height;
    let bytes_per_line = (width * 3).div_ceil(2);

    let strips = ctx.layout.strips();
    let buffer = ctx.read_bytes(Region::of(&strips), bytes_per_line * height)?;
    let mut pixels = vec![0u16; ctx.geometry.n_pixels];

    for (line, row) in buffer.chunks_exact(bytes_per_line).zip(pixels.chunks_exact_mut(width)) {
        for (x, pixel) in row.iter_mut().enumerate() {
            let i = (x / 2) * 3;
            *pixel = if x % 2 == 0 {
                ((line[i] as u16) << 4) | (line[i + 1] as u16 >> 4)
            } else {
                (((line[i + 1] & 0xF) as u16) << 8) | line[i + 2] as u16
            };
        }
    }

    Ok(PixelData::L16(pixels))
}

pub fn read_16bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let strips = ctx.layout.strips();
    read_16bit_region(ctx, Region::of(&strips)).map(PixelData::L16)
}

/// 16-bit samples in the layout's byte order; signed data is shifted into the
/// unsigned range after the predictor has run.
pub(crate) fn read_16bit_region<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>, region: Region) -> RawResult<Vec<u16>> {
    let convert: fn(&[u8]) -> u16 = match ctx.byte_order() {
        ByteOrder::LittleEndian => |b| u16::from_le_bytes([b[0], b[1]]),
        ByteOrder::BigEndian => |b| u16::from_be_bytes([b[0], b[1]]),
    };

    let mut pixels = ctx.read_samples(region, ctx.geometry.n_pixels, 2, convert)?;

    if ctx.layout.format == SampleFormat::Gray16Signed {
        for pixel in pixels.iter_mut() {
            *pixel = pixel.wrapping_add(SIGNED_16_BIAS);
        }
    }

    Ok(pixels)
}

/// Three bytes per sample, least significant first regardless of byte order.
pub fn read_24bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let n_pixels = ctx.geometry.n_pixels;
    let strips = ctx.layout.strips();
    let buffer = ctx.read_bytes(Region::of(&strips), n_pixels * 3)?;

    let pixels = buffer
        .chunks_exact(3)
        .map(|b| ((b[2] as u32) << 16 | (b[1] as u32) << 8 | b[0] as u32) as f32)
        .collect();

    Ok(PixelData::L32F(pixels))
}

/// Four bytes per sample, read as float bits, unsigned or signed integer by format.
pub fn read_32bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let word: fn(&[u8]) -> u32 = match ctx.byte_order() {
        ByteOrder::LittleEndian => |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        ByteOrder::BigEndian => |b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
    };

    let interpret: fn(u32) -> f32 = match ctx.layout.format {
        SampleFormat::Gray32Float => f32::from_bits,
        SampleFormat::Gray32Unsigned => |v| v as f32,
        _ => |v| v as i32 as f32,
    };

    let strips = ctx.layout.strips();
    let pixels = ctx.read_samples(Region::of(&strips), ctx.geometry.n_pixels, 4, |b| interpret(word(b)))?;

    Ok(PixelData::L32F(pixels))
}

/// Eight bytes of IEEE-754 double per sample, narrowed to `f32`.
pub fn read_64bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    let convert: fn(&[u8]) -> f32 = match ctx.byte_order() {
        ByteOrder::LittleEndian => |b| {
            f64::from_bits(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])) as f32
        },
        ByteOrder::BigEndian => |b| {
            f64::from_bits(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])) as f32
        },
    };

    let strips = ctx.layout.strips();
    let pixels = ctx.read_samples(Region::of(&strips), ctx.geometry.n_pixels, 8, convert)?;

    Ok(PixelData::L32F(pixels))
}
