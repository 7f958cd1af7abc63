use super::{DecodeContext, Region};
use crate::strips::PixelSource;
use crate::utils::error::{RawError, RawResult};
use crate::utils::image::PixelData;

/// 1-bit data, most significant bit first, expanded to 0 or 255 per pixel.
pub fn read_1bit<S: PixelSource + ?Sized>(ctx: &mut DecodeContext<S>) -> RawResult<PixelData> {
    if ctx.layout.compression.is_lzw() {
        return Err(RawError::UnsupportedFormat(
            "1-bit images cannot be LZW compressed".to_string(),
        ));
    }

    let width = ctx.geometry.width;
    let height = ctx.geometry.height;
    let scan = width.div_ceil(8);

    let strips = ctx.layout.strips();
    let buffer = ctx.read_bytes(Region::of(&strips), scan * height)?;
    let mut pixels = vec![0u8; ctx.geometry.n_pixels];

    for (line, row) in buffer.chunks_exact(scan).zip(pixels.chunks_exact_mut(width)) {
        for (x, pixel) in row.iter_mut().enumerate() {
            let bit = line[x / 8] & (0x80 >> (x % 8));
            *pixel = if bit != 0 { 255 } else { 0 };
        }
    }

    Ok(PixelData::L8(pixels))
}
