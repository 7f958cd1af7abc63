pub mod deflate;
pub mod lzw;
pub mod packbits;
pub mod predictor;

use crate::layout::Compression;

/// Output bounds handed to the decompressors.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Expected size of one PackBits strip; zero when unknown.
    pub strip_bytes: usize,
    /// Upper bound on the output of one LZW or Deflate strip.
    pub image_bytes: usize,
}

/// Expands one strip according to `compression`. Uncompressed strips pass through.
pub fn uncompress(compression: Compression, input: Vec<u8>, limits: Limits) -> Vec<u8> {
    match compression {
        Compression::None => input,
        Compression::PackBits => packbits::decompress(&input, limits.strip_bytes),
        Compression::Lzw | Compression::LzwWithDifferencing => lzw::decompress(&input, limits.image_bytes),
        Compression::Deflate => deflate::decompress(&input, limits.image_bytes),
    }
}
