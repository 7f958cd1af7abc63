//! Decoder for raw, strip-based raster data: uncompressed, PackBits, LZW and
//! Deflate strips holding gray, chunky or planar color samples.

pub mod compression;
mod decoders;
pub mod geometry;
pub mod layout;
mod reader;
pub mod strips;
pub mod utils;

pub use layout::{ByteOrder, Compression, ImageLayout, SampleFormat, Strip};
pub use reader::ImageReader;
pub use strips::{PixelSource, Seekable, Sequential};
pub use utils::error::{RawError, RawResult};
pub use utils::image::{DecodedImage, PixelData};
pub use utils::{bytevector, logger, writer};

