use crate::utils::error::{RawError, RawResult};

/// Declared sample layout of the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 1 bit per pixel, MSB first, scanlines padded to whole bytes.
    Bitmap,
    Gray8,
    /// Two 12-bit samples packed into three bytes.
    Gray12Unsigned,
    Gray16Signed,
    Gray16Unsigned,
    /// Three little-endian bytes per sample.
    Gray24Unsigned,
    Gray32Int,
    Gray32Unsigned,
    Gray32Float,
    Gray64Float,
    Rgb,
    Bgr,
    Argb,
    Barg,
    Abgr,
    Cmyk,
    /// Three full-frame 8-bit planes: red, green, blue.
    RgbPlanar,
    /// Interleaved 16-bit red, green, blue samples.
    Rgb48,
    /// Three full-frame 16-bit planes.
    Rgb48Planar,
}

impl SampleFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            SampleFormat::Bitmap | SampleFormat::Gray8 => 1,
            SampleFormat::Gray12Unsigned
            | SampleFormat::Gray16Signed
            | SampleFormat::Gray16Unsigned
            | SampleFormat::Rgb48Planar => 2,
            SampleFormat::Gray24Unsigned
            | SampleFormat::Rgb
            | SampleFormat::Bgr
            | SampleFormat::RgbPlanar => 3,
            SampleFormat::Gray32Int
            | SampleFormat::Gray32Unsigned
            | SampleFormat::Gray32Float
            | SampleFormat::Argb
            | SampleFormat::Barg
            | SampleFormat::Abgr
            | SampleFormat::Cmyk => 4,
            SampleFormat::Rgb48 => 6,
            SampleFormat::Gray64Float => 8,
        }
    }

    pub fn is_chunky_rgb(&self) -> bool {
        matches!(
            self,
            SampleFormat::Rgb
                | SampleFormat::Bgr
                | SampleFormat::Argb
                | SampleFormat::Barg
                | SampleFormat::Abgr
                | SampleFormat::Cmyk
        )
    }
}

impl TryFrom<&str> for SampleFormat {
    type Error = RawError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "bitmap" | "1bit" => Ok(Self::Bitmap),
            "gray8" => Ok(Self::Gray8),
            "gray12" => Ok(Self::Gray12Unsigned),
            "gray16s" | "gray16-signed" => Ok(Self::Gray16Signed),
            "gray16" | "gray16u" => Ok(Self::Gray16Unsigned),
            "gray24" => Ok(Self::Gray24Unsigned),
            "gray32i" | "gray32-int" => Ok(Self::Gray32Int),
            "gray32u" | "gray32-unsigned" => Ok(Self::Gray32Unsigned),
            "gray32f" | "gray32-float" => Ok(Self::Gray32Float),
            "gray64f" | "gray64-float" => Ok(Self::Gray64Float),
            "rgb" => Ok(Self::Rgb),
            "bgr" => Ok(Self::Bgr),
            "argb" => Ok(Self::Argb),
            "barg" => Ok(Self::Barg),
            "abgr" => Ok(Self::Abgr),
            "cmyk" => Ok(Self::Cmyk),
            "rgb-planar" => Ok(Self::RgbPlanar),
            "rgb48" => Ok(Self::Rgb48),
            "rgb48-planar" => Ok(Self::Rgb48Planar),
            _ => Err(RawError::Custom(format!("Invalid sample format: {}", value))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    PackBits,
    Lzw,
    /// LZW followed by the horizontal differencing predictor.
    LzwWithDifferencing,
    Deflate,
}

impl Compression {
    pub fn is_lzw(&self) -> bool {
        matches!(self, Compression::Lzw | Compression::LzwWithDifferencing)
    }
}

impl TryFrom<&str> for Compression {
    type Error = RawError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "packbits" => Ok(Self::PackBits),
            "lzw" => Ok(Self::Lzw),
            "lzw-predictor" | "lzw-differencing" => Ok(Self::LzwWithDifferencing),
            "deflate" | "zip" => Ok(Self::Deflate),
            _ => Err(RawError::Custom(format!("Invalid compression value: {}", value))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    LittleEndian,
    #[default]
    BigEndian,
}

/// One contiguous byte range of pixel data in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    pub offset: u64,
    pub length: u64,
}

/// Describes where and how the pixel data of one image is stored.
///
/// Produced by a header parser; the decoder treats it as read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    pub format: SampleFormat,
    pub compression: Compression,
    pub byte_order: ByteOrder,
    /// Bytes to skip before the first image.
    pub offset: u64,
    pub strip_offsets: Option<Vec<u64>>,
    pub strip_lengths: Option<Vec<u64>>,
    pub rows_per_strip: u32,
    /// Bytes to skip between consecutive images of a stack.
    pub gap_between_images: u64,
}

impl ImageLayout {
    pub fn new(width: u32, height: u32, format: SampleFormat) -> ImageLayout {
        ImageLayout {
            width,
            height,
            format,
            compression: Compression::None,
            byte_order: ByteOrder::BigEndian,
            offset: 0,
            strip_offsets: None,
            strip_lengths: None,
            rows_per_strip: 0,
            gap_between_images: 0,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_strips(mut self, offsets: Vec<u64>, lengths: Vec<u64>) -> Self {
        self.strip_offsets = Some(offsets);
        self.strip_lengths = Some(lengths);
        self
    }

    pub fn with_rows_per_strip(mut self, rows_per_strip: u32) -> Self {
        self.rows_per_strip = rows_per_strip;
        self
    }

    pub fn with_gap(mut self, gap_between_images: u64) -> Self {
        self.gap_between_images = gap_between_images;
        self
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Uncompressed size of one image; 1-bit scanlines are padded to whole bytes.
    pub fn image_bytes(&self) -> u64 {
        match self.format {
            SampleFormat::Bitmap => (self.width as u64).div_ceil(8) * self.height as u64,
            _ => self.width as u64 * self.height as u64 * self.bytes_per_pixel() as u64,
        }
    }

    pub fn has_strips(&self) -> bool {
        self.strip_offsets.as_ref().is_some_and(|offsets| !offsets.is_empty())
    }

    /// Checks the layout for problems that would make decoding meaningless.
    pub fn validate(&self) -> RawResult<()> {
        let pixels = (self.width as u64).checked_mul(self.height as u64);
        let fits = pixels
            .and_then(|p| p.checked_mul(self.bytes_per_pixel() as u64 * 3))
            .is_some_and(|bytes| usize::try_from(bytes).is_ok());

        if self.width == 0 || self.height == 0 || !fits {
            return Err(RawError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        match (&self.strip_offsets, &self.strip_lengths) {
            (Some(offsets), Some(lengths)) if offsets.len() != lengths.len() => {
                return Err(RawError::InvalidLayout(format!(
                    "{} strip offsets but {} strip lengths",
                    offsets.len(),
                    lengths.len()
                )));
            }
            (Some(offsets), None) if offsets.len() > 1 => {
                return Err(RawError::InvalidLayout(
                    "strip lengths are required when more than one strip is declared".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(RawError::InvalidLayout(
                    "strip lengths given without strip offsets".to_string(),
                ));
            }
            _ => {}
        }

        if self.compression != Compression::None && !self.has_strips() {
            return Err(RawError::InvalidLayout(format!(
                "{:?} compressed data requires strip offsets",
                self.compression
            )));
        }

        Ok(())
    }

    /// Strip ranges in file order.
    ///
    /// A single offset without lengths spans the whole uncompressed image.
    pub fn strips(&self) -> Vec<Strip> {
        let Some(offsets) = &self.strip_offsets else {
            return Vec::new();
        };

        match &self.strip_lengths {
            Some(lengths) => offsets
                .iter()
                .zip(lengths.iter())
                .map(|(&offset, &length)| Strip { offset, length })
                .collect(),
            None => offsets
                .iter()
                .map(|&offset| Strip {
                    offset,
                    length: self.image_bytes(),
                })
                .collect(),
        }
    }
}
