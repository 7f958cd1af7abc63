use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ExtendedColorType, ImageFormat};

use crate::utils::error::{RawError, RawResult};
use crate::utils::image::{DecodedImage, PixelData};

pub struct Writer {}

impl Writer {
    /// Binary PGM for gray images, PPM for color, 8 bits per sample.
    pub fn write_ppm(output_path: &Path, image: &DecodedImage) -> RawResult<()> {
        let bytes = Writer::display_bytes(image)?;
        let magic = if image.pixels().is_color() { "P6" } else { "P5" };

        let mut file = BufWriter::new(File::create(output_path)?);
        file.write_all(format!("{}\n{} {}\n255\n", magic, image.width(), image.height()).as_bytes())?;
        file.write_all(&bytes)?;
        file.flush()?;

        Ok(())
    }

    /// PAM keeps 16-bit samples as they are; everything else is written as 8-bit.
    pub fn write_pam(output_path: &Path, image: &DecodedImage) -> RawResult<()> {
        let mut file = BufWriter::new(File::create(output_path)?);

        file.write_all(b"P7\n")?;
        file.write_all(format!("WIDTH {}\n", image.width()).as_bytes())?;
        file.write_all(format!("HEIGHT {}\n", image.height()).as_bytes())?;

        match image.pixels() {
            PixelData::L16(pixels) => {
                file.write_all(b"DEPTH 1\nMAXVAL 65535\nTUPLTYPE GRAYSCALE\nENDHDR\n")?;
                for value in pixels {
                    file.write_all(&value.to_be_bytes())?;
                }
            }
            PixelData::Rgb48([red, green, blue]) => {
                file.write_all(b"DEPTH 3\nMAXVAL 65535\nTUPLTYPE RGB\nENDHDR\n")?;
                for ((r, g), b) in red.iter().zip(green).zip(blue) {
                    file.write_all(&r.to_be_bytes())?;
                    file.write_all(&g.to_be_bytes())?;
                    file.write_all(&b.to_be_bytes())?;
                }
            }
            PixelData::Argb32(_) => {
                file.write_all(b"DEPTH 3\nMAXVAL 255\nTUPLTYPE RGB\nENDHDR\n")?;
                file.write_all(&Writer::display_bytes(image)?)?;
            }
            PixelData::L8(_) | PixelData::L32F(_) => {
                file.write_all(b"DEPTH 1\nMAXVAL 255\nTUPLTYPE GRAYSCALE\nENDHDR\n")?;
                file.write_all(&Writer::display_bytes(image)?)?;
            }
        }

        file.flush()?;
        Ok(())
    }

    pub fn write_png(output_path: &Path, image: &DecodedImage) -> RawResult<()> {
        let bytes = Writer::display_bytes(image)?;
        let color = if image.pixels().is_color() {
            ExtendedColorType::Rgb8
        } else {
            ExtendedColorType::L8
        };

        image::save_buffer_with_format(
            output_path,
            &bytes,
            image.width(),
            image.height(),
            color,
            ImageFormat::Png,
        )
        .map_err(|e| RawError::Custom(format!("PNG encoding failed: {}", e)))
    }

    fn display_bytes(image: &DecodedImage) -> RawResult<Vec<u8>> {
        let bytes = image.as_display_bytes();
        let channels = if image.pixels().is_color() { 3 } else { 1 };
        let expected_size = image.width() as usize * image.height() as usize * channels;

        if bytes.len() != expected_size {
            return Err(RawError::Custom(format!(
                "Invalid pixel data size for {}x{} image: expected {} bytes, got {}",
                image.width(),
                image.height(),
                expected_size,
                bytes.len()
            )));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_is_rejected() {
        let image = DecodedImage::new(2, 2, PixelData::L8(vec![0; 3]));
        assert!(matches!(Writer::display_bytes(&image), Err(RawError::Custom(_))));
    }
}
