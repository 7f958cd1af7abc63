//! Deflate (zlib-wrapped) strip decoding.

use crate::utils::bytevector::ByteVector;
use flate2::read::ZlibDecoder;
use std::io::{ErrorKind, Read};

/// Inflates a zlib stream, producing at most `limit` bytes. A malformed or
/// truncated stream yields everything inflated before the damage.
pub fn decompress(input: &[u8], limit: usize) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(input);
    let mut output = ByteVector::with_capacity((input.len() * 2).min(limit));
    let mut buffer = [0u8; 1024];

    while output.len() < limit {
        match decoder.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                let take = n.min(limit - output.len());
                output.add_slice(&buffer[..take]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Deflate stream damaged after {} bytes: {}", output.len(), e);
                break;
            }
        }
    }

    output.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inflate() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(decompress(&compress(&data), usize::MAX), data);
    }

    #[test]
    fn test_garbage_yields_empty() {
        assert!(decompress(&[0xde, 0xad, 0xbe, 0xef], usize::MAX).is_empty());
    }

    #[test]
    fn test_truncated_stream_yields_prefix() {
        let data: Vec<u8> = (0..20000u32).map(|i| (i * 7 % 256) as u8).collect();
        let compressed = compress(&data);
        let partial = decompress(&compressed[..compressed.len() / 2], usize::MAX);

        assert!(partial.len() < data.len());
        assert_eq!(&data[..partial.len()], &partial[..]);
    }

    #[test]
    fn test_output_is_capped() {
        let data = vec![0u8; 100_000];
        let inflated = decompress(&compress(&data), 4096);

        assert_eq!(inflated.len(), 4096);
    }
}
