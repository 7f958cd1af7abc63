//! TIFF-flavoured LZW decoding.
//!
//! Codes are read most significant bit first, starting at 9 bits. The code width
//! grows one code early, as TIFF encoders expect: 10 bits once the next free
//! entry is 511, 11 at 1023 and 12 at 2047.

use crate::utils::bitreader::BitReader;
use crate::utils::bytevector::ByteVector;

pub const CLEAR_CODE: u32 = 256;
pub const EOI_CODE: u32 = 257;

const FIRST_FREE: usize = 258;
const MAX_ENTRIES: usize = 4096;
const MIN_CODE_WIDTH: u8 = 9;

/// Code width to use once `next_free` entries are in use.
pub(crate) fn escalate(next_free: usize, width: u8) -> u8 {
    match next_free {
        511 => 10,
        1023 => 11,
        2047 => 12,
        _ => width,
    }
}

/// String table stored as spans into one byte arena.
///
/// Entries are written once and are either a literal byte or an earlier entry
/// plus one byte.
struct Dictionary {
    arena: Vec<u8>,
    spans: Vec<(usize, usize)>,
}

impl Dictionary {
    fn new() -> Self {
        let mut dictionary = Dictionary {
            arena: Vec::with_capacity(64 * 1024),
            spans: Vec::with_capacity(MAX_ENTRIES),
        };
        dictionary.reset();
        dictionary
    }

    /// Back to the 256 literals plus the two reserved codes.
    fn reset(&mut self) {
        self.arena.clear();
        self.spans.clear();

        for byte in 0..=255u8 {
            self.arena.push(byte);
            self.spans.push((byte as usize, 1));
        }

        // CLEAR and EOI never produce output
        self.spans.push((0, 0));
        self.spans.push((0, 0));
    }

    fn next_free(&self) -> usize {
        self.spans.len()
    }

    fn get(&self, code: usize) -> &[u8] {
        let (start, len) = self.spans[code];
        &self.arena[start..start + len]
    }

    /// Appends `entry(prefix) + suffix` and returns its code.
    fn push(&mut self, prefix: usize, suffix: u8) -> Option<usize> {
        if self.spans.len() >= MAX_ENTRIES {
            return None;
        }

        let (start, len) = self.spans[prefix];
        let new_start = self.arena.len();
        self.arena.extend_from_within(start..start + len);
        self.arena.push(suffix);
        self.spans.push((new_start, len + 1));

        Some(self.spans.len() - 1)
    }
}

/// Decodes one LZW strip, producing at most about `limit` bytes.
///
/// Decoding stops at the end-of-information code, when the input runs out, or
/// at the first code that cannot be valid; whatever was decoded is returned.
pub fn decompress(input: &[u8], limit: usize) -> Vec<u8> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut reader = BitReader::new(input);
    let mut dictionary = Dictionary::new();
    let mut output = ByteVector::with_capacity(8192);
    let mut width = MIN_CODE_WIDTH;
    let mut old_code: Option<usize> = None;

    while output.len() < limit {
        let Some(code) = reader.read_bits(width) else {
            break;
        };

        if code == EOI_CODE {
            break;
        }

        if code == CLEAR_CODE {
            dictionary.reset();
            width = MIN_CODE_WIDTH;
            old_code = None;
            continue;
        }

        let code = code as usize;
        let next_free = dictionary.next_free();

        let Some(previous) = old_code else {
            // First code after a reset must be a literal
            if code >= FIRST_FREE {
                log::warn!("LZW code {} before any table entry was defined", code);
                break;
            }
            output.add_slice(dictionary.get(code));
            old_code = Some(code);
            continue;
        };

        if code < next_free {
            output.add_slice(dictionary.get(code));
            let first = dictionary.get(code)[0];
            dictionary.push(previous, first);
        } else if code == next_free {
            let first = dictionary.get(previous)[0];
            match dictionary.push(previous, first) {
                Some(entry) => output.add_slice(dictionary.get(entry)),
                None => break,
            }
        } else {
            log::warn!("LZW code {} beyond next free entry {}", code, next_free);
            break;
        }

        old_code = Some(code);
        width = escalate(dictionary.next_free(), width);
    }

    output.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(codes: &[(u32, u8)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut acc = 0u64;
        let mut bits = 0u32;

        for &(code, width) in codes {
            acc = (acc << width) | code as u64;
            bits += width as u32;
            while bits >= 8 {
                bytes.push((acc >> (bits - 8)) as u8);
                bits -= 8;
            }
        }
        if bits > 0 {
            bytes.push((acc << (8 - bits)) as u8);
        }

        bytes
    }

    #[test]
    fn test_known_strip() {
        let data = pack(&[(256, 9), (65, 9), (66, 9), (258, 9), (257, 9)]);
        assert_eq!(decompress(&data, usize::MAX), b"ABAB".to_vec());
    }

    #[test]
    fn test_code_not_yet_in_table() {
        let data = pack(&[(256, 9), (65, 9), (258, 9), (257, 9)]);
        assert_eq!(decompress(&data, usize::MAX), b"AAA".to_vec());
    }

    #[test]
    fn test_clear_resets_table() {
        let data = pack(&[
            (256, 9),
            (65, 9),
            (66, 9),
            (256, 9),
            (67, 9),
            (258, 9),
            (257, 9),
        ]);
        // Without the reset, 258 would still mean "AB"
        assert_eq!(decompress(&data, usize::MAX), b"ABCCC".to_vec());
    }

    #[test]
    fn test_escalation_thresholds() {
        assert_eq!(escalate(510, 9), 9);
        assert_eq!(escalate(511, 9), 10);
        assert_eq!(escalate(512, 10), 10);
        assert_eq!(escalate(1023, 10), 11);
        assert_eq!(escalate(2047, 11), 12);
        assert_eq!(escalate(3000, 12), 12);
    }

    #[test]
    fn test_limit_stops_output() {
        let data = pack(&[(256, 9), (65, 9), (66, 9), (67, 9), (257, 9)]);
        assert_eq!(decompress(&data, 2), b"AB".to_vec());
    }

    #[test]
    fn test_out_of_range_code_stops() {
        let data = pack(&[(256, 9), (65, 9), (300, 9), (66, 9)]);
        assert_eq!(decompress(&data, usize::MAX), b"A".to_vec());
    }

    #[test]
    fn test_missing_clear_starts_with_literals() {
        let data = pack(&[(72, 9), (73, 9), (257, 9)]);
        assert_eq!(decompress(&data, usize::MAX), b"HI".to_vec());
    }
}
