//! PackBits run-length decoding.

use crate::utils::bytevector::ByteVector;

/// Expands PackBits data until `expected` bytes have been produced or the input
/// runs out. An `expected` of zero means no limit.
///
/// Control byte `n`:
/// - `0..=127`: copy the next `n + 1` bytes literally
/// - `-127..=-1`: repeat the next byte `1 - n` times
/// - `-128`: no operation
///
/// The output length is checked before each control byte, so the final run may
/// overshoot `expected`.
pub fn decompress(input: &[u8], expected: usize) -> Vec<u8> {
    let expected = if expected == 0 { usize::MAX } else { expected };
    let mut output = ByteVector::with_capacity(1024);
    let mut index = 0;

    while output.len() < expected && index < input.len() {
        let n = input[index] as i8;
        index += 1;

        match n {
            0..=127 => {
                let end = (index + n as usize + 1).min(input.len());
                output.add_slice(&input[index..end]);
                index = end;
            }
            -128 => {}
            _ => {
                let Some(&value) = input.get(index) else {
                    break;
                };
                index += 1;
                output.add_repeated(value, (1 - n as isize) as usize);
            }
        }
    }

    output.into_vec()
}
