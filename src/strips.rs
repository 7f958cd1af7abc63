use crate::layout::Strip;
use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom};

/// A byte stream the decoder can read pixel data from.
///
/// Sources are either sequential-only or seekable. Sequential sources skip forward
/// by reading and discarding; they never move backwards.
pub trait PixelSource: Read {
    /// Moves to an absolute offset. Returns `Ok(false)` if the source cannot seek.
    fn seek_to(&mut self, _offset: u64) -> io::Result<bool> {
        Ok(false)
    }

    /// Skips up to `count` bytes and returns how many were skipped.
    fn skip_bytes(&mut self, count: u64) -> io::Result<u64> {
        io::copy(&mut (&mut *self).take(count), &mut io::sink())
    }
}

impl<S: PixelSource + ?Sized> PixelSource for &mut S {
    fn seek_to(&mut self, offset: u64) -> io::Result<bool> {
        (**self).seek_to(offset)
    }

    fn skip_bytes(&mut self, count: u64) -> io::Result<u64> {
        (**self).skip_bytes(count)
    }
}

impl<T: AsRef<[u8]>> PixelSource for Cursor<T> {
    fn seek_to(&mut self, offset: u64) -> io::Result<bool> {
        self.seek(SeekFrom::Start(offset))?;
        Ok(true)
    }

    fn skip_bytes(&mut self, count: u64) -> io::Result<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        let skipped = count.min(len.saturating_sub(self.position()));
        self.set_position(self.position() + skipped);
        Ok(skipped)
    }
}

/// Wraps a reader that can only be read front to back.
#[derive(Debug)]
pub struct Sequential<R> {
    inner: R,
}

impl<R: Read> Sequential<R> {
    pub fn new(inner: R) -> Self {
        Sequential { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Sequential<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> PixelSource for Sequential<R> {}

/// Wraps a reader with random access.
#[derive(Debug)]
pub struct Seekable<R> {
    inner: R,
}

impl<R: Read + Seek> Seekable<R> {
    pub fn new(inner: R) -> Self {
        Seekable { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for Seekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> PixelSource for Seekable<R> {
    fn seek_to(&mut self, offset: u64) -> io::Result<bool> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(true)
    }

    fn skip_bytes(&mut self, count: u64) -> io::Result<u64> {
        let current = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        let skipped = count.min(end.saturating_sub(current));
        self.inner.seek(SeekFrom::Start(current + skipped))?;
        Ok(skipped)
    }
}

/// Per-call read statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub bytes_read: u64,
    pub eof_errors: u32,
}

/// Fills `buf` from the source, stopping early at end of stream.
///
/// Hitting the end counts one EOF error; the unread tail of `buf` is zeroed.
/// Any other I/O error is returned.
pub fn read_fully<S: PixelSource + ?Sized>(
    source: &mut S,
    buf: &mut [u8],
    stats: &mut ReadStats,
) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                stats.eof_errors += 1;
                buf[filled..].fill(0);
                break;
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    stats.bytes_read += filled as u64;
    Ok(filled)
}

/// Positions the source at each strip in turn and reads its raw bytes.
#[derive(Debug, Default)]
pub struct StripFetcher {
    position: Option<u64>,
}

impl StripFetcher {
    pub fn new() -> Self {
        StripFetcher { position: None }
    }

    /// Reads the raw bytes of `strip`, at most `limit` of them.
    ///
    /// Seekable sources seek to the strip offset. Sequential sources skip the gap
    /// since the end of the previous strip, if it is positive. A short read leaves
    /// the rest of the returned buffer zeroed.
    pub fn fetch<S: PixelSource + ?Sized>(
        &mut self,
        source: &mut S,
        strip: Strip,
        limit: Option<u64>,
        stats: &mut ReadStats,
    ) -> io::Result<Vec<u8>> {
        if !source.seek_to(strip.offset)? {
            if let Some(position) = self.position {
                if strip.offset > position {
                    let gap = strip.offset - position;
                    let skipped = source.skip_bytes(gap)?;
                    if skipped < gap {
                        log::debug!("Short skip before strip at {}: {} of {}", strip.offset, skipped, gap);
                    }
                }
            }
        }

        let length = limit.map_or(strip.length, |limit| strip.length.min(limit));
        let mut buf = vec![0u8; length as usize];
        let read = read_fully(source, &mut buf, stats)?;

        if (read as u64) < length {
            log::warn!(
                "Strip at offset {} truncated: {} of {} bytes",
                strip.offset,
                read,
                length
            );
        }

        self.position = Some(strip.offset + read as u64);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_skips_gap() -> Result<(), Box<dyn std::error::Error>> {
        let data: Vec<u8> = (0..20).collect();
        let mut source = Sequential::new(&data[..]);
        let mut fetcher = StripFetcher::new();
        let mut stats = ReadStats::default();

        let first = fetcher.fetch(&mut source, Strip { offset: 0, length: 4 }, None, &mut stats)?;
        let second = fetcher.fetch(&mut source, Strip { offset: 10, length: 3 }, None, &mut stats)?;

        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(second, vec![10, 11, 12]);
        assert_eq!(stats.bytes_read, 7);

        Ok(())
    }

    #[test]
    fn test_seekable_reads_out_of_order() -> Result<(), Box<dyn std::error::Error>> {
        let data: Vec<u8> = (0..20).collect();
        let mut source = Cursor::new(data);
        let mut fetcher = StripFetcher::new();
        let mut stats = ReadStats::default();

        let late = fetcher.fetch(&mut source, Strip { offset: 15, length: 2 }, None, &mut stats)?;
        let early = fetcher.fetch(&mut source, Strip { offset: 2, length: 2 }, None, &mut stats)?;

        assert_eq!(late, vec![15, 16]);
        assert_eq!(early, vec![2, 3]);

        Ok(())
    }

    #[test]
    fn test_truncated_strip_is_zero_filled() -> Result<(), Box<dyn std::error::Error>> {
        let data = vec![9u8; 5];
        let mut source = Sequential::new(&data[..]);
        let mut fetcher = StripFetcher::new();
        let mut stats = ReadStats::default();

        let strip = fetcher.fetch(&mut source, Strip { offset: 0, length: 8 }, None, &mut stats)?;

        assert_eq!(strip, vec![9, 9, 9, 9, 9, 0, 0, 0]);
        assert_eq!(stats.eof_errors, 1);

        Ok(())
    }

    #[test]
    fn test_limit_clamps_length() -> Result<(), Box<dyn std::error::Error>> {
        let data: Vec<u8> = (0..10).collect();
        let mut source = Sequential::new(&data[..]);
        let mut fetcher = StripFetcher::new();
        let mut stats = ReadStats::default();

        let strip = fetcher.fetch(&mut source, Strip { offset: 0, length: 8 }, Some(3), &mut stats)?;

        assert_eq!(strip, vec![0, 1, 2]);
        assert_eq!(stats.eof_errors, 0);

        Ok(())
    }
}
