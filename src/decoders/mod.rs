pub mod bitmap;
pub mod gray;
pub mod rgb;

use crate::compression::predictor::{self, Sample};
use crate::compression::{self, Limits};
use crate::geometry::Geometry;
use crate::layout::{ByteOrder, Compression, ImageLayout, Strip};
use crate::strips::{read_fully, PixelSource, ReadStats, StripFetcher};
use crate::utils::error::RawResult;

/// Mutable state of one decode call.
#[derive(Debug, Default)]
pub struct DecodeSession {
    pub stats: ReadStats,
    /// Running (min, max) over decoded samples; only the 48-bit path fills it.
    pub range: Option<(u16, u16)>,
}

impl DecodeSession {
    pub fn track(&mut self, value: u16) {
        self.range = Some(match self.range {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }
}

/// Where the pixel data of one image lives.
#[derive(Debug, Clone, Copy)]
pub enum Region<'s> {
    /// One run of uncompressed bytes at the current source position.
    Contiguous,
    Strips(&'s [Strip]),
}

impl<'s> Region<'s> {
    /// Strips when the layout declares any, otherwise contiguous data. Declared
    /// strips are always fetched at their own offsets.
    pub fn of(strips: &'s [Strip]) -> Self {
        if strips.is_empty() {
            Region::Contiguous
        } else {
            Region::Strips(strips)
        }
    }
}

/// Everything a format routine needs while decoding one image.
pub struct DecodeContext<'a, S: ?Sized> {
    pub layout: &'a ImageLayout,
    pub geometry: Geometry,
    pub session: DecodeSession,
    source: &'a mut S,
    /// Tracks the source position across every strip read of the call.
    fetcher: StripFetcher,
}

impl<'a, S: PixelSource + ?Sized> DecodeContext<'a, S> {
    pub fn new(layout: &'a ImageLayout, geometry: Geometry, source: &'a mut S) -> Self {
        DecodeContext {
            layout,
            geometry,
            session: DecodeSession::default(),
            source,
            fetcher: StripFetcher::new(),
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.layout.byte_order
    }

    fn limits(&self) -> Limits {
        let layout = self.layout;
        Limits {
            strip_bytes: layout.rows_per_strip as usize * self.geometry.width * layout.bytes_per_pixel(),
            image_bytes: self.geometry.byte_count as usize,
        }
    }

    /// Reads one strip and expands it. `limit` caps the raw bytes read.
    pub fn fetch_strip(&mut self, strip: Strip, limit: Option<u64>) -> RawResult<Vec<u8>> {
        let raw = self.fetcher.fetch(&mut *self.source, strip, limit, &mut self.session.stats)?;
        let expanded = compression::uncompress(self.layout.compression, raw, self.limits());
        log::debug!(
            "Strip at {}: {} bytes expanded to {}",
            strip.offset,
            strip.length,
            expanded.len()
        );

        Ok(expanded)
    }

    /// Reads every strip in `strips`, handing each expanded strip to `visit`.
    ///
    /// `visit` returns `false` to stop early.
    pub fn for_each_strip<F>(&mut self, strips: &[Strip], mut visit: F) -> RawResult<()>
    where
        F: FnMut(Vec<u8>, &mut DecodeSession) -> bool,
    {
        for &strip in strips {
            let expanded = self.fetch_strip(strip, None)?;
            if !visit(expanded, &mut self.session) {
                break;
            }
        }

        Ok(())
    }

    /// Reads `len` bytes of image data, expanding strips if the data is stored in
    /// them. Missing bytes are left zero.
    pub fn read_bytes(&mut self, region: Region, len: usize) -> RawResult<Vec<u8>> {
        match region {
            Region::Strips(strips) => {
                let mut bytes = Vec::with_capacity(len);
                self.for_each_strip(strips, |strip, _| {
                    let take = strip.len().min(len - bytes.len());
                    bytes.extend_from_slice(&strip[..take]);
                    bytes.len() < len
                })?;
                bytes.resize(len, 0);
                Ok(bytes)
            }
            Region::Contiguous => {
                let mut bytes = vec![0u8; len];
                read_fully(&mut *self.source, &mut bytes, &mut self.session.stats)?;
                Ok(bytes)
            }
        }
    }

    /// Decodes `count` fixed-width samples of `bytes_per_sample` bytes each.
    ///
    /// Contiguous data is read in chunks of `geometry.chunk_size`. Strip data is
    /// expanded per strip, cut to whole scanlines, and run through the predictor
    /// when the compression asks for it.
    pub fn read_samples<T, F>(
        &mut self,
        region: Region,
        count: usize,
        bytes_per_sample: usize,
        convert: F,
    ) -> RawResult<Vec<T>>
    where
        T: Sample,
        F: Fn(&[u8]) -> T,
    {
        match region {
            Region::Strips(strips) => {
                self.read_strip_samples(strips, count, bytes_per_sample, convert)
            }
            Region::Contiguous => self.read_contiguous_samples(count, bytes_per_sample, convert),
        }
    }

    /// Contiguous data only, for sample types the predictor does not handle.
    pub fn read_contiguous_samples<T, F>(&mut self, count: usize, bytes_per_sample: usize, convert: F) -> RawResult<Vec<T>>
    where
        T: Copy + Default,
        F: Fn(&[u8]) -> T,
    {
        let mut pixels = vec![T::default(); count];
        let chunk_size = (self.geometry.chunk_size / bytes_per_sample).max(1) * bytes_per_sample;
        let mut buffer = vec![0u8; chunk_size];
        let mut remaining = count * bytes_per_sample;
        let mut base = 0;

        while remaining > 0 {
            let len = chunk_size.min(remaining);
            let eof_before = self.session.stats.eof_errors;
            read_fully(&mut *self.source, &mut buffer[..len], &mut self.session.stats)?;

            for (pixel, bytes) in pixels[base..].iter_mut().zip(buffer[..len].chunks_exact(bytes_per_sample)) {
                *pixel = convert(bytes);
            }

            base += len / bytes_per_sample;
            remaining -= len;

            if self.session.stats.eof_errors > eof_before {
                break;
            }
        }

        Ok(pixels)
    }

    fn read_strip_samples<T, F>(
        &mut self,
        strips: &[Strip],
        count: usize,
        bytes_per_sample: usize,
        convert: F,
    ) -> RawResult<Vec<T>>
    where
        T: Sample,
        F: Fn(&[u8]) -> T,
    {
        let width = self.geometry.width;
        let differencing = self.layout.compression == Compression::LzwWithDifferencing;
        let mut pixels = vec![T::default(); count];
        let mut base = 0;
        let mut last = T::default();

        self.for_each_strip(strips, |strip, _| {
            let samples_read = strip.len() / bytes_per_sample;
            let samples_read = samples_read - samples_read % width;
            let end = (base + samples_read).min(count);

            for (pixel, bytes) in pixels[base..end].iter_mut().zip(strip.chunks_exact(bytes_per_sample)) {
                *pixel = convert(bytes);
            }

            if differencing {
                predictor::undo_scanline(&mut pixels[base..end], base, width, &mut last);
            }

            base += samples_read;
            base < count
        })?;

        Ok(pixels)
    }
}
