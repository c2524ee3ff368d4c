//! Streaming scanline assembler

use super::image::{ColorModel, RasterImage};
use crate::error::{Error, Result};
use crate::frame::FrameParameters;

/// Upper bound on storage reserved up front from the declared frame height
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Builds a [`RasterImage`] from the byte stream of one frame
///
/// Chunks may split scan lines anywhere; incomplete lines are carried over
/// to the next [`push`](ImageAssembler::push). Completed rows are available
/// immediately through [`row`](ImageAssembler::row). When the frame height
/// is unknown the backing storage grows until [`finish`](ImageAssembler::finish).
///
/// Samples are unpacked to 8 bits. At depth 1 the most significant bit
/// comes first; a clear bit is black (0) and a set bit is white (255).
#[derive(Debug)]
pub struct ImageAssembler {
    params: FrameParameters,
    model: ColorModel,
    /// Bytes of a line not yet complete
    pending: Vec<u8>,
    data: Vec<u8>,
    rows: usize,
}

impl ImageAssembler {
    /// Create an assembler for a frame
    ///
    /// Fails with [`Error::UnsupportedDepth`] for depths other than 1 and 8,
    /// and with [`Error::InvalidFrame`] if a line cannot hold its pixels.
    pub fn new(params: FrameParameters) -> Result<Self> {
        if params.depth != 1 && params.depth != 8 {
            return Err(Error::UnsupportedDepth {
                depth: params.depth,
            });
        }
        if params.pixels_per_line == 0 {
            return Err(Error::InvalidFrame("zero pixels per line".into()));
        }
        if params.bytes_per_line < params.packed_line_len() {
            return Err(Error::InvalidFrame(format!(
                "{} bytes per line cannot hold {} pixels",
                params.bytes_per_line, params.pixels_per_line
            )));
        }

        let model = ColorModel::from(params.mode);
        let row_len = params
            .pixels_per_line
            .checked_mul(model.bytes_per_pixel())
            .ok_or_else(|| Error::InvalidFrame("line length overflows".into()))?;
        let data = match params.lines {
            Some(lines) => {
                let total = lines.checked_mul(row_len).ok_or_else(|| {
                    Error::InvalidFrame(format!(
                        "{} lines of {} bytes overflow the image size",
                        lines, row_len
                    ))
                })?;
                Vec::with_capacity(total.min(MAX_PREALLOC))
            }
            None => Vec::new(),
        };

        Ok(Self {
            params,
            model,
            pending: Vec::with_capacity(params.bytes_per_line.min(MAX_PREALLOC)),
            data,
            rows: 0,
        })
    }

    /// Frame parameters this assembler was built for
    pub fn parameters(&self) -> &FrameParameters {
        &self.params
    }

    /// Number of complete rows decoded so far
    pub fn rows_completed(&self) -> usize {
        self.rows
    }

    fn row_len(&self) -> usize {
        self.params.pixels_per_line * self.model.bytes_per_pixel()
    }

    /// A decoded row, if it has been completed
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.rows {
            return None;
        }
        let len = self.row_len();
        Some(&self.data[y * len..(y + 1) * len])
    }

    /// Consume the next chunk of the frame
    pub fn push(&mut self, mut chunk: &[u8]) -> Result<()> {
        let bpl = self.params.bytes_per_line;

        if !self.pending.is_empty() {
            let take = (bpl - self.pending.len()).min(chunk.len());
            self.pending.extend_from_slice(&chunk[..take]);
            chunk = &chunk[take..];
            if self.pending.len() < bpl {
                return Ok(());
            }
            let line = std::mem::take(&mut self.pending);
            self.decode_line(&line)?;
            self.pending = line;
            self.pending.clear();
        }

        while chunk.len() >= bpl {
            self.decode_line(&chunk[..bpl])?;
            chunk = &chunk[bpl..];
        }

        self.pending.extend_from_slice(chunk);
        Ok(())
    }

    fn decode_line(&mut self, line: &[u8]) -> Result<()> {
        if let Some(expected) = self.params.lines {
            if self.rows >= expected {
                return Err(Error::FrameSizeMismatch {
                    expected,
                    received: self.rows + 1,
                });
            }
        }

        let samples = self.params.pixels_per_line * self.params.mode.samples_per_pixel();
        match self.params.depth {
            8 => self.data.extend_from_slice(&line[..samples]),
            1 => {
                self.data.extend((0..samples).map(|i| {
                    if line[i / 8] & (0x80 >> (i % 8)) != 0 {
                        u8::MAX
                    } else {
                        0
                    }
                }));
            }
            depth => return Err(Error::UnsupportedDepth { depth }),
        }

        self.rows += 1;
        Ok(())
    }

    /// Complete the frame after end of frame was reached
    ///
    /// Fails if a partial line is left over or the number of rows differs
    /// from a declared height. No image is returned in that case.
    pub fn finish(self) -> Result<RasterImage> {
        if !self.pending.is_empty() {
            return Err(Error::PartialLine {
                bytes: self.pending.len(),
            });
        }
        if let Some(expected) = self.params.lines {
            if self.rows != expected {
                return Err(Error::FrameSizeMismatch {
                    expected,
                    received: self.rows,
                });
            }
        }

        Ok(RasterImage::new(
            self.params.pixels_per_line,
            self.rows,
            self.model,
            self.data,
        ))
    }
}
