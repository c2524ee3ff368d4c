//! Frame parameters and read status

use core::fmt;

/// Color model of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// One bit-level sample per pixel (lineart)
    Monochrome,
    /// One sample per pixel
    Gray,
    /// Interleaved red, green and blue samples per pixel
    Color,
}

impl ColorMode {
    /// Number of samples per pixel
    pub fn samples_per_pixel(self) -> usize {
        match self {
            ColorMode::Monochrome | ColorMode::Gray => 1,
            ColorMode::Color => 3,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorMode::Monochrome => "monochrome",
            ColorMode::Gray => "gray",
            ColorMode::Color => "color",
        };
        f.write_str(name)
    }
}

/// Geometry and format of one frame
///
/// Frozen when an acquisition starts and immutable until it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParameters {
    /// Color model
    pub mode: ColorMode,
    /// Bits per sample
    pub depth: u32,
    /// Bytes per scan line, including any padding
    pub bytes_per_line: usize,
    /// Pixels per scan line
    pub pixels_per_line: usize,
    /// Number of lines, `None` if unknown until end of frame
    pub lines: Option<usize>,
}

impl FrameParameters {
    /// Minimum number of bytes a line needs to hold its pixels
    pub fn packed_line_len(&self) -> usize {
        let bits = self
            .pixels_per_line
            .saturating_mul(self.mode.samples_per_pixel())
            .saturating_mul(self.depth as usize);
        bits.div_ceil(8)
    }

    /// Total frame size in bytes, if the height is known and the size fits
    pub fn frame_len(&self) -> Option<usize> {
        self.lines.and_then(|lines| lines.checked_mul(self.bytes_per_line))
    }
}

impl fmt::Display for FrameParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-bit, {}x",
            self.mode, self.depth, self.pixels_per_line
        )?;
        match self.lines {
            Some(lines) => write!(f, "{}", lines)?,
            None => write!(f, "?")?,
        }
        write!(f, " px, {} bytes/line", self.bytes_per_line)
    }
}

/// Outcome of one read from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` bytes were written to the buffer
    Data(usize),
    /// The frame is exhausted; stop reading
    EndOfFrame,
}
