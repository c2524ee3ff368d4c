//! Test picture generation

use rsane_core::frame::FrameParameters;

/// Picture produced by the emulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestPicture {
    /// Every sample at its minimum
    #[default]
    SolidBlack,
    /// Every sample at its maximum
    SolidWhite,
    /// Horizontal gradient (gray) or red/green/blue bands (color)
    ColorPattern,
}

impl TestPicture {
    /// Option value names, in constraint order
    pub const NAMES: [&'static str; 3] = ["Solid black", "Solid white", "Color pattern"];

    /// Option value name
    pub fn name(self) -> &'static str {
        match self {
            TestPicture::SolidBlack => Self::NAMES[0],
            TestPicture::SolidWhite => Self::NAMES[1],
            TestPicture::ColorPattern => Self::NAMES[2],
        }
    }

    /// Parse an option value name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Solid black" => Some(TestPicture::SolidBlack),
            "Solid white" => Some(TestPicture::SolidWhite),
            "Color pattern" => Some(TestPicture::ColorPattern),
            _ => None,
        }
    }

    /// Intensity (0..=255) of one sample
    fn intensity(self, x: usize, channel: usize, params: &FrameParameters) -> u8 {
        match self {
            TestPicture::SolidBlack => 0,
            TestPicture::SolidWhite => u8::MAX,
            TestPicture::ColorPattern => {
                let width = params.pixels_per_line.max(1);
                if params.mode.samples_per_pixel() == 3 {
                    // One band per channel
                    if x * 3 / width == channel {
                        u8::MAX
                    } else {
                        0
                    }
                } else {
                    (x * 255 / width.saturating_sub(1).max(1)).min(255) as u8
                }
            }
        }
    }

    /// Append one scan line, padding included, to `out`
    pub(crate) fn render_line(self, params: &FrameParameters, out: &mut Vec<u8>) {
        let spp = params.mode.samples_per_pixel();
        let start = out.len();
        let samples = (0..params.pixels_per_line)
            .flat_map(|x| (0..spp).map(move |c| (x, c)))
            .map(|(x, c)| self.intensity(x, c, params));

        match params.depth {
            1 => {
                let mut byte = 0u8;
                let mut bits = 0;
                for sample in samples {
                    byte = (byte << 1) | u8::from(sample >= 0x80);
                    bits += 1;
                    if bits == 8 {
                        out.push(byte);
                        byte = 0;
                        bits = 0;
                    }
                }
                if bits > 0 {
                    out.push(byte << (8 - bits));
                }
            }
            16 => {
                for sample in samples {
                    out.extend_from_slice(&u16::from_be_bytes([sample, sample]).to_ne_bytes());
                }
            }
            _ => out.extend(samples),
        }

        let written = out.len() - start;
        out.resize(start + params.bytes_per_line.max(written), 0xA5);
    }
}
