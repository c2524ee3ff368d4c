//! Assembled raster image

use crate::frame::ColorMode;

/// Color model of a raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// 8-bit luminance, one byte per pixel
    Gray,
    /// 8-bit red, green, blue, three bytes per pixel
    Rgb,
}

impl ColorModel {
    /// Bytes per pixel in the raster
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
        }
    }
}

impl From<ColorMode> for ColorModel {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Monochrome | ColorMode::Gray => ColorModel::Gray,
            ColorMode::Color => ColorModel::Rgb,
        }
    }
}

/// One pixel of a raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    /// Luminance
    Gray(u8),
    /// Red, green, blue
    Rgb([u8; 3]),
}

impl Pixel {
    /// Black in the given color model
    pub fn black(model: ColorModel) -> Self {
        match model {
            ColorModel::Gray => Pixel::Gray(0),
            ColorModel::Rgb => Pixel::Rgb([0, 0, 0]),
        }
    }

    /// White in the given color model
    pub fn white(model: ColorModel) -> Self {
        match model {
            ColorModel::Gray => Pixel::Gray(u8::MAX),
            ColorModel::Rgb => Pixel::Rgb([u8::MAX; 3]),
        }
    }
}

/// Bounds-checked 8-bit pixel buffer
///
/// Pixels are stored row-major without padding. The image is immutable once
/// returned by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    model: ColorModel,
    data: Vec<u8>,
}

impl RasterImage {
    pub(crate) fn new(width: usize, height: usize, model: ColorModel, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * model.bytes_per_pixel());
        Self {
            width,
            height,
            model,
            data,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Color model
    pub fn color_model(&self) -> ColorModel {
        self.model
    }

    /// Pixel at (x, y), or `None` outside `[0, width) x [0, height)`
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.model.bytes_per_pixel();
        let off = (y * self.width + x) * bpp;
        Some(match self.model {
            ColorModel::Gray => Pixel::Gray(self.data[off]),
            ColorModel::Rgb => Pixel::Rgb([self.data[off], self.data[off + 1], self.data[off + 2]]),
        })
    }

    /// Iterate over all pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let bpp = self.model.bytes_per_pixel();
        self.data.chunks_exact(bpp).map(move |p| match self.model {
            ColorModel::Gray => Pixel::Gray(p[0]),
            ColorModel::Rgb => Pixel::Rgb([p[0], p[1], p[2]]),
        })
    }

    /// Raw pixel bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return its pixel bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_bounds() {
        let img = RasterImage::new(2, 1, ColorModel::Rgb, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(img.pixel(1, 0), Some(Pixel::Rgb([4, 5, 6])));
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(0, 1), None);
        assert_eq!(img.pixels().count(), 2);
    }
}
