//! Writing scanned images to files

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use rsane_core::raster::{ColorModel, RasterImage};
use std::path::Path;
use thiserror::Error;

/// Image file errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot tell image format from '{0}' (use .png, .jpg, .jpeg, .tif or .tiff)")]
    UnrecognizedExtension(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("raster of {width}x{height} does not match its pixel data")]
    BadRaster { width: usize, height: usize },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Tiff,
}

impl OutputFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg" | "jpeg") => Ok(OutputFormat::Jpeg),
            Some("tif" | "tiff") => Ok(OutputFormat::Tiff),
            _ => Err(EncodeError::UnrecognizedExtension(
                path.display().to_string(),
            )),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

fn to_dynamic_image(raster: &RasterImage) -> Result<DynamicImage, EncodeError> {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyImage);
    }
    let bad = || EncodeError::BadRaster { width, height };
    let (w, h) = (
        u32::try_from(width).map_err(|_| bad())?,
        u32::try_from(height).map_err(|_| bad())?,
    );
    let data = raster.as_bytes().to_vec();

    let image = match raster.color_model() {
        ColorModel::Gray => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        ColorModel::Rgb => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
    };
    image.ok_or_else(bad)
}

/// Save a raster image, choosing the format from the file extension
pub fn save(raster: &RasterImage, path: &Path) -> Result<OutputFormat, EncodeError> {
    let format = OutputFormat::from_path(path)?;
    let image = to_dynamic_image(raster)?;
    image.save_with_format(path, format.image_format())?;
    log::info!(
        "Wrote {}x{} {:?} image to {}",
        raster.width(),
        raster.height(),
        format,
        path.display()
    );
    Ok(format)
}
