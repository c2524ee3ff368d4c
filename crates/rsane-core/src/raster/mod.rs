//! Raster images and frame assembly
//!
//! The [`ImageAssembler`] turns the byte stream of one acquisition into a
//! [`RasterImage`], unpacking samples according to the frozen
//! [`FrameParameters`](crate::frame::FrameParameters) and dropping line
//! padding.

mod assembler;
mod image;

pub use assembler::ImageAssembler;
pub use image::{ColorModel, Pixel, RasterImage};
