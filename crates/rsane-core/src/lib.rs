//! rsane-core - Core library for scanner sessions
//!
//! This crate drives document scanners through a backend: it negotiates scan
//! parameters through a typed option registry, runs the start/read/cancel
//! acquisition state machine, assembles scanline bytes into raster images
//! and polls device buttons to trigger scans.
//!
//! # Example
//!
//! ```ignore
//! use rsane_core::{Context, NoProgress};
//!
//! fn scan_color(backend: Box<dyn rsane_core::backend::Backend>) -> rsane_core::Result<()> {
//!     let ctx = Context::new(backend)?;
//!     let mut session = ctx.open("test")?;
//!     session.set_value("mode", "Color")?;
//!     let image = session.scan(&mut NoProgress)?;
//!     println!("{}x{}", image.width(), image.height());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod acquisition;
pub mod backend;
pub mod context;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod option;
pub mod raster;
pub mod session;

#[cfg(test)]
mod fake;

pub use context::Context;
pub use error::{Error, Result};
pub use session::{NoProgress, ScanProgress, Session};
