//! Backend boundary
//!
//! A backend speaks the actual device protocol. rsane only consumes it
//! through the [`Backend`] and [`DeviceHandle`] traits; primitive device I/O
//! lives in the backend crates.

mod traits;

pub use traits::*;
