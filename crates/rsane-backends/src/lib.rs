//! Scanner backend registry
//!
//! This crate maps backend names to [`Backend`] implementations. The CLI
//! should only need this crate and `rsane-core`, never a backend crate
//! directly.
//!
//! # Example
//!
//! ```ignore
//! use rsane_backends::open_backend;
//! use rsane_core::Context;
//!
//! let backend = open_backend("test:picture=white")?;
//! let context = Context::new(backend)?;
//! let mut session = context.open("")?;
//! ```
//!
//! [`Backend`]: rsane_core::backend::Backend

mod registry;

pub use registry::{
    available_backends, backend_names_short, open_backend, parse_backend_params, BackendInfo,
    BackendParams, RegistryError,
};
