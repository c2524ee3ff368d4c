//! Scanner options
//!
//! Options are the typed, named parameters a device exposes (resolution,
//! color mode, scan area, physical buttons, ...). Their descriptors are
//! fetched once per session and cached in an [`OptionRegistry`]; values are
//! always read fresh from the device.
//!
//! Every get and set is checked against the descriptor's declared
//! [`ValueType`] so that a misbehaving device shows up as
//! [`Error::TypeMismatch`](crate::Error::TypeMismatch) rather than a
//! transport failure.

mod registry;
mod types;

pub use registry::OptionRegistry;
pub use types::*;
