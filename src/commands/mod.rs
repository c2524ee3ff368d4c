//! CLI command implementations
//!
//! Every command works on a [`Session`] opened from an initialized
//! [`Context`](rsane_core::Context); `main` owns both.

mod list;
pub mod monitor;
pub mod options;
pub mod scan;

pub use list::{list_backends, list_devices};

use rsane_core::option::Value;
use rsane_core::{Error, Session};

/// Parse a command-line value according to the option's declared type
pub(crate) fn parse_option_value(
    session: &Session<'_>,
    name: &str,
    text: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let desc = session.option(name).ok_or_else(|| Error::UnknownOption {
        name: name.to_string(),
    })?;
    Value::parse_as(desc.value_type, text)
        .map_err(|e| format!("option '{}': {}", name, e).into())
}
