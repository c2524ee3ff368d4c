//! Backend registry and initialization
//!
//! Backends are selected with a string of the form `"name"` or
//! `"name:key1=value1,key2=value2"`.

use rsane_core::backend::Backend;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from selecting a backend
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No backend with this name was compiled in
    #[error("unknown backend '{0}' (available: {names})", names = backend_names_short())]
    UnknownBackend(String),

    /// Malformed backend string or parameter value
    #[error("invalid backend parameter '{param}': {reason}")]
    InvalidParameter {
        /// The offending parameter
        param: String,
        /// What is wrong with it
        reason: String,
    },

    /// The backend itself failed
    #[error(transparent)]
    Core(#[from] rsane_core::Error),
}

/// Parsed backend parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendParams {
    /// Backend name
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

/// Parse a backend string into name and parameters
///
/// # Example
/// ```ignore
/// let params = parse_backend_params("test:picture=white")?;
/// assert_eq!(params.name, "test");
/// assert_eq!(params.params.get("picture"), Some(&"white".to_string()));
/// ```
pub fn parse_backend_params(s: &str) -> Result<BackendParams, RegistryError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            let Some((key, value)) = opt.split_once('=') else {
                return Err(RegistryError::InvalidParameter {
                    param: opt.to_string(),
                    reason: "expected key=value".into(),
                });
            };
            params.insert(key.to_string(), value.to_string());
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open a backend by name
///
/// The backend is returned uninitialized; hand it to
/// [`Context::new`](rsane_core::Context::new).
pub fn open_backend(backend: &str) -> Result<Box<dyn Backend>, RegistryError> {
    let params = parse_backend_params(backend)?;

    match params.name.as_str() {
        #[cfg(feature = "test")]
        "test" => open_test(&params),

        _ => Err(RegistryError::UnknownBackend(params.name)),
    }
}

#[cfg(feature = "test")]
fn open_test(params: &BackendParams) -> Result<Box<dyn Backend>, RegistryError> {
    use rsane_test::{TestBackend, TestConfig, TestPicture};

    fn number(key: &str, value: &str) -> Result<usize, RegistryError> {
        value.parse().map_err(|_| RegistryError::InvalidParameter {
            param: key.to_string(),
            reason: format!("'{}' is not a number", value),
        })
    }

    let mut config = TestConfig::default();
    for (key, value) in &params.params {
        match key.as_str() {
            "picture" => {
                config.picture = match value.as_str() {
                    "black" => TestPicture::SolidBlack,
                    "white" => TestPicture::SolidWhite,
                    "pattern" => TestPicture::ColorPattern,
                    _ => {
                        return Err(RegistryError::InvalidParameter {
                            param: key.clone(),
                            reason: format!("expected black, white or pattern, got '{}'", value),
                        })
                    }
                };
            }
            "padding" => config.line_padding = number(key, value)?,
            "chunk" => {
                config.max_read = number(key, value)?;
                if config.max_read == 0 {
                    return Err(RegistryError::InvalidParameter {
                        param: key.clone(),
                        reason: "must be at least 1".into(),
                    });
                }
            }
            // press=scan@3+copy: press "scan" on the 4th poll and "copy" on the 2nd,
            // the first poll being the monitor's baseline
            "press" => {
                for press in value.split('+') {
                    let (button, idle) = match press.split_once('@') {
                        Some((button, idle)) => (button, number(key, idle)?),
                        None => (press, 1),
                    };
                    config = config.press(button, idle);
                }
            }
            _ => {
                return Err(RegistryError::InvalidParameter {
                    param: key.clone(),
                    reason: "not supported by the test backend".into(),
                })
            }
        }
    }

    log::debug!("Opening test backend with {:?}", params.params);
    Ok(Box::new(TestBackend::new(config)))
}

/// Information about a backend
#[derive(Debug, Clone, Copy)]
pub struct BackendInfo {
    /// Name used in backend strings
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "test")]
    backends.push(BackendInfo {
        name: "test",
        description: "Emulated flatbed scanner (picture=<black|white|pattern>,padding=<n>,chunk=<n>,press=<button[@n]+...>)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}
