//! Error types for rsane-core
//!
//! One error enum covers the option registry, the acquisition state machine,
//! the image assembler and session setup. Every variant carries enough
//! context (option name, expected vs. actual type, acquisition state) for the
//! caller to log or retry.
//!
//! End of frame is not an error: it is reported through
//! [`ReadStatus::EndOfFrame`](crate::frame::ReadStatus).

use crate::acquisition::AcquisitionState;
use crate::option::ValueType;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    // Option registry errors
    /// No option with this name exists in the session
    #[error("unknown option '{name}'")]
    UnknownOption {
        /// Requested option name
        name: String,
    },

    /// The option exists but is currently inactive
    #[error("option '{name}' is inactive")]
    InactiveOption {
        /// Option name
        name: String,
    },

    /// A value's runtime type disagrees with the option's declared type
    #[error("option '{name}' is declared {expected}, got a {actual} value")]
    TypeMismatch {
        /// Option name
        name: String,
        /// Type declared by the option descriptor
        expected: ValueType,
        /// Type of the value that was supplied or returned
        actual: ValueType,
    },

    /// The value lies outside the option's range or permitted list
    #[error("value rejected by option '{name}': {reason}")]
    ConstraintViolation {
        /// Option name
        name: String,
        /// Which constraint was violated
        reason: String,
    },

    /// The option cannot be set by the client
    #[error("option '{name}' is read-only")]
    ReadOnly {
        /// Option name
        name: String,
    },

    // Acquisition errors
    /// A previous acquisition has not been finished and released
    #[error("device busy: acquisition is {state}")]
    DeviceBusy {
        /// State of the acquisition that is still in flight
        state: AcquisitionState,
    },

    /// The operation is not valid in the current acquisition state
    #[error("cannot {operation} while acquisition is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Current acquisition state
        state: AcquisitionState,
    },

    /// Transport or device I/O failure reported by the backend
    #[error("I/O error: {0}")]
    Io(String),

    // Image assembly errors
    /// Sample depth other than 1 or 8 bits per channel
    #[error("unsupported bit depth {depth} (only 1 and 8 bits per sample are supported)")]
    UnsupportedDepth {
        /// Depth reported by the frame parameters
        depth: u32,
    },

    /// Frame parameters are inconsistent (e.g. line shorter than its pixels)
    #[error("invalid frame parameters: {0}")]
    InvalidFrame(String),

    /// Number of scan lines does not match the declared frame height
    #[error("frame size mismatch: expected {expected} lines, received {received}")]
    FrameSizeMismatch {
        /// Declared number of lines
        expected: usize,
        /// Number of lines actually received
        received: usize,
    },

    /// The byte stream ended in the middle of a scan line
    #[error("frame ended with a partial line ({bytes} trailing bytes)")]
    PartialLine {
        /// Number of bytes left over
        bytes: usize,
    },

    // Session setup errors
    /// The backend has not been initialized
    #[error("backend not initialized")]
    NotInitialized,

    /// Device enumeration failed
    #[error("device enumeration failed: {0}")]
    Enumeration(String),

    /// Enumeration succeeded but returned no devices
    #[error("no scanner devices found")]
    NoDevices,

    /// No device with this name
    #[error("device '{name}' not found")]
    DeviceNotFound {
        /// Requested device name
        name: String,
    },

    /// The device already has an open session
    #[error("device '{name}' already has an open session")]
    AlreadyOpen {
        /// Device name
        name: String,
    },

    // Monitor errors
    /// A poll, preset or scan failed while handling a button
    #[error("button '{button}': {source}")]
    Button {
        /// Button option that was being polled or handled
        button: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Invalid monitor configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap this error with the name of the button being handled
    pub fn for_button(self, button: &str) -> Self {
        Error::Button {
            button: button.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
