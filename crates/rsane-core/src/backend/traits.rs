//! Backend trait definitions

use crate::error::Result;
use crate::frame::{FrameParameters, ReadStatus};
use crate::option::{OptionDescriptor, SetInfo, Value};

/// Identity of a physical scanner, as returned by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Name used to open the device
    pub name: String,
    /// Vendor string
    pub vendor: String,
    /// Model string
    pub model: String,
    /// Device class (e.g. "flatbed scanner")
    pub kind: String,
}

/// Process-wide backend lifecycle and device enumeration
///
/// `initialize` and `shutdown` are paired and bracket every other call.
/// Ownership of a backend is held by a single
/// [`Context`](crate::context::Context), which makes the pairing explicit.
pub trait Backend {
    /// Short backend name (e.g. "test")
    fn name(&self) -> &str;

    /// Initialize the backend
    fn initialize(&mut self) -> Result<()>;

    /// Release all backend resources
    fn shutdown(&mut self);

    /// Enumerate attached devices
    fn devices(&mut self) -> Result<Vec<DeviceDescriptor>>;

    /// Open a device by name
    fn open(&mut self, name: &str) -> Result<Box<dyn DeviceHandle>>;
}

/// Primitive operations on an open device
///
/// Options are addressed by their index in the list returned by
/// [`option_descriptors`](DeviceHandle::option_descriptors). Implementations
/// do not validate values; the option registry does that before calling in.
pub trait DeviceHandle {
    /// Fetch the current option descriptors, in device order
    fn option_descriptors(&mut self) -> Result<Vec<OptionDescriptor>>;

    /// Read the value of an option
    fn get_option(&mut self, index: usize) -> Result<Value>;

    /// Set the value of an option
    fn set_option(&mut self, index: usize, value: &Value) -> Result<SetInfo>;

    /// Begin a frame transfer
    fn start(&mut self) -> Result<()>;

    /// Frame parameters of the current (or next) frame
    fn parameters(&mut self) -> Result<FrameParameters>;

    /// Read frame bytes into `buf`
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus>;

    /// Abort or release the current acquisition
    ///
    /// Must be safe to call at any time.
    fn cancel(&mut self);

    /// Close the device
    fn close(&mut self) {}
}
