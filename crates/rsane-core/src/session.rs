//! Session: one open device with its option registry and acquisition

use crate::acquisition::{Acquisition, AcquisitionState};
use crate::backend::DeviceHandle;
use crate::context::Context;
use crate::error::Result;
use crate::frame::{FrameParameters, ReadStatus};
use crate::option::{OptionDescriptor, OptionRegistry, SetInfo, Value};
use crate::raster::{ImageAssembler, RasterImage};

/// Size of the buffer used for each device read during a scan
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Progress callbacks for [`Session::scan`]
///
/// All methods default to doing nothing.
pub trait ScanProgress {
    /// Acquisition started with these frame parameters
    fn started(&mut self, _params: &FrameParameters) {}

    /// `bytes` more bytes of frame data were received
    fn advanced(&mut self, _bytes: usize) {}

    /// The frame was assembled
    fn finished(&mut self, _image: &RasterImage) {}
}

/// Progress reporter that ignores all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// An open device
///
/// Owns the device handle, the option descriptor snapshot and the
/// acquisition state. Closing (or dropping) the session cancels any
/// acquisition in flight and closes the device.
pub struct Session<'ctx> {
    context: &'ctx Context,
    device: String,
    handle: Box<dyn DeviceHandle>,
    registry: OptionRegistry,
    acquisition: Acquisition,
    closed: bool,
}

impl<'ctx> Session<'ctx> {
    pub(crate) fn new(
        context: &'ctx Context,
        device: String,
        mut handle: Box<dyn DeviceHandle>,
    ) -> Result<Self> {
        let registry = match OptionRegistry::fetch(handle.as_mut()) {
            Ok(registry) => registry,
            Err(e) => {
                handle.close();
                context.release(&device);
                return Err(e);
            }
        };

        Ok(Self {
            context,
            device,
            handle,
            registry,
            acquisition: Acquisition::new(),
            closed: false,
        })
    }

    /// Name of the open device
    pub fn device_name(&self) -> &str {
        &self.device
    }

    /// Option descriptors, in device order
    pub fn options(&self) -> &[OptionDescriptor] {
        self.registry.descriptors()
    }

    /// Look up one option descriptor
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.registry.get(name)
    }

    /// Refetch option descriptors from the device
    ///
    /// Call this after a set reported [`SetInfo::RELOAD_OPTIONS`].
    pub fn refresh_options(&mut self) -> Result<()> {
        self.registry = OptionRegistry::fetch(self.handle.as_mut())?;
        Ok(())
    }

    /// Read an option value
    pub fn get_value(&mut self, name: &str) -> Result<Value> {
        self.registry.get_value(self.handle.as_mut(), name)
    }

    /// Set an option value
    ///
    /// The returned flags say whether descriptors or frame parameters must be
    /// refetched; the session does not do it on its own.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<SetInfo> {
        self.registry
            .set_value(self.handle.as_mut(), name, value.into())
    }

    /// Current frame parameters as the device would use them for the next frame
    pub fn parameters(&mut self) -> Result<FrameParameters> {
        self.handle.parameters()
    }

    /// Frame parameters frozen by the acquisition in flight
    pub fn frame_parameters(&self) -> Option<&FrameParameters> {
        self.acquisition.parameters()
    }

    /// Acquisition state
    pub fn state(&self) -> AcquisitionState {
        self.acquisition.state()
    }

    /// Start an acquisition
    pub fn start(&mut self) -> Result<FrameParameters> {
        self.acquisition.start(self.handle.as_mut())
    }

    /// Read the next chunk of frame data
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        self.acquisition.read_chunk(self.handle.as_mut(), buf)
    }

    /// Release the device; does nothing when idle
    pub fn cancel(&mut self) {
        self.acquisition.cancel(self.handle.as_mut());
    }

    /// Scan one frame into a raster image
    ///
    /// Runs start, the read loop and assembly, then cancels whatever the
    /// outcome. Either the whole image is returned or an error; partial
    /// images are never returned.
    pub fn scan(&mut self, progress: &mut dyn ScanProgress) -> Result<RasterImage> {
        let result = self.acquire(progress);
        self.cancel();
        result
    }

    fn acquire(&mut self, progress: &mut dyn ScanProgress) -> Result<RasterImage> {
        let params = self.start()?;
        log::debug!("Scanning with {}", params);
        progress.started(&params);

        let mut assembler = ImageAssembler::new(params)?;
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match self.read_chunk(&mut buf)? {
                ReadStatus::Data(n) => {
                    assembler.push(&buf[..n])?;
                    progress.advanced(n);
                }
                ReadStatus::EndOfFrame => break,
            }
        }

        let bytes = self.acquisition.bytes_read();
        let image = assembler.finish()?;
        log::info!(
            "Scanned {}x{} image ({} bytes)",
            image.width(),
            image.height(),
            bytes
        );
        progress.finished(&image);
        Ok(image)
    }

    /// Close the session
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.acquisition.cancel(self.handle.as_mut());
        self.handle.close();
        self.context.release(&self.device);
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
