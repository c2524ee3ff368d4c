//! Acquisition state machine
//!
//! ```text
//! Idle --start--> Started --read--> Reading --end of frame--> Done
//!                    |                 |                        |
//!                    +------cancel-----+--> Cancelled --> Idle  +--cancel or start--> Idle
//! ```
//!
//! Reaching the end of frame releases the device. A finished acquisition may
//! be started again directly, and cancelling it only drops the frozen frame
//! parameters. Cancelling a frame in flight releases the device and returns
//! to `Idle`; it has to run on every error path before the next `start`.
//! Calling it from `Idle` does nothing.

use crate::backend::DeviceHandle;
use crate::error::{Error, Result};
use crate::frame::{FrameParameters, ReadStatus};
use core::fmt;

/// State of the acquisition on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionState {
    /// No acquisition in progress
    Idle,
    /// Started, no data read yet
    Started,
    /// Frame data is being read
    Reading,
    /// End of frame reached and the device released
    Done,
    /// Cancelled; transient on the way back to `Idle`
    Cancelled,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Started => "started",
            AcquisitionState::Reading => "reading",
            AcquisitionState::Done => "done",
            AcquisitionState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Tracks one session's acquisition and its frozen frame parameters
#[derive(Debug)]
pub struct Acquisition {
    state: AcquisitionState,
    params: Option<FrameParameters>,
    bytes_read: usize,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition {
    /// Create an idle acquisition
    pub fn new() -> Self {
        Self {
            state: AcquisitionState::Idle,
            params: None,
            bytes_read: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Frame parameters frozen at start, if an acquisition is in flight
    pub fn parameters(&self) -> Option<&FrameParameters> {
        self.params.as_ref()
    }

    /// Bytes read in the current acquisition
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Start a frame and freeze its parameters
    ///
    /// Fails with [`Error::DeviceBusy`] while a frame is in flight.
    pub fn start(&mut self, handle: &mut dyn DeviceHandle) -> Result<FrameParameters> {
        if self.state == AcquisitionState::Done {
            // Already released at end of frame
            self.cancel(handle);
        }
        if self.state != AcquisitionState::Idle {
            return Err(Error::DeviceBusy { state: self.state });
        }

        handle.start()?;
        let params = match handle.parameters() {
            Ok(params) => params,
            Err(e) => {
                handle.cancel();
                return Err(e);
            }
        };

        log::debug!("Acquisition started: {}", params);
        self.state = AcquisitionState::Started;
        self.params = Some(params);
        self.bytes_read = 0;
        Ok(params)
    }

    /// Read the next chunk of frame data
    ///
    /// Returns [`ReadStatus::EndOfFrame`] once the frame is exhausted, and
    /// keeps returning it until the next start or cancel. A device error
    /// leaves the acquisition in place; the caller must still cancel.
    pub fn read_chunk(
        &mut self,
        handle: &mut dyn DeviceHandle,
        buf: &mut [u8],
    ) -> Result<ReadStatus> {
        match self.state {
            AcquisitionState::Started | AcquisitionState::Reading => {}
            AcquisitionState::Done => return Ok(ReadStatus::EndOfFrame),
            state => {
                return Err(Error::InvalidState {
                    operation: "read",
                    state,
                })
            }
        }

        self.state = AcquisitionState::Reading;
        let status = handle.read(buf)?;
        match status {
            ReadStatus::Data(n) => self.bytes_read += n,
            ReadStatus::EndOfFrame => {
                log::debug!("End of frame after {} bytes", self.bytes_read);
                handle.cancel();
                self.state = AcquisitionState::Done;
            }
        }
        Ok(status)
    }

    /// Release the device and return to idle
    ///
    /// The device is only called while a frame is in flight.
    pub fn cancel(&mut self, handle: &mut dyn DeviceHandle) {
        match self.state {
            AcquisitionState::Idle => return,
            AcquisitionState::Done => {
                self.state = AcquisitionState::Idle;
                self.params = None;
                return;
            }
            _ => {}
        }

        handle.cancel();
        self.state = AcquisitionState::Cancelled;
        log::debug!("Acquisition cancelled after {} bytes", self.bytes_read);

        self.state = AcquisitionState::Idle;
        self.params = None;
    }
}
