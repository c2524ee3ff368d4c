//! Backend context: the single ownership point for an initialized backend

use crate::backend::{Backend, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::session::Session;
use std::cell::RefCell;
use std::collections::HashSet;

/// An initialized backend
///
/// Creating a `Context` initializes the backend and dropping it shuts the
/// backend down, so the pairing cannot be broken. Sessions borrow the
/// context and therefore cannot outlive it.
///
/// The context is not `Sync`; all session operations are expected to run on
/// one thread.
pub struct Context {
    backend: RefCell<Box<dyn Backend>>,
    open_devices: RefCell<HashSet<String>>,
}

impl Context {
    /// Initialize a backend and take ownership of it
    pub fn new(mut backend: Box<dyn Backend>) -> Result<Self> {
        backend.initialize()?;
        log::debug!("Initialized backend '{}'", backend.name());
        Ok(Self {
            backend: RefCell::new(backend),
            open_devices: RefCell::new(HashSet::new()),
        })
    }

    /// Name of the backend
    pub fn backend_name(&self) -> String {
        self.backend.borrow().name().to_string()
    }

    /// Enumerate devices
    ///
    /// An empty list is not an error here; [`open`](Context::open) with an
    /// empty name reports [`Error::NoDevices`].
    pub fn devices(&self) -> Result<Vec<DeviceDescriptor>> {
        self.backend.borrow_mut().devices().map_err(|e| match e {
            Error::NotInitialized | Error::Enumeration(_) => e,
            other => Error::Enumeration(other.to_string()),
        })
    }

    /// Open a session on a device
    ///
    /// An empty name selects the first enumerated device. Each device can
    /// have at most one open session.
    pub fn open(&self, name: &str) -> Result<Session<'_>> {
        let name = if name.is_empty() {
            self.devices()?
                .into_iter()
                .next()
                .map(|dev| dev.name)
                .ok_or(Error::NoDevices)?
        } else {
            name.to_string()
        };

        if self.open_devices.borrow().contains(&name) {
            return Err(Error::AlreadyOpen { name });
        }

        let handle = self.backend.borrow_mut().open(&name)?;
        self.open_devices.borrow_mut().insert(name.clone());
        log::info!("Opened device '{}'", name);

        Session::new(self, name, handle)
    }

    pub(crate) fn release(&self, name: &str) {
        self.open_devices.borrow_mut().remove(name);
        log::debug!("Closed device '{}'", name);
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        let backend = self.backend.get_mut();
        log::debug!("Shutting down backend '{}'", backend.name());
        backend.shutdown();
    }
}
