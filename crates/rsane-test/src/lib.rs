//! rsane-test - In-memory emulated scanner backend
//!
//! This crate provides a backend with one virtual flatbed scanner named
//! `"test"`. It exposes a realistic option set (scan mode, depth,
//! resolution, scan area, front-panel buttons), produces frames from a
//! selectable test picture, and supports scripted button presses and fault
//! injection. It's useful for testing without real hardware.

mod device;
mod picture;

pub use device::TestDevice;
pub use picture::TestPicture;

use rsane_core::backend::{Backend, DeviceDescriptor, DeviceHandle};
use rsane_core::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Name of the emulated device
pub const TEST_DEVICE: &str = "test";

/// Failures to inject into the emulated device
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Reading this option fails with an I/O error
    pub get: Option<String>,
    /// Setting this option fails with an I/O error
    pub set: Option<String>,
    /// Reading this option returns a value of the wrong type
    pub wrong_type: Option<String>,
    /// Frame reads fail once this many bytes have been delivered
    pub read_after: Option<usize>,
    /// Device enumeration fails
    pub enumeration: bool,
}

/// Configuration for the test backend
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Devices reported by enumeration; only `"test"` can be opened
    pub devices: Vec<DeviceDescriptor>,
    /// Initial test picture
    pub picture: TestPicture,
    /// Extra bytes appended to every scan line
    pub line_padding: usize,
    /// Largest number of bytes returned by a single read
    pub max_read: usize,
    /// Successive values returned when a button option is read; the last
    /// value repeats once the script is exhausted
    pub button_scripts: HashMap<String, Vec<bool>>,
    /// Injected failures
    pub faults: Faults,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            devices: vec![DeviceDescriptor {
                name: TEST_DEVICE.to_string(),
                vendor: "Noname".to_string(),
                model: "frontend-tester".to_string(),
                kind: "virtual device".to_string(),
            }],
            picture: TestPicture::SolidBlack,
            line_padding: 0,
            max_read: 32 * 1024,
            button_scripts: HashMap::new(),
            faults: Faults::default(),
        }
    }
}

impl TestConfig {
    /// Script a button: it reads `false` for `idle_polls` polls, then `true`
    /// once, then `false` from then on
    pub fn press(mut self, button: &str, idle_polls: usize) -> Self {
        let mut script = vec![false; idle_polls];
        script.extend([true, false]);
        self.button_scripts.insert(button.to_string(), script);
        self
    }

    /// Script a button with explicit values
    pub fn script(mut self, button: &str, values: &[bool]) -> Self {
        self.button_scripts.insert(button.to_string(), values.to_vec());
        self
    }
}

/// Device round-trip counters, shared between the backend and its devices
#[derive(Debug, Default)]
pub struct Counters {
    /// Option reads
    pub gets: AtomicUsize,
    /// Option writes
    pub sets: AtomicUsize,
    /// Acquisition starts
    pub starts: AtomicUsize,
    /// Acquisition cancels
    pub cancels: AtomicUsize,
}

impl Counters {
    /// Read a counter
    pub fn load(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Emulated backend
#[derive(Debug)]
pub struct TestBackend {
    config: TestConfig,
    counters: Arc<Counters>,
    initialized: bool,
}

impl TestBackend {
    /// Create a backend with the given configuration
    pub fn new(config: TestConfig) -> Self {
        Self {
            config,
            counters: Arc::new(Counters::default()),
            initialized: false,
        }
    }

    /// Create a backend with the default configuration
    pub fn new_default() -> Self {
        Self::new(TestConfig::default())
    }

    /// Round-trip counters of devices opened from this backend
    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}

impl Backend for TestBackend {
    fn name(&self) -> &str {
        "test"
    }

    fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            log::warn!("Test backend initialized twice");
        }
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }

    fn devices(&mut self) -> Result<Vec<DeviceDescriptor>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if self.config.faults.enumeration {
            return Err(Error::Io("bus scan failed".into()));
        }
        Ok(self.config.devices.clone())
    }

    fn open(&mut self, name: &str) -> Result<Box<dyn DeviceHandle>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if name != TEST_DEVICE || !self.config.devices.iter().any(|d| d.name == name) {
            return Err(Error::DeviceNotFound {
                name: name.to_string(),
            });
        }
        Ok(Box::new(TestDevice::new(
            self.config.clone(),
            Arc::clone(&self.counters),
        )))
    }
}
