//! Button monitor
//!
//! Scanners expose their front-panel buttons as boolean options. The
//! [`ButtonMonitor`] polls them at a fixed interval, detects presses by edge
//! (`false -> true`) and runs a scan with the button's [`ScanPreset`].

mod buttons;
mod config;

pub use buttons::{ButtonMonitor, MonitorSummary, StopFlag};
pub use config::{MonitorConfig, ScanPreset, DEFAULT_BUTTONS, DEFAULT_POLL_INTERVAL};
