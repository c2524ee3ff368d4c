//! Button polling loop

use super::config::{MonitorConfig, ScanPreset};
use crate::error::{Error, Result};
use crate::option::{SetInfo, ValueType};
use crate::raster::RasterImage;
use crate::session::{NoProgress, Session};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal for [`ButtonMonitor::run`]
///
/// Clones share the same flag, so one can be handed to a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the monitor to stop after the current cycle
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters returned when the monitor loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    /// Poll cycles completed
    pub cycles: u64,
    /// Rising edges seen
    pub presses: u64,
    /// Scans completed
    pub scans: u64,
}

/// Polls button options and scans on presses
///
/// Only a `false -> true` transition between two polls triggers. The first
/// reading of a button is its baseline, so a button already held when
/// monitoring starts does not trigger until it is released and pressed again.
/// The last observed value of each button is kept internally and never
/// exposed.
#[derive(Debug)]
pub struct ButtonMonitor {
    config: MonitorConfig,
    /// Last reading per button; absent until the first poll
    states: HashMap<String, bool>,
}

impl ButtonMonitor {
    /// Create a monitor; no button has been observed yet
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// The monitor's configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one poll cycle and return the buttons that were just pressed
    ///
    /// A failing read, or a button that does not read as a boolean, is
    /// reported as [`Error::Button`].
    pub fn poll(&mut self, session: &mut Session<'_>) -> Result<Vec<String>> {
        let mut pressed = Vec::new();

        for button in &self.config.buttons {
            let value = session
                .get_value(button)
                .map_err(|e| e.for_button(button))?;
            let Some(now) = value.as_bool() else {
                return Err(Error::TypeMismatch {
                    name: button.clone(),
                    expected: ValueType::Trigger,
                    actual: value.kind(),
                }
                .for_button(button));
            };

            match self.states.insert(button.clone(), now) {
                None => log::debug!("Button '{}' starts at {}", button, now),
                Some(before) => {
                    if now != before {
                        log::debug!("Button '{}' = {}", button, now);
                    }
                    if now && !before {
                        log::info!("Button '{}' pressed", button);
                        pressed.push(button.clone());
                    }
                }
            }
        }

        Ok(pressed)
    }

    /// Apply a button's preset and scan
    ///
    /// Returns `Ok(None)` if the button has no preset. Overrides are applied
    /// on every press; a rejected override aborts the scan.
    pub fn trigger(
        &self,
        session: &mut Session<'_>,
        button: &str,
    ) -> Result<Option<(&ScanPreset, RasterImage)>> {
        let Some(preset) = self.config.preset(button) else {
            log::info!("No scan preset for button '{}'", button);
            return Ok(None);
        };

        for (name, value) in &preset.overrides {
            let info = session
                .set_value(name, value.clone())
                .map_err(|e| e.for_button(button))?;
            if info.contains(SetInfo::RELOAD_OPTIONS) {
                session
                    .refresh_options()
                    .map_err(|e| e.for_button(button))?;
            }
        }

        let image = session
            .scan(&mut NoProgress)
            .map_err(|e| e.for_button(button))?;
        Ok(Some((preset, image)))
    }

    /// Poll until stopped or `max_cycles` is reached
    ///
    /// Every scanned image is passed to `handler` along with its preset. Any
    /// device, preset or handler failure ends the loop.
    pub fn run<F>(
        &mut self,
        session: &mut Session<'_>,
        stop: &StopFlag,
        mut handler: F,
    ) -> Result<MonitorSummary>
    where
        F: FnMut(&ScanPreset, RasterImage) -> Result<()>,
    {
        let mut summary = MonitorSummary::default();
        log::info!(
            "Monitoring {} button(s) every {:?}",
            self.config.buttons.len(),
            self.config.interval
        );

        while !stop.is_stopped() {
            if self.config.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            let pressed = self.poll(session)?;
            summary.cycles += 1;

            for button in pressed {
                summary.presses += 1;
                if let Some((preset, image)) = self.trigger(session, &button)? {
                    handler(preset, image).map_err(|e| e.for_button(&button))?;
                    summary.scans += 1;
                }
            }

            std::thread::sleep(self.config.interval);
        }

        log::info!(
            "Monitor stopped after {} cycle(s), {} scan(s)",
            summary.cycles,
            summary.scans
        );
        Ok(summary)
    }
}
