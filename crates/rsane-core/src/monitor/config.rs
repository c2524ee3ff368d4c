//! Button monitor configuration
//!
//! Configuration can be loaded from a TOML file:
//!
//! ```toml
//! [monitor]
//! interval_ms = 20
//! max_cycles = 1000000
//! buttons = ["file", "extra", "scan", "copy", "email"]
//!
//! [[preset]]
//! button = "scan"
//! output = "scan.png"
//! [preset.options]
//! resolution = 1200
//! mode = "Color"
//! ```
//!
//! Omitted `[monitor]` keys take their defaults. Presets given in the file
//! replace the built-in ones.

use crate::error::{Error, Result};
use crate::option::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Default button option names, in poll order
pub const DEFAULT_BUTTONS: &[&str] = &["file", "extra", "scan", "copy", "email"];

/// Option overrides applied before a scan triggered by a button
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPreset {
    /// Button option that triggers this preset
    pub button: String,
    /// Where the caller should write the scanned image
    pub output: PathBuf,
    /// Option values to set, in order
    pub overrides: Vec<(String, Value)>,
}

impl ScanPreset {
    /// Create a preset with no overrides
    pub fn new(button: &str, output: impl Into<PathBuf>) -> Self {
        Self {
            button: button.to_string(),
            output: output.into(),
            overrides: Vec::new(),
        }
    }

    /// Add an option override
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.overrides.push((name.to_string(), value.into()));
        self
    }
}

/// Settings of a [`ButtonMonitor`](super::ButtonMonitor)
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Button option names, polled in this order
    pub buttons: Vec<String>,
    /// Sleep between poll cycles
    pub interval: Duration,
    /// Stop after this many cycles; `None` polls until stopped
    pub max_cycles: Option<u64>,
    /// Scan presets keyed by button
    pub presets: Vec<ScanPreset>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buttons: DEFAULT_BUTTONS.iter().map(|b| b.to_string()).collect(),
            interval: DEFAULT_POLL_INTERVAL,
            max_cycles: None,
            presets: vec![
                ScanPreset::new("scan", "scan.png")
                    .with("resolution", 1200)
                    .with("mode", "Color"),
                ScanPreset::new("file", "file.png")
                    .with("resolution", 300)
                    .with("mode", "Color"),
            ],
        }
    }
}

/// TOML file structure
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfigFile {
    monitor: Option<TomlMonitor>,
    #[serde(default)]
    preset: Vec<TomlPreset>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMonitor {
    interval_ms: Option<u64>,
    max_cycles: Option<u64>,
    buttons: Option<Vec<String>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPreset {
    button: String,
    output: PathBuf,
    #[serde(default)]
    options: toml::Table,
}

fn toml_to_value(name: &str, value: toml::Value) -> Result<Value> {
    match value {
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Integer(i) => i32::try_from(i)
            .map(Value::Int)
            .map_err(|_| Error::Config(format!("option '{}': {} out of range", name, i))),
        toml::Value::Float(f) => Ok(Value::Float(f)),
        toml::Value::String(s) => Ok(Value::String(s)),
        other => Err(Error::Config(format!(
            "option '{}': unsupported value type {}",
            name,
            other.type_str()
        ))),
    }
}

impl MonitorConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: TomlConfigFile =
            toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;

        let mut config = MonitorConfig::default();
        if let Some(monitor) = file.monitor {
            if let Some(ms) = monitor.interval_ms {
                if ms == 0 {
                    return Err(Error::Config("interval_ms must be at least 1".into()));
                }
                config.interval = Duration::from_millis(ms);
            }
            config.max_cycles = monitor.max_cycles;
            if let Some(buttons) = monitor.buttons {
                config.buttons = buttons;
            }
        }

        if !file.preset.is_empty() {
            config.presets = file
                .preset
                .into_iter()
                .map(|p| {
                    let overrides = p
                        .options
                        .into_iter()
                        .map(|(name, value)| {
                            let value = toml_to_value(&name, value)?;
                            Ok((name, value))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(ScanPreset {
                        button: p.button,
                        output: p.output,
                        overrides,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.buttons.is_empty() {
            return Err(Error::Config("no buttons to monitor".into()));
        }
        for (i, button) in self.buttons.iter().enumerate() {
            if self.buttons[..i].contains(button) {
                return Err(Error::Config(format!("button '{}' listed twice", button)));
            }
        }
        for (i, preset) in self.presets.iter().enumerate() {
            if !self.buttons.contains(&preset.button) {
                return Err(Error::Config(format!(
                    "preset for '{}' refers to a button that is not monitored",
                    preset.button
                )));
            }
            if self.presets[..i].iter().any(|p| p.button == preset.button) {
                return Err(Error::Config(format!(
                    "more than one preset for button '{}'",
                    preset.button
                )));
            }
        }
        Ok(())
    }

    /// Preset for a button, if any
    pub fn preset(&self, button: &str) -> Option<&ScanPreset> {
        self.presets.iter().find(|p| p.button == button)
    }
}
