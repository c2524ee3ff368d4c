//! Emulated scanner device

use crate::picture::TestPicture;
use crate::{Counters, TestConfig};
use rsane_core::backend::DeviceHandle;
use rsane_core::error::{Error, Result};
use rsane_core::frame::{ColorMode, FrameParameters, ReadStatus};
use rsane_core::option::{
    Capabilities, Constraint, OptionDescriptor, SetInfo, Unit, Value, ValueType,
};
use std::collections::HashMap;
use std::sync::Arc;

const MM_PER_INCH: f64 = 25.4;

/// Flatbed size (US letter width, A4 height)
const BED_WIDTH_MM: f64 = 215.9;
const BED_HEIGHT_MM: f64 = 297.0;

// Option indices
const OPT_MODE: usize = 0;
const OPT_DEPTH: usize = 1;
const OPT_RESOLUTION: usize = 2;
const OPT_HAND_SCANNER: usize = 3;
const OPT_TEST_PICTURE: usize = 4;
const OPT_READ_LIMIT_SIZE: usize = 5;
const OPT_CALIBRATE: usize = 6;
const OPT_TL_X: usize = 7;
const OPT_TL_Y: usize = 8;
const OPT_BR_X: usize = 9;
const OPT_BR_Y: usize = 10;
const OPT_FIRST_BUTTON: usize = 11;

/// Front-panel buttons, in option order
pub const BUTTONS: [&str; 5] = ["file", "extra", "scan", "copy", "email"];

fn option_table(picture: TestPicture) -> (Vec<OptionDescriptor>, Vec<Value>) {
    let mm_range = |max: f64| Constraint::FloatRange {
        min: 0.0,
        max,
        quant: 0.0,
    };

    let mut options = vec![
        OptionDescriptor::new("mode", ValueType::String)
            .title("Scan mode")
            .description("Selects the scan mode (e.g., lineart, monochrome, or color).")
            .group("Scan Mode")
            .constraint(Constraint::StringList(vec![
                "Lineart".into(),
                "Gray".into(),
                "Color".into(),
            ])),
        OptionDescriptor::new("depth", ValueType::Int)
            .title("Bit depth")
            .description("Number of bits per sample.")
            .group("Scan Mode")
            .unit(Unit::Bit)
            .constraint(Constraint::IntList(vec![1, 8, 16])),
        OptionDescriptor::new("resolution", ValueType::Int)
            .title("Scan resolution")
            .description("Sets the resolution of the scanned image.")
            .group("Scan Mode")
            .unit(Unit::Dpi)
            .constraint(Constraint::IntRange {
                min: 50,
                max: 1200,
                quant: 1,
            }),
        OptionDescriptor::new("hand-scanner", ValueType::Bool)
            .title("Hand-scanner simulation")
            .description("Frame height is unknown until the end of the frame.")
            .group("Special Options")
            .capabilities(Capabilities::default() | Capabilities::ADVANCED),
        OptionDescriptor::new("test-picture", ValueType::String)
            .title("Select the test picture")
            .description("Select the kind of test picture.")
            .group("Special Options")
            .constraint(Constraint::StringList(
                TestPicture::NAMES.iter().map(|s| s.to_string()).collect(),
            )),
        OptionDescriptor::new("read-limit-size", ValueType::Int)
            .title("Size of read-limit")
            .description("Limit the amount of data transferred with each read call.")
            .group("Special Options")
            .constraint(Constraint::IntRange {
                min: 1,
                max: 64 * 1024,
                quant: 1,
            })
            .capabilities(Capabilities::default() | Capabilities::INACTIVE | Capabilities::ADVANCED),
        OptionDescriptor::new("calibrate", ValueType::Trigger)
            .title("Calibrate")
            .description("Run a calibration cycle.")
            .group("Special Options")
            .capabilities(Capabilities::default() | Capabilities::ADVANCED),
        OptionDescriptor::new("tl-x", ValueType::Float)
            .title("Top-left x")
            .description("Top-left x position of scan area.")
            .group("Geometry")
            .unit(Unit::Millimeter)
            .constraint(mm_range(BED_WIDTH_MM)),
        OptionDescriptor::new("tl-y", ValueType::Float)
            .title("Top-left y")
            .description("Top-left y position of scan area.")
            .group("Geometry")
            .unit(Unit::Millimeter)
            .constraint(mm_range(BED_HEIGHT_MM)),
        OptionDescriptor::new("br-x", ValueType::Float)
            .title("Bottom-right x")
            .description("Bottom-right x position of scan area.")
            .group("Geometry")
            .unit(Unit::Millimeter)
            .constraint(mm_range(BED_WIDTH_MM)),
        OptionDescriptor::new("br-y", ValueType::Float)
            .title("Bottom-right y")
            .description("Bottom-right y position of scan area.")
            .group("Geometry")
            .unit(Unit::Millimeter)
            .constraint(mm_range(BED_HEIGHT_MM)),
    ];
    let mut values = vec![
        Value::from("Gray"),
        Value::Int(8),
        Value::Int(50),
        Value::Bool(false),
        Value::from(picture.name()),
        Value::Int(1024),
        Value::Bool(false),
        Value::Float(0.0),
        Value::Float(0.0),
        Value::Float(40.0),
        Value::Float(30.0),
    ];

    for button in BUTTONS {
        options.push(
            OptionDescriptor::new(button, ValueType::Trigger)
                .title(&format!("{} button", button))
                .description("Reads true while the button is pressed.")
                .group("Buttons")
                .capabilities(Capabilities::SOFT_DETECT | Capabilities::HARD_SELECT),
        );
        values.push(Value::Bool(false));
    }

    (options, values)
}

/// Frame being transferred
#[derive(Debug)]
struct Transfer {
    params: FrameParameters,
    data: Vec<u8>,
    offset: usize,
}

/// Emulated scanner device opened from a [`TestBackend`](crate::TestBackend)
#[derive(Debug)]
pub struct TestDevice {
    config: TestConfig,
    counters: Arc<Counters>,
    options: Vec<OptionDescriptor>,
    values: Vec<Value>,
    /// Number of reads per scripted button
    button_reads: HashMap<String, usize>,
    transfer: Option<Transfer>,
}

impl TestDevice {
    pub(crate) fn new(config: TestConfig, counters: Arc<Counters>) -> Self {
        let (options, values) = option_table(config.picture);
        Self {
            config,
            counters,
            options,
            values,
            button_reads: HashMap::new(),
            transfer: None,
        }
    }

    fn int(&self, index: usize) -> i32 {
        self.values[index].as_int().unwrap_or_default()
    }

    fn float(&self, index: usize) -> f64 {
        self.values[index].as_float().unwrap_or_default()
    }

    fn flag(&self, index: usize) -> bool {
        self.values[index].as_bool().unwrap_or_default()
    }

    fn set_active(&mut self, index: usize, active: bool) {
        self.options[index]
            .capabilities
            .set(Capabilities::INACTIVE, !active);
    }

    /// Recompute which options are active after a mode change
    fn update_activity(&mut self) {
        let lineart = self.values[OPT_MODE].as_str() == Some("Lineart");
        self.set_active(OPT_DEPTH, !lineart);
        let hand = self.flag(OPT_HAND_SCANNER);
        self.set_active(OPT_BR_Y, !hand);
    }

    fn compute_parameters(&self) -> Result<FrameParameters> {
        let (mode, depth) = match self.values[OPT_MODE].as_str() {
            Some("Lineart") => (ColorMode::Monochrome, 1),
            Some("Gray") => (ColorMode::Gray, self.int(OPT_DEPTH) as u32),
            Some("Color") => (ColorMode::Color, self.int(OPT_DEPTH) as u32),
            other => return Err(Error::Io(format!("invalid scan mode {:?}", other))),
        };

        let dpi = f64::from(self.int(OPT_RESOLUTION));
        let width_mm = self.float(OPT_BR_X) - self.float(OPT_TL_X);
        let height_mm = self.float(OPT_BR_Y) - self.float(OPT_TL_Y);
        if width_mm <= 0.0 || height_mm <= 0.0 {
            return Err(Error::Io("scan area is empty".into()));
        }

        let pixels_per_line = (width_mm / MM_PER_INCH * dpi).round() as usize;
        let lines = (height_mm / MM_PER_INCH * dpi).round() as usize;
        if pixels_per_line == 0 || lines == 0 {
            return Err(Error::Io("scan area smaller than one pixel".into()));
        }

        let mut params = FrameParameters {
            mode,
            depth,
            bytes_per_line: 0,
            pixels_per_line,
            lines: (!self.flag(OPT_HAND_SCANNER)).then_some(lines),
        };
        params.bytes_per_line = params.packed_line_len() + self.config.line_padding;
        Ok(params)
    }

    /// Height actually produced, including in hand-scanner mode
    fn produced_lines(&self) -> usize {
        let height_mm = self.float(OPT_BR_Y) - self.float(OPT_TL_Y);
        let dpi = f64::from(self.int(OPT_RESOLUTION));
        (height_mm / MM_PER_INCH * dpi).round() as usize
    }

    fn scripted_button(&mut self, name: &str) -> Option<bool> {
        let script = self.config.button_scripts.get(name)?;
        let pos = self.button_reads.entry(name.to_string()).or_insert(0);
        let value = script
            .get(*pos)
            .or_else(|| script.last())
            .copied()
            .unwrap_or(false);
        *pos += 1;
        Some(value)
    }

    fn descriptor(&self, index: usize) -> Result<&OptionDescriptor> {
        self.options
            .get(index)
            .ok_or_else(|| Error::Io(format!("invalid option index {}", index)))
    }
}

impl DeviceHandle for TestDevice {
    fn option_descriptors(&mut self) -> Result<Vec<OptionDescriptor>> {
        Ok(self.options.clone())
    }

    fn get_option(&mut self, index: usize) -> Result<Value> {
        let desc = self.descriptor(index)?;
        let name = desc.name.clone();
        let value_type = desc.value_type;
        Counters::bump(&self.counters.gets);

        if self.config.faults.get.as_deref() == Some(name.as_str()) {
            return Err(Error::Io(format!("failed to read option '{}'", name)));
        }
        if self.config.faults.wrong_type.as_deref() == Some(name.as_str()) {
            return Ok(match value_type {
                ValueType::String => Value::Int(0),
                _ => Value::from("garbage"),
            });
        }

        if index >= OPT_FIRST_BUTTON {
            if let Some(pressed) = self.scripted_button(&name) {
                return Ok(Value::Bool(pressed));
            }
        }
        Ok(self.values[index].clone())
    }

    fn set_option(&mut self, index: usize, value: &Value) -> Result<SetInfo> {
        let desc = self.descriptor(index)?;
        let name = desc.name.clone();
        if !desc.is_settable() {
            return Err(Error::ReadOnly { name });
        }
        if self.config.faults.set.as_deref() == Some(name.as_str()) {
            return Err(Error::Io(format!("failed to write option '{}'", name)));
        }
        if self.transfer.is_some() {
            return Err(Error::Io("cannot change options while scanning".into()));
        }
        Counters::bump(&self.counters.sets);

        if self.values[index] == *value {
            return Ok(SetInfo::empty());
        }
        self.values[index] = value.clone();
        log::trace!("test device: {} = {}", name, value);

        let info = match index {
            OPT_MODE | OPT_HAND_SCANNER => {
                self.update_activity();
                SetInfo::RELOAD_OPTIONS | SetInfo::RELOAD_PARAMS
            }
            OPT_DEPTH | OPT_RESOLUTION | OPT_TL_X | OPT_TL_Y | OPT_BR_X | OPT_BR_Y => {
                SetInfo::RELOAD_PARAMS
            }
            OPT_TEST_PICTURE => {
                if let Some(picture) = value.as_str().and_then(TestPicture::from_name) {
                    self.config.picture = picture;
                }
                SetInfo::empty()
            }
            OPT_READ_LIMIT_SIZE | OPT_CALIBRATE => SetInfo::empty(),
            _ => SetInfo::empty(),
        };
        Ok(info)
    }

    fn start(&mut self) -> Result<()> {
        if self.transfer.is_some() {
            return Err(Error::Io("scan already in progress".into()));
        }
        Counters::bump(&self.counters.starts);

        let params = self.compute_parameters()?;
        let lines = params.lines.unwrap_or_else(|| self.produced_lines());
        let mut data = Vec::with_capacity(lines * params.bytes_per_line);
        for _ in 0..lines {
            self.config.picture.render_line(&params, &mut data);
        }
        log::debug!(
            "test device: frame of {} bytes ({})",
            data.len(),
            params
        );

        self.transfer = Some(Transfer {
            params,
            data,
            offset: 0,
        });
        Ok(())
    }

    fn parameters(&mut self) -> Result<FrameParameters> {
        match &self.transfer {
            Some(transfer) => Ok(transfer.params),
            None => self.compute_parameters(),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        let Some(transfer) = self.transfer.as_mut() else {
            return Err(Error::Io("no scan in progress".into()));
        };

        let mut limit = transfer.data.len();
        if let Some(fail_at) = self.config.faults.read_after {
            if transfer.offset >= fail_at {
                return Err(Error::Io("transfer aborted by device".into()));
            }
            limit = limit.min(fail_at);
        }

        let remaining = limit - transfer.offset;
        if remaining == 0 {
            return Ok(ReadStatus::EndOfFrame);
        }

        let n = remaining.min(buf.len()).min(self.config.max_read);
        buf[..n].copy_from_slice(&transfer.data[transfer.offset..transfer.offset + n]);
        transfer.offset += n;
        Ok(ReadStatus::Data(n))
    }

    fn cancel(&mut self) {
        Counters::bump(&self.counters.cancels);
        self.transfer = None;
    }

    fn close(&mut self) {
        self.transfer = None;
        log::debug!("test device closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(config: TestConfig) -> TestDevice {
        TestDevice::new(config, Arc::new(Counters::default()))
    }

    #[test]
    fn test_default_parameters() {
        let mut dev = device(TestConfig::default());
        let params = dev.parameters().unwrap();
        assert_eq!(params.mode, ColorMode::Gray);
        assert_eq!(params.depth, 8);
        // 40 mm and 30 mm at 50 dpi
        assert_eq!(params.pixels_per_line, 79);
        assert_eq!(params.lines, Some(59));
        assert_eq!(params.bytes_per_line, 79);
    }

    #[test]
    fn test_mode_change_reloads() {
        let mut dev = device(TestConfig::default());
        let info = dev.set_option(OPT_MODE, &Value::from("Lineart")).unwrap();
        assert!(info.contains(SetInfo::RELOAD_OPTIONS | SetInfo::RELOAD_PARAMS));
        assert!(!dev.options[OPT_DEPTH].is_active());

        let params = dev.parameters().unwrap();
        assert_eq!(params.mode, ColorMode::Monochrome);
        assert_eq!(params.depth, 1);
        assert_eq!(params.bytes_per_line, 10);

        // Same value again has no side effects
        let info = dev.set_option(OPT_MODE, &Value::from("Lineart")).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn test_hand_scanner_unknown_height() {
        let mut dev = device(TestConfig::default());
        dev.set_option(OPT_HAND_SCANNER, &Value::Bool(true)).unwrap();
        assert!(!dev.options[OPT_BR_Y].is_active());
        assert_eq!(dev.parameters().unwrap().lines, None);
    }

    #[test]
    fn test_read_respects_max_read() {
        let config = TestConfig {
            max_read: 100,
            ..TestConfig::default()
        };
        let mut dev = device(config);
        dev.start().unwrap();
        let mut buf = [0u8; 1000];
        assert_eq!(dev.read(&mut buf).unwrap(), ReadStatus::Data(100));
    }

    #[test]
    fn test_button_script() {
        let mut dev = device(TestConfig::default().script("scan", &[false, true]));
        let scan = OPT_FIRST_BUTTON + 2;
        assert_eq!(dev.get_option(scan).unwrap(), Value::Bool(false));
        assert_eq!(dev.get_option(scan).unwrap(), Value::Bool(true));
        assert_eq!(dev.get_option(scan).unwrap(), Value::Bool(true));
        // Unscripted buttons stay released
        assert_eq!(
            dev.get_option(OPT_FIRST_BUTTON).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_buttons_read_only() {
        let mut dev = device(TestConfig::default());
        assert!(matches!(
            dev.set_option(OPT_FIRST_BUTTON, &Value::Bool(true)),
            Err(Error::ReadOnly { .. })
        ));
    }
}
